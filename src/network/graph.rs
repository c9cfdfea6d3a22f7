use std::collections::HashMap;

use eframe::egui::{Color32, Vec2};

use crate::config::{EdgeSizing, NodeSizing};

use super::ingest::{NodeRecord, Records};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Fragment,
    #[default]
    Reception,
    Other(String),
}

impl NodeKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "frag" | "fragment" => Self::Fragment,
            "" | "recep" | "reception" => Self::Reception,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Fragment => "fragment",
            Self::Reception => "reception",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Self::Fragment => Color32::from_rgb(0xa7, 0x8b, 0xfa),
            Self::Reception | Self::Other(_) => Color32::from_rgb(0x9c, 0xa3, 0xaf),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub href: Option<String>,
    pub degree: usize,
    pub size: f32,
    pub position: Vec2,
}

/// Undirected edge. `source` always refers to the node whose id sorts first.
#[derive(Clone, Debug)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
    pub size: f32,
    pub keep_structural: bool,
}

#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
    edge_by_pair: HashMap<(usize, usize), usize>,
    incident: Vec<Vec<usize>>,
    node_sizing: NodeSizing,
    edge_sizing: EdgeSizing,
}

impl Graph {
    pub fn new(node_sizing: NodeSizing, edge_sizing: EdgeSizing) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            edge_by_pair: HashMap::new(),
            incident: Vec::new(),
            node_sizing,
            edge_sizing,
        }
    }

    pub fn from_records(records: &Records, node_sizing: NodeSizing, edge_sizing: EdgeSizing) -> Self {
        let mut graph = Self::new(node_sizing, edge_sizing);
        for record in &records.nodes {
            graph.add_node(record.clone());
        }

        let mut dropped = 0usize;
        for record in &records.edges {
            if graph
                .add_or_merge_edge(&record.source, &record.target, record.weight)
                .is_none()
            {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "dropped edges with unknown endpoints");
        }

        graph
    }

    /// First write wins; returns `false` when the id already exists.
    pub fn add_node(&mut self, record: NodeRecord) -> bool {
        if self.index_by_id.contains_key(&record.id) {
            return false;
        }

        let index = self.nodes.len();
        self.index_by_id.insert(record.id.clone(), index);
        self.nodes.push(Node {
            id: record.id,
            label: record.label,
            kind: record.kind,
            href: record.href,
            degree: 0,
            size: self.node_sizing.size_for(0),
            position: Vec2::ZERO,
        });
        self.incident.push(Vec::new());
        true
    }

    /// Adds a new undirected edge or folds `weight` into the existing one.
    /// Self relations, unknown endpoints and non-positive weights are ignored.
    pub fn add_or_merge_edge(&mut self, u: &str, v: &str, weight: f32) -> Option<usize> {
        if u == v || !weight.is_finite() || weight <= 0.0 {
            return None;
        }
        let (&a, &b) = (self.index_by_id.get(u)?, self.index_by_id.get(v)?);
        let (source, target) = if self.nodes[a].id <= self.nodes[b].id {
            (a, b)
        } else {
            (b, a)
        };

        if let Some(&edge_index) = self.edge_by_pair.get(&(source, target)) {
            let edge = &mut self.edges[edge_index];
            edge.weight = (edge.weight + weight).min(f32::MAX);
            edge.size = self.edge_sizing.size_for(edge.weight);
            return Some(edge_index);
        }

        let edge_index = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            weight,
            size: self.edge_sizing.size_for(weight),
            keep_structural: true,
        });
        self.edge_by_pair.insert((source, target), edge_index);
        for endpoint in [source, target] {
            self.incident[endpoint].push(edge_index);
            let node = &mut self.nodes[endpoint];
            node.degree += 1;
            node.size = self.node_sizing.size_for(node.degree);
        }
        Some(edge_index)
    }

    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.index_of(id).map(|index| self.nodes[index].degree)
    }

    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        self.neighbor_indices(index)
            .map(|neighbor| self.nodes[neighbor].id.as_str())
            .collect()
    }

    pub fn neighbor_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.incident_edges(index).iter().map(move |&edge_index| {
            let edge = &self.edges[edge_index];
            if edge.source == index {
                edge.target
            } else {
                edge.source
            }
        })
    }

    pub fn incident_edges(&self, index: usize) -> &[usize] {
        self.incident.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_between(&self, u: &str, v: &str) -> Option<&Edge> {
        let (a, b) = (self.index_of(u)?, self.index_of(v)?);
        let pair = if self.nodes[a].id <= self.nodes[b].id {
            (a, b)
        } else {
            (b, a)
        };
        self.edge_by_pair.get(&pair).map(|&index| &self.edges[index])
    }

    /// Canonical `(low, high)` id pair; used as the deterministic tie-break.
    pub fn edge_key(&self, edge_index: usize) -> (&str, &str) {
        let edge = &self.edges[edge_index];
        (
            self.nodes[edge.source].id.as_str(),
            self.nodes[edge.target].id.as_str(),
        )
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|node| node.position).collect()
    }

    pub fn set_positions(&mut self, positions: &[Vec2]) {
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.position = *position;
        }
    }

    pub fn set_structural(&mut self, keep: &[bool]) {
        for (edge, keep) in self.edges.iter_mut().zip(keep) {
            edge.keep_structural = *keep;
        }
    }
}
