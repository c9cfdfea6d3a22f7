use eframe::egui::Color32;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::config::SearchMode;
use crate::network::{Edge, Graph};

const DIM_NODE_SCALE: f32 = 0.75;
const DIM_NODE_FLOOR: f32 = 1.0;
const DIM_EDGE_SCALE: f32 = 0.7;
const DIM_EDGE_FLOOR: f32 = 0.5;

pub fn edge_color() -> Color32 {
    Color32::from_rgb(0xc7, 0xcd, 0xd4)
}

fn dimmed_node_color() -> Color32 {
    Color32::from_rgba_unmultiplied(209, 213, 219, 166)
}

fn dimmed_edge_color() -> Color32 {
    Color32::from_rgba_unmultiplied(199, 205, 212, 153)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
    pub min_weight: f32,
    pub query: String,
    pub mode: SearchMode,
}

impl FilterParams {
    pub fn new(min_weight: f32, mode: SearchMode) -> Self {
        Self {
            min_weight,
            query: String::new(),
            mode,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub size: f32,
    pub color: Color32,
    pub dimmed: bool,
    pub z_index: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
    pub size: f32,
    pub color: Color32,
    pub hidden: bool,
    pub dimmed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    pub nodes: Vec<NodeStyle>,
    pub edges: Vec<EdgeStyle>,
    pub matched: usize,
    pub visible_edges: usize,
}

pub fn edge_visible(edge: &Edge, min_weight: f32) -> bool {
    edge.keep_structural && edge.weight >= min_weight
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Indices whose label matches the trimmed query. Empty query matches nothing.
pub fn matched_nodes(graph: &Graph, query: &str, mode: SearchMode) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    match mode {
        SearchMode::Substring => {
            let needle = query.to_lowercase();
            graph
                .nodes()
                .iter()
                .enumerate()
                .filter(|(_, node)| node.label.to_lowercase().contains(&needle))
                .map(|(index, _)| index)
                .collect()
        }
        SearchMode::Fuzzy => {
            let matcher = SkimMatcherV2::default();
            graph
                .nodes()
                .iter()
                .enumerate()
                .filter(|(_, node)| fuzzy_match_score(&matcher, &node.label, query).is_some())
                .map(|(index, _)| index)
                .collect()
        }
    }
}

/// `None` while no search is active.
pub fn relevant_nodes(graph: &Graph, query: &str, mode: SearchMode) -> Option<(Vec<bool>, usize)> {
    if query.trim().is_empty() {
        return None;
    }

    let matched = matched_nodes(graph, query, mode);
    let mut relevant = vec![false; graph.order()];
    for &index in &matched {
        relevant[index] = true;
        for neighbor in graph.neighbor_indices(index) {
            relevant[neighbor] = true;
        }
    }
    Some((relevant, matched.len()))
}

pub fn derive_overlay(graph: &Graph, params: &FilterParams) -> Overlay {
    let relevance = relevant_nodes(graph, &params.query, params.mode);
    let is_relevant = |index: usize| {
        relevance
            .as_ref()
            .is_none_or(|(relevant, _)| relevant[index])
    };

    let nodes = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            if is_relevant(index) {
                NodeStyle {
                    size: node.size,
                    color: node.kind.color(),
                    dimmed: false,
                    z_index: 1,
                }
            } else {
                NodeStyle {
                    size: (node.size * DIM_NODE_SCALE).max(node.size.min(DIM_NODE_FLOOR)),
                    color: dimmed_node_color(),
                    dimmed: true,
                    z_index: 0,
                }
            }
        })
        .collect::<Vec<_>>();

    let mut visible_edges = 0;
    let edges = graph
        .edges()
        .iter()
        .map(|edge| {
            let hidden = !edge_visible(edge, params.min_weight);
            if !hidden {
                visible_edges += 1;
            }

            if is_relevant(edge.source) || is_relevant(edge.target) {
                EdgeStyle {
                    size: edge.size,
                    color: edge_color(),
                    hidden,
                    dimmed: false,
                }
            } else {
                EdgeStyle {
                    size: (edge.size * DIM_EDGE_SCALE).max(edge.size.min(DIM_EDGE_FLOOR)),
                    color: dimmed_edge_color(),
                    hidden,
                    dimmed: true,
                }
            }
        })
        .collect::<Vec<_>>();

    Overlay {
        nodes,
        edges,
        matched: relevance.as_ref().map_or(0, |(_, matched)| *matched),
        visible_edges,
    }
}
