use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::graph::NodeKind;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub href: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub weight: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Records {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub skipped_nodes: usize,
    pub skipped_edges: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_id(self) -> Option<String> {
        let id = match self {
            Self::Text(text) => text.trim().to_owned(),
            Self::Number(number) => number.to_string(),
        };
        (!id.is_empty()).then_some(id)
    }
}

// Optional attributes stay untyped so an off-type value only loses that
// attribute, not the node.
#[derive(Deserialize)]
struct RawNode {
    id: RawId,
    #[serde(default)]
    label: Option<Value>,
    #[serde(default)]
    kind: Option<Value>,
    #[serde(default)]
    href: Option<Value>,
}

#[derive(Deserialize)]
struct RawEdge {
    source: RawId,
    target: RawId,
    #[serde(default)]
    weight: Option<f64>,
}

pub fn parse_payload(raw: &str) -> Result<Payload> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in relation payload")?;
    if !parsed.is_object() {
        return Err(anyhow!("relation payload must be a JSON object"));
    }
    Payload::deserialize(parsed).context("relation payload has no usable node/edge lists")
}

pub fn load_payload(path: &Path) -> Result<Payload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read relation payload {}", path.display()))?;
    parse_payload(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_owned())
        }
        _ => None,
    }
}

fn normalize_node(value: &Value) -> Option<NodeRecord> {
    let raw = RawNode::deserialize(value).ok()?;
    let id = raw.id.into_id()?;
    let label = scalar_text(raw.label).unwrap_or_else(|| id.clone());
    let kind = string_text(raw.kind)
        .map(|kind| NodeKind::parse(&kind))
        .unwrap_or_default();
    let href = string_text(raw.href);

    Some(NodeRecord {
        id,
        label,
        kind,
        href,
    })
}

fn normalize_edge(value: &Value) -> Option<EdgeRecord> {
    let raw = RawEdge::deserialize(value).ok()?;
    let source = raw.source.into_id()?;
    let target = raw.target.into_id()?;
    if source == target {
        return None;
    }

    // Missing and zero weights count as a single relation.
    let weight = match raw.weight {
        None => 1.0,
        Some(weight) if weight == 0.0 => 1.0,
        Some(weight) if weight.is_finite() && weight > 0.0 => weight as f32,
        Some(_) => return None,
    };
    if !weight.is_finite() {
        return None;
    }

    Some(EdgeRecord {
        source,
        target,
        weight,
    })
}

/// Normalizes every record up front. Edges are only checked in isolation here;
/// dangling endpoints are dropped when the graph is assembled.
pub fn validate(payload: &Payload) -> Records {
    let mut records = Records::default();

    for (index, value) in payload.nodes.iter().enumerate() {
        match normalize_node(value) {
            Some(node) => records.nodes.push(node),
            None => {
                debug!(index, "skipping malformed node record");
                records.skipped_nodes += 1;
            }
        }
    }

    for (index, value) in payload.edges.iter().enumerate() {
        match normalize_edge(value) {
            Some(edge) => records.edges.push(edge),
            None => {
                debug!(index, "skipping malformed edge record");
                records.skipped_edges += 1;
            }
        }
    }

    if records.nodes.is_empty() {
        warn!("relation payload contains no usable nodes");
    }
    info!(
        nodes = records.nodes.len(),
        edges = records.edges.len(),
        skipped_nodes = records.skipped_nodes,
        skipped_edges = records.skipped_edges,
        "validated relation payload"
    );

    records
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Payload {
        Payload::deserialize(value).unwrap()
    }

    #[test]
    fn node_defaults_follow_id_and_reception() {
        let records = validate(&payload(json!({
            "nodes": [
                { "id": "a" },
                { "id": "b", "label": "  ", "kind": "", "href": "" },
                { "id": 7, "label": "Seven", "kind": "frag", "href": "https://example.org/7" }
            ]
        })));

        assert_eq!(records.nodes.len(), 3);
        assert_eq!(records.nodes[0].label, "a");
        assert_eq!(records.nodes[0].kind, NodeKind::Reception);
        assert_eq!(records.nodes[1].label, "b");
        assert_eq!(records.nodes[1].href, None);
        assert_eq!(records.nodes[2].id, "7");
        assert_eq!(records.nodes[2].kind, NodeKind::Fragment);
        assert_eq!(records.nodes[2].href.as_deref(), Some("https://example.org/7"));
    }

    #[test]
    fn malformed_records_are_counted_not_fatal() {
        let records = validate(&payload(json!({
            "nodes": [
                { "label": "no id" },
                { "id": "" },
                { "id": ["x"] },
                { "id": "ok", "label": 12 },
                "just a string",
                { "id": "fine" }
            ],
            "edges": [
                { "source": "a", "target": "a" },
                { "source": "a" },
                { "source": "a", "target": "b", "weight": -2 },
                { "source": "a", "target": "b", "weight": "heavy" },
                { "source": "a", "target": "b" },
                { "source": "a", "target": "b", "weight": 0 },
                { "source": "a", "target": "b", "weight": 2.5 }
            ]
        })));

        assert_eq!(records.nodes.len(), 2);
        assert_eq!(records.nodes[0].label, "12");
        assert_eq!(records.skipped_nodes, 4);
        assert_eq!(records.edges.len(), 3);
        assert_eq!(records.skipped_edges, 4);
        assert_eq!(records.edges[0].weight, 1.0);
        assert_eq!(records.edges[1].weight, 1.0);
        assert_eq!(records.edges[2].weight, 2.5);
    }

    #[test]
    fn off_type_attributes_fall_back_instead_of_dropping_the_node() {
        let records = validate(&payload(json!({
            "nodes": [
                { "id": "a", "label": "Alpha" },
                { "id": "b", "label": 1913 },
                { "id": "c", "kind": 2, "href": { "url": "x" } },
                { "id": "d", "label": true, "kind": ["frag"], "href": 5 },
                { "id": "e", "label": { "text": "nested" } }
            ]
        })));

        assert_eq!(records.skipped_nodes, 0);
        let labels = records
            .nodes
            .iter()
            .map(|node| node.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Alpha", "1913", "c", "true", "e"]);
        assert_eq!(records.nodes[2].kind, NodeKind::Reception);
        assert_eq!(records.nodes[2].href, None);
        assert_eq!(records.nodes[3].kind, NodeKind::Reception);
        assert_eq!(records.nodes[3].href, None);
    }

    #[test]
    fn missing_lists_are_empty() {
        let parsed = parse_payload("{}").unwrap();
        assert!(parsed.nodes.is_empty());
        assert!(parsed.edges.is_empty());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(parse_payload("[]").is_err());
        assert!(parse_payload("not json").is_err());
    }
}
