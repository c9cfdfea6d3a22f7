mod graph;
pub mod ingest;
pub mod sparsify;

pub use graph::{Edge, Graph, Node, NodeKind};
pub use ingest::{EdgeRecord, NodeRecord, Payload, Records, load_payload, parse_payload, validate};
