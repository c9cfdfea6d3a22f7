use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::config::PipelineConfig;
use crate::layout::{force_layout, remove_overlaps, seed_positions};
use crate::network::{Graph, Payload, sparsify, validate};
use crate::session::Session;
use crate::viewport::Surface;

/// Positions are left in simulation space; binding to a surface happens in
/// [`Session::new`].
pub fn build(payload: &Payload, config: &PipelineConfig) -> Graph {
    let started = Instant::now();
    let records = validate(payload);
    let mut graph = Graph::from_records(&records, config.node_sizing, config.edge_sizing);

    let kept = sparsify::apply(&mut graph, config.top_k);

    let mut rng = StdRng::seed_from_u64(config.seed);
    seed_positions(&mut graph, &mut rng, config.initial_radius);
    let iterations = force_layout(&mut graph, &config.force);
    let overlap_passes = remove_overlaps(&mut graph, &config.overlap);

    info!(
        profile = config.profile.label(),
        nodes = graph.order(),
        edges = graph.size(),
        kept,
        iterations,
        overlap_passes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "network built"
    );
    graph
}

pub fn run(payload: &Payload, config: &PipelineConfig, surface: Option<Surface>) -> Option<Session> {
    let surface = surface?;
    let graph = Arc::new(build(payload, config));
    Some(Session::new(graph, surface, config))
}
