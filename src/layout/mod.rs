mod forces;
mod noverlap;
mod quadtree;

use std::f32::consts::TAU;

use eframe::egui::vec2;
use rand::Rng;
use tracing::debug;

use crate::config::{ForceConfig, OverlapConfig};
use crate::network::Graph;

use forces::{Bodies, Spring, spring_strength};
pub use noverlap::resolve_overlaps;

// Keeps `scaling * m1 * m2` finite in f32.
const MAX_MASS: f32 = 1e6;

pub fn seed_positions(graph: &mut Graph, rng: &mut impl Rng, radius: f32) {
    let positions = (0..graph.order())
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let distance = radius * rng.r#gen::<f32>().sqrt();
            vec2(angle.cos(), angle.sin()) * distance
        })
        .collect::<Vec<_>>();
    graph.set_positions(&positions);
}

/// Runs the force simulation over every edge, kept or not. Returns the number
/// of iterations performed.
pub fn force_layout(graph: &mut Graph, config: &ForceConfig) -> usize {
    let order = graph.order();
    if order < 2 {
        return 0;
    }

    let mut masses = vec![1.0_f32; order];
    let mut springs = Vec::with_capacity(graph.size());
    for edge in graph.edges() {
        let weight = edge.weight.min(MAX_MASS);
        masses[edge.source] = (masses[edge.source] + weight).min(MAX_MASS);
        masses[edge.target] = (masses[edge.target] + weight).min(MAX_MASS);
        springs.push(Spring {
            source: edge.source,
            target: edge.target,
            strength: spring_strength(weight, config.edge_weight_influence).min(MAX_MASS),
        });
    }

    let sizes = graph.nodes().iter().map(|node| node.size).collect();
    let mut bodies = Bodies::new(graph.positions(), sizes, masses);

    let iterations = config.iterations.iterations_for(order);
    for _ in 0..iterations {
        forces::step(&mut bodies, &springs, config);
    }

    graph.set_positions(&bodies.positions);
    debug!(order, edges = graph.size(), iterations, "force layout finished");
    iterations
}

pub fn remove_overlaps(graph: &mut Graph, config: &OverlapConfig) -> usize {
    if !config.enabled || graph.order() < 2 {
        return 0;
    }

    let mut positions = graph.positions();
    let sizes = graph.nodes().iter().map(|node| node.size).collect::<Vec<_>>();
    let passes = resolve_overlaps(&mut positions, &sizes, config);
    graph.set_positions(&positions);
    debug!(passes, "overlap pass finished");
    passes
}
