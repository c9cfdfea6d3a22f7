use eframe::egui::Vec2;

use crate::config::ForceConfig;

use super::quadtree::QuadNode;

const ADJUSTED_MAX_FORCE: f32 = 10.0;
const OVERLAP_REPULSION: f32 = 100.0;

/// Per-node simulation state. `mass` is one plus the weighted degree, capped.
pub(super) struct Bodies {
    pub(super) positions: Vec<Vec2>,
    pub(super) sizes: Vec<f32>,
    pub(super) masses: Vec<f32>,
    pub(super) forces: Vec<Vec2>,
    pub(super) previous: Vec<Vec2>,
    pub(super) convergence: Vec<f32>,
}

impl Bodies {
    pub(super) fn new(positions: Vec<Vec2>, sizes: Vec<f32>, masses: Vec<f32>) -> Self {
        let len = positions.len();
        Self {
            positions,
            sizes,
            masses,
            forces: vec![Vec2::ZERO; len],
            previous: vec![Vec2::ZERO; len],
            convergence: vec![1.0; len],
        }
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Clone, Copy)]
pub(super) struct Spring {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
}

pub(super) fn spring_strength(weight: f32, influence: f32) -> f32 {
    if influence == 0.0 {
        1.0
    } else if influence == 1.0 {
        weight
    } else {
        weight.powf(influence)
    }
}

fn pair_repulsion(
    delta: Vec2,
    mass_product: f32,
    combined_size: f32,
    config: &ForceConfig,
) -> Vec2 {
    let coefficient = config.scaling_ratio * mass_product;
    if config.adjust_sizes {
        let distance = delta.length() - combined_size;
        if distance > 0.0 {
            delta * (coefficient / (distance * distance))
        } else if distance < 0.0 {
            delta * (OVERLAP_REPULSION * coefficient)
        } else {
            Vec2::ZERO
        }
    } else {
        let distance_sq = delta.length_sq();
        if distance_sq > 0.0 {
            delta * (coefficient / distance_sq)
        } else {
            Vec2::ZERO
        }
    }
}

fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    bodies: &Bodies,
    config: &ForceConfig,
    force: &mut Vec2,
) {
    if node.count == 0 {
        return;
    }

    let point = bodies.positions[index];
    let mass = bodies.masses[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            *force += pair_repulsion(
                point - bodies.positions[other],
                mass * bodies.masses[other],
                bodies.sizes[index] + bodies.sizes[other],
                config,
            );
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq().max(1e-8);
    let distance = distance_sq.sqrt();
    let can_approximate = node.count > 1
        && !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < config.barnes_hut_theta;

    if can_approximate {
        *force += delta * (config.scaling_ratio * mass * node.mass / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, bodies, config, force);
    }
}

fn apply_repulsion(bodies: &mut Bodies, config: &ForceConfig) {
    let count = bodies.len();

    if config.barnes_hut {
        let Some(tree) = QuadNode::build(&bodies.positions, &bodies.masses) else {
            return;
        };
        for index in 0..count {
            let mut force = Vec2::ZERO;
            accumulate_repulsion_for_node(&tree, index, bodies, config, &mut force);
            bodies.forces[index] += force;
        }
        return;
    }

    for i in 0..count {
        for j in (i + 1)..count {
            let force = pair_repulsion(
                bodies.positions[i] - bodies.positions[j],
                bodies.masses[i] * bodies.masses[j],
                bodies.sizes[i] + bodies.sizes[j],
                config,
            );
            bodies.forces[i] += force;
            bodies.forces[j] -= force;
        }
    }
}

fn apply_gravity(bodies: &mut Bodies, config: &ForceConfig) {
    for index in 0..bodies.len() {
        let position = bodies.positions[index];
        let distance = position.length();
        if distance > 0.0 {
            let factor = config.gravity * bodies.masses[index] / distance;
            bodies.forces[index] -= position * factor;
        }
    }
}

fn apply_attraction(bodies: &mut Bodies, springs: &[Spring], config: &ForceConfig) {
    let compensation = if config.outbound_attraction_distribution {
        let total = bodies.masses.iter().sum::<f32>();
        total / bodies.len().max(1) as f32
    } else {
        1.0
    };

    for spring in springs {
        let (source, target) = (spring.source, spring.target);
        let delta = bodies.positions[source] - bodies.positions[target];
        let mut distance = delta.length();
        if config.adjust_sizes {
            distance -= bodies.sizes[source] + bodies.sizes[target];
        }
        if distance <= 0.0 {
            continue;
        }

        let mut factor = -compensation * spring.strength;
        if config.lin_log {
            factor *= (1.0 + distance).ln() / distance;
        }
        if config.outbound_attraction_distribution {
            factor /= bodies.masses[source];
        }

        bodies.forces[source] += delta * factor;
        bodies.forces[target] -= delta * factor;
    }
}

fn apply_displacement(bodies: &mut Bodies, config: &ForceConfig) {
    let slow_down = config.slow_down.max(f32::EPSILON);

    for index in 0..bodies.len() {
        let mut force = bodies.forces[index];
        if config.adjust_sizes {
            let magnitude = force.length();
            if magnitude > ADJUSTED_MAX_FORCE {
                force *= ADJUSTED_MAX_FORCE / magnitude;
            }
        }

        let previous = bodies.previous[index];
        let swinging = bodies.masses[index] * (previous - force).length();
        let traction = (previous + force).length() * 0.5;

        let speed = if config.adjust_sizes {
            0.1 * (1.0 + traction).ln() / (1.0 + swinging.sqrt())
        } else {
            let speed = bodies.convergence[index] * (1.0 + traction).ln() / (1.0 + swinging.sqrt());
            bodies.convergence[index] =
                (speed * force.length_sq() / (1.0 + swinging.sqrt())).sqrt().min(1.0);
            speed
        };

        let step = force * (speed / slow_down);
        if step.x.is_finite() && step.y.is_finite() {
            bodies.positions[index] += step;
        }
        bodies.previous[index] = force;
        bodies.forces[index] = Vec2::ZERO;
    }
}

pub(super) fn step(bodies: &mut Bodies, springs: &[Spring], config: &ForceConfig) {
    if bodies.len() < 2 {
        return;
    }

    apply_repulsion(bodies, config);
    apply_gravity(bodies, config);
    apply_attraction(bodies, springs, config);
    apply_displacement(bodies, config);
}
