use eframe::egui::{Vec2, vec2};

use crate::config::OverlapConfig;

use super::quadtree::{QuadNode, visit_close_pairs};

fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Pushes overlapping circles apart until none overlap or the pass budget is
/// spent. Returns the number of passes run.
pub fn resolve_overlaps(positions: &mut [Vec2], sizes: &[f32], config: &OverlapConfig) -> usize {
    let count = positions.len();
    if count < 2 || config.max_iterations == 0 {
        return 0;
    }

    let radii = sizes
        .iter()
        .map(|size| size * config.ratio + config.margin)
        .collect::<Vec<_>>();
    let max_radius = radii.iter().copied().fold(0.0_f32, f32::max);
    let reach = max_radius * 2.0;
    let step_scale = 0.1 * config.speed;
    let unit_masses = vec![1.0; count];
    let mut shifts = vec![Vec2::ZERO; count];

    for pass in 0..config.max_iterations {
        let Some(tree) = QuadNode::build(positions, &unit_masses) else {
            return pass;
        };

        let mut collided = false;
        visit_close_pairs(&tree, reach * reach, &mut |a, b| {
            let delta = positions[b] - positions[a];
            let distance = delta.length();
            if distance >= radii[a] + radii[b] {
                return;
            }

            collided = true;
            let direction = if distance > 1e-4 {
                delta / distance
            } else {
                fallback_direction(a.min(b), a.max(b))
            };
            shifts[b] += direction * (1.0 + sizes[a]);
            shifts[a] -= direction * (1.0 + sizes[b]);
        });

        if !collided {
            return pass;
        }

        for (position, shift) in positions.iter_mut().zip(shifts.iter_mut()) {
            *position += *shift * step_scale;
            *shift = Vec2::ZERO;
        }
    }

    config.max_iterations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(positions: &[Vec2], sizes: &[f32], config: &OverlapConfig) -> usize {
        let mut count = 0;
        for a in 0..positions.len() {
            for b in (a + 1)..positions.len() {
                let limit = sizes[a] * config.ratio + config.margin + sizes[b] * config.ratio
                    + config.margin;
                if (positions[a] - positions[b]).length() < limit - 1e-3 {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn separated_nodes_are_left_alone() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0), vec2(0.0, 100.0)];
        let before = positions.clone();
        let passes = resolve_overlaps(&mut positions, &[1.0, 1.0, 1.0], &OverlapConfig::default());

        assert_eq!(passes, 0);
        assert_eq!(positions, before);
    }

    #[test]
    fn clump_is_spread_without_overlap() {
        let config = OverlapConfig {
            max_iterations: 2_000,
            ..OverlapConfig::default()
        };
        let mut positions = (0..25)
            .map(|index| vec2((index % 5) as f32 * 0.5, (index / 5) as f32 * 0.5))
            .collect::<Vec<_>>();
        let sizes = vec![1.5; positions.len()];

        let passes = resolve_overlaps(&mut positions, &sizes, &config);

        assert!(passes < config.max_iterations);
        assert_eq!(overlaps(&positions, &sizes, &config), 0);
    }

    #[test]
    fn coincident_nodes_get_separated() {
        let mut positions = vec![vec2(2.0, 2.0); 3];
        let sizes = vec![1.0; 3];
        let config = OverlapConfig::default();
        resolve_overlaps(&mut positions, &sizes, &config);

        assert!(positions.iter().all(|position| position.x.is_finite()));
        assert_ne!(positions[0], positions[1]);
        assert_ne!(positions[1], positions[2]);
    }
}
