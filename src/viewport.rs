use std::time::{Duration, Instant};

use eframe::egui::{Vec2, vec2};

const MIN_EXTENT: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn sanitized(self) -> (f32, f32) {
        let clean = |value: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                1.0
            }
        };
        (clean(self.width), clean(self.height))
    }
}

impl From<Vec2> for Surface {
    fn from(size: Vec2) -> Self {
        Self::new(size.x, size.y)
    }
}

/// Centers the bounding box of `positions` on the origin and scales it
/// uniformly so it spans `padding` of the limiting surface dimension.
pub fn normalize(positions: &mut [Vec2], surface: Surface, padding: f32) {
    if positions.len() < 2 {
        return;
    }

    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for position in positions.iter() {
        min = min.min(*position);
        max = max.max(*position);
    }
    if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
        return;
    }

    let (width, height) = surface.sanitized();
    let padding = if padding.is_finite() && padding > 0.0 {
        padding
    } else {
        1.0
    };

    let extent = vec2((max.x - min.x).max(MIN_EXTENT), (max.y - min.y).max(MIN_EXTENT));
    let center = (min + max) * 0.5;
    let scale = (extent.x / (width * padding)).max(extent.y / (height * padding));
    let inverse = 1.0 / scale;

    for position in positions.iter_mut() {
        *position = (*position - center) * inverse;
    }
}

/// Keeps only the newest resize; each new one restarts the quiet period.
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(Instant, Surface)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending resize and returns when it becomes due.
    pub fn schedule(&mut self, surface: Surface, now: Instant) -> Instant {
        let due = now + self.delay;
        self.pending = Some((due, surface));
        due
    }

    pub fn poll(&mut self, now: Instant) -> Option<Surface> {
        match self.pending {
            Some((due, surface)) if now >= due => {
                self.pending = None;
                Some(surface)
            }
            _ => None,
        }
    }

    pub fn due(&self) -> Option<Instant> {
        self.pending.map(|(due, _)| due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[Vec2], b: &[Vec2]) -> bool {
        a.iter()
            .zip(b)
            .all(|(a, b)| (*a - *b).length() <= 1e-3 * (1.0 + a.length()))
    }

    fn sample() -> Vec<Vec2> {
        vec![
            vec2(-120.0, 40.0),
            vec2(380.0, -15.0),
            vec2(90.0, 260.0),
            vec2(15.0, -70.0),
        ]
    }

    #[test]
    fn fits_limiting_dimension_and_centers() {
        let mut positions = sample();
        normalize(&mut positions, Surface::new(800.0, 600.0), 0.85);

        let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = positions.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = positions.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        assert!((max_x - min_x - 680.0).abs() < 1e-2);
        assert!(max_y - min_y <= 510.0 + 1e-2);
        assert!((min_x + max_x).abs() < 1e-3);
        assert!((min_y + max_y).abs() < 1e-3);
    }

    #[test]
    fn normalization_is_idempotent() {
        let surface = Surface::new(1024.0, 480.0);
        let mut once = sample();
        normalize(&mut once, surface, 0.85);
        let mut twice = once.clone();
        normalize(&mut twice, surface, 0.85);

        assert!(close(&once, &twice));
    }

    #[test]
    fn degenerate_inputs_are_safe() {
        let mut single = vec![vec2(3.0, 4.0)];
        normalize(&mut single, Surface::new(100.0, 100.0), 0.85);
        assert_eq!(single, vec![vec2(3.0, 4.0)]);

        let mut stacked = vec![vec2(2.0, 2.0), vec2(2.0, 2.0)];
        normalize(&mut stacked, Surface::new(0.0, f32::NAN), 0.85);
        assert!(stacked.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert_eq!(stacked[0], stacked[1]);
    }

    #[test]
    fn debouncer_keeps_latest_resize_only() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new(Duration::from_millis(150));

        debouncer.schedule(Surface::new(100.0, 100.0), start);
        let due = debouncer.schedule(Surface::new(300.0, 200.0), start + Duration::from_millis(100));

        assert_eq!(debouncer.poll(start + Duration::from_millis(200)), None);
        assert_eq!(debouncer.due(), Some(due));
        assert_eq!(debouncer.poll(due), Some(Surface::new(300.0, 200.0)));
        assert_eq!(debouncer.poll(due + Duration::from_secs(1)), None);
        assert_eq!(debouncer.due(), None);
    }
}
