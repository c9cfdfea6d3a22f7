use std::sync::Arc;
use std::time::Instant;

use eframe::egui::Vec2;
use tracing::debug;

use crate::config::{PipelineConfig, SearchMode, ThresholdConfig};
use crate::filter::{FilterParams, Overlay, derive_overlay};
use crate::network::Graph;
use crate::viewport::{ResizeDebouncer, Surface, normalize};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Threshold(f32),
    Search(String),
    SearchMode(SearchMode),
    /// The drawing surface changed size at `at`. Applied once the debounce
    /// window passes without a newer resize.
    Resize { surface: Surface, at: Instant },
    Tick(Instant),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Unchanged,
    Restyled(Arc<Overlay>),
    Scheduled { due: Instant },
    Renormalized,
}

pub struct Session {
    graph: Arc<Graph>,
    positions: Vec<Vec2>,
    surface: Surface,
    padding: f32,
    threshold: ThresholdConfig,
    params: FilterParams,
    overlay: Arc<Overlay>,
    debouncer: ResizeDebouncer,
}

impl Session {
    pub fn new(graph: Arc<Graph>, surface: Surface, config: &PipelineConfig) -> Self {
        let params = FilterParams::new(
            config.threshold.clamp(config.threshold.default),
            config.search,
        );
        let overlay = Arc::new(derive_overlay(&graph, &params));
        let mut positions = graph.positions();
        normalize(&mut positions, surface, config.viewport.padding);

        Self {
            graph,
            positions,
            surface,
            padding: config.viewport.padding,
            threshold: config.threshold,
            params,
            overlay,
            debouncer: ResizeDebouncer::new(config.viewport.debounce()),
        }
    }

    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Threshold(value) => {
                let value = self.threshold.clamp(value);
                if value == self.params.min_weight {
                    return Outcome::Unchanged;
                }
                self.params.min_weight = value;
                self.restyle()
            }
            Event::Search(query) => {
                if query == self.params.query {
                    return Outcome::Unchanged;
                }
                self.params.query = query;
                self.restyle()
            }
            Event::SearchMode(mode) => {
                if mode == self.params.mode {
                    return Outcome::Unchanged;
                }
                self.params.mode = mode;
                self.restyle()
            }
            Event::Resize { surface, at } => Outcome::Scheduled {
                due: self.debouncer.schedule(surface, at),
            },
            Event::Tick(now) => match self.debouncer.poll(now) {
                Some(surface) => {
                    self.renormalize(surface);
                    Outcome::Renormalized
                }
                None => Outcome::Unchanged,
            },
        }
    }

    fn restyle(&mut self) -> Outcome {
        self.overlay = Arc::new(derive_overlay(&self.graph, &self.params));
        debug!(
            min_weight = self.params.min_weight,
            matched = self.overlay.matched,
            visible_edges = self.overlay.visible_edges,
            "overlay re-derived"
        );
        Outcome::Restyled(Arc::clone(&self.overlay))
    }

    fn renormalize(&mut self, surface: Surface) {
        self.surface = surface;
        normalize(&mut self.positions, surface, self.padding);
        debug!(width = surface.width, height = surface.height, "layout renormalized");
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Screen-space positions centered on the origin, one per node.
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn overlay(&self) -> Arc<Overlay> {
        Arc::clone(&self.overlay)
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn pending_resize(&self) -> Option<Instant> {
        self.debouncer.due()
    }

    pub fn href(&self, node: usize) -> Option<&str> {
        self.graph.node(node)?.href.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use eframe::egui::vec2;

    use super::*;
    use crate::config::{EdgeSizing, NodeSizing};
    use crate::network::{NodeKind, NodeRecord};

    fn graph() -> Arc<Graph> {
        let mut graph = Graph::new(NodeSizing::default(), EdgeSizing::default());
        for (id, href) in [("a", Some("https://example.org/a")), ("b", None), ("c", None)] {
            graph.add_node(NodeRecord {
                id: id.to_owned(),
                label: format!("Witness {id}"),
                kind: NodeKind::Reception,
                href: href.map(str::to_owned),
            });
        }
        graph.add_or_merge_edge("a", "b", 3.0);
        graph.add_or_merge_edge("b", "c", 8.0);
        graph.set_positions(&[vec2(-10.0, 0.0), vec2(0.0, 5.0), vec2(30.0, -5.0)]);
        Arc::new(graph)
    }

    fn extent(positions: &[Vec2]) -> Vec2 {
        let min = positions.iter().fold(Vec2::splat(f32::INFINITY), |acc, p| acc.min(*p));
        let max = positions.iter().fold(Vec2::splat(f32::NEG_INFINITY), |acc, p| acc.max(*p));
        max - min
    }

    #[test]
    fn starts_normalized_with_default_threshold() {
        let session = Session::new(graph(), Surface::new(400.0, 300.0), &PipelineConfig::default());

        assert!((extent(session.positions()).x - 340.0).abs() < 1e-2);
        assert_eq!(session.params().min_weight, 1.0);
        assert_eq!(session.overlay().visible_edges, 2);
        assert_eq!(session.href(0), Some("https://example.org/a"));
        assert_eq!(session.href(1), None);
        assert_eq!(session.href(42), None);
    }

    #[test]
    fn controls_restyle_without_moving_nodes() {
        let mut session = Session::new(graph(), Surface::new(400.0, 300.0), &PipelineConfig::default());
        let before = session.positions().to_vec();

        let Outcome::Restyled(overlay) = session.handle(Event::Threshold(5.0)) else {
            panic!("threshold change should restyle");
        };
        assert_eq!(overlay.visible_edges, 1);
        assert_eq!(session.handle(Event::Threshold(5.0)), Outcome::Unchanged);

        let Outcome::Restyled(overlay) = session.handle(Event::Search("witness c".to_owned())) else {
            panic!("search change should restyle");
        };
        assert_eq!(overlay.matched, 1);
        assert!(overlay.nodes[0].dimmed);
        assert!(!overlay.nodes[1].dimmed);

        assert_eq!(session.positions(), before.as_slice());
    }

    #[test]
    fn threshold_is_clamped_to_configured_range() {
        let mut session = Session::new(graph(), Surface::new(400.0, 300.0), &PipelineConfig::default());
        session.handle(Event::Threshold(500.0));
        assert_eq!(session.params().min_weight, 20.0);
        assert_eq!(session.overlay().visible_edges, 0);
    }

    #[test]
    fn only_the_last_resize_is_applied() {
        let mut session = Session::new(graph(), Surface::new(400.0, 300.0), &PipelineConfig::default());
        let start = Instant::now();

        session.handle(Event::Resize {
            surface: Surface::new(200.0, 200.0),
            at: start,
        });
        let Outcome::Scheduled { due } = session.handle(Event::Resize {
            surface: Surface::new(1000.0, 800.0),
            at: start + Duration::from_millis(50),
        }) else {
            panic!("resize should be scheduled");
        };

        assert_eq!(session.handle(Event::Tick(start + Duration::from_millis(160))), Outcome::Unchanged);
        assert_eq!(session.surface(), Surface::new(400.0, 300.0));
        assert_eq!(session.handle(Event::Tick(due)), Outcome::Renormalized);
        assert_eq!(session.surface(), Surface::new(1000.0, 800.0));
        assert!((extent(session.positions()).x - 850.0).abs() < 1e-1);
        assert_eq!(session.pending_resize(), None);
    }
}
