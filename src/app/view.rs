use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use eframe::egui::{
    self, Align, Align2, Color32, Context, FontId, Layout, Pos2, Sense, Stroke, Ui, Vec2, vec2,
};

use itx_network::config::{PipelineConfig, SearchMode};
use itx_network::network::Graph;
use itx_network::session::{Event, Outcome, Session};
use itx_network::viewport::Surface;

use super::ViewModel;
use super::render_utils::{circle_visible, draw_background, edge_visible, world_to_screen};

const NODE_PIXEL_SCALE: f32 = 2.5;
const EDGE_PIXEL_SCALE: f32 = 1.2;
const LABEL_ZOOM: f32 = 2.5;

pub(super) fn dataset_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ViewModel {
    pub(super) fn new(dataset: usize, graph: Arc<Graph>, config: PipelineConfig) -> Self {
        Self {
            dataset,
            requested_dataset: None,
            graph,
            session: None,
            last_canvas: None,
            threshold: config.threshold.clamp(config.threshold.default),
            search: String::new(),
            search_mode: config.search,
            pan: Vec2::ZERO,
            zoom: 1.0,
            config,
        }
    }

    pub(super) fn show(&mut self, ctx: &Context, datasets: &[PathBuf]) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("itx-network");
                    ui.separator();
                    if let Some(path) = datasets.get(self.dataset) {
                        ui.label(dataset_name(path));
                    }
                    ui.label(format!("nodes: {}", self.graph.order()));
                    ui.label(format!("edges: {}", self.graph.size()));
                    ui.label(format!("profile: {}", self.config.profile.label()));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(session) = &self.session {
                            ui.label(format!(
                                "visible edges: {}",
                                session.overlay().visible_edges
                            ));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui, datasets));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    fn sync_controls(session: &mut Session, threshold: f32, search: &str, mode: SearchMode) {
        session.handle(Event::Threshold(threshold));
        if session.params().query != search {
            session.handle(Event::Search(search.to_owned()));
        }
        session.handle(Event::SearchMode(mode));
    }

    fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let now = Instant::now();
        let canvas = rect.size();
        let surface = Surface::from(canvas);
        let previous_canvas = self.last_canvas.replace(canvas);
        let session = self
            .session
            .get_or_insert_with(|| Session::new(Arc::clone(&self.graph), surface, &self.config));

        if previous_canvas.is_some_and(|previous| previous != canvas)
            && let Outcome::Scheduled { due } = session.handle(Event::Resize { surface, at: now })
        {
            ui.ctx()
                .request_repaint_after(due.saturating_duration_since(now));
        }
        if session.handle(Event::Tick(now)) == Outcome::Renormalized {
            ui.ctx().request_repaint();
        } else if let Some(due) = session.pending_resize() {
            ui.ctx()
                .request_repaint_after(due.saturating_duration_since(now));
        }

        Self::sync_controls(session, self.threshold, &self.search, self.search_mode);

        let overlay = session.overlay();
        let graph = session.graph();
        let (pan, zoom) = (self.pan, self.zoom);
        let zoom_scale = zoom.sqrt();

        let screen_positions = session
            .positions()
            .iter()
            .map(|position| world_to_screen(rect, pan, zoom, *position))
            .collect::<Vec<Pos2>>();
        let screen_radii = overlay
            .nodes
            .iter()
            .map(|style| (style.size * NODE_PIXEL_SCALE * zoom_scale).max(1.5))
            .collect::<Vec<_>>();

        // Dimmed edges first so emphasized ones stay on top.
        for dimmed_pass in [true, false] {
            for (edge, style) in graph.edges().iter().zip(&overlay.edges) {
                if style.hidden || style.dimmed != dimmed_pass {
                    continue;
                }
                let start = screen_positions[edge.source];
                let end = screen_positions[edge.target];
                if !edge_visible(rect, start, end, 2.0) {
                    continue;
                }
                let width = (style.size * EDGE_PIXEL_SCALE * zoom_scale).max(0.5);
                painter.line_segment([start, end], Stroke::new(width, style.color));
            }
        }

        let mut draw_order = (0..graph.order()).collect::<Vec<_>>();
        draw_order.sort_by_key(|&index| overlay.nodes[index].z_index);

        let hovered = Self::hovered_index(ui, &draw_order, &screen_positions, &screen_radii);
        if hovered.is_some_and(|index| session.href(index).is_some()) {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        for &index in &draw_order {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let style = overlay.nodes[index];
            painter.circle_filled(position, radius, style.color);
            if hovered == Some(index) {
                painter.circle_stroke(
                    position,
                    radius + 1.5,
                    Stroke::new(1.5, Color32::from_rgb(55, 65, 81)),
                );
            }

            let show_label = hovered == Some(index) || (!style.dimmed && zoom > LABEL_ZOOM);
            if show_label && let Some(node) = graph.node(index) {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.label,
                    FontId::proportional(12.0),
                    Color32::from_gray(40),
                );
            }
        }

        if let Some(index) = hovered
            && let Some(node) = graph.node(index)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  degree {}", node.label, node.kind.label(), node.degree),
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(href) = hovered.and_then(|index| session.href(index))
        {
            ui.ctx().open_url(egui::OpenUrl::new_tab(href));
        }
    }
}
