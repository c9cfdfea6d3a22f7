use std::path::PathBuf;

use eframe::egui::{self, Color32, Sense, Ui, vec2};

use itx_network::config::SearchMode;
use itx_network::filter::edge_color;
use itx_network::network::NodeKind;

use super::ViewModel;
use super::view::dataset_name;

fn legend_entry(ui: &mut Ui, color: Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
        ui.painter().circle_filled(rect.center(), 5.0, color);
        ui.label(label);
    });
}

impl ViewModel {
    pub(super) fn draw_controls(&mut self, ui: &mut Ui, datasets: &[PathBuf]) {
        ui.heading("Network Controls");
        ui.separator();
        ui.add_space(4.0);

        if datasets.len() > 1 {
            let selected = datasets
                .get(self.dataset)
                .map(|path| dataset_name(path))
                .unwrap_or_default();
            egui::ComboBox::from_label("Dataset")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for (index, path) in datasets.iter().enumerate() {
                        if ui
                            .selectable_label(index == self.dataset, dataset_name(path))
                            .clicked()
                        {
                            self.requested_dataset = Some(index);
                        }
                    }
                });
            ui.separator();
        }

        ui.label("Search")
            .on_hover_text("Highlight matching nodes and their direct neighbors.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Case-insensitive match against node labels.");

        ui.horizontal_wrapped(|ui| {
            ui.selectable_value(&mut self.search_mode, SearchMode::Substring, "Substring")
                .on_hover_text("Labels containing the query.");
            ui.selectable_value(&mut self.search_mode, SearchMode::Fuzzy, "Fuzzy")
                .on_hover_text("Labels containing the query characters in order.");
        });

        ui.separator();

        let threshold = self.config.threshold;
        ui.add(
            egui::Slider::new(&mut self.threshold, threshold.min..=threshold.max)
                .step_by(f64::from(threshold.step))
                .text("Min. edge weight"),
        )
        .on_hover_text("Hide structural edges lighter than this weight. Layout is kept.");

        ui.separator();

        if let Some(session) = &self.session {
            let overlay = session.overlay();
            let graph = session.graph();
            let kept = graph
                .edges()
                .iter()
                .filter(|edge| edge.keep_structural)
                .count();
            ui.label(format!("Nodes: {}", graph.order()));
            ui.label(format!(
                "Edges: {} visible / {} structural / {} total",
                overlay.visible_edges,
                kept,
                graph.size()
            ));
            if !self.search.trim().is_empty() {
                ui.label(format!(
                    "Matches ({}): {}",
                    self.search_mode.label(),
                    overlay.matched
                ));
            }
        }

        if ui.button("Reset view").clicked() {
            self.reset_view();
        }

        ui.separator();
        ui.label("Legend");
        legend_entry(ui, NodeKind::Fragment.color(), "Fragment");
        legend_entry(ui, NodeKind::Reception.color(), "Reception");
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
            ui.painter().line_segment(
                [rect.left_center(), rect.right_center()],
                egui::Stroke::new(2.0, edge_color()),
            );
            ui.label("Relation");
        });
    }
}
