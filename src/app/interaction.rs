use eframe::egui::{self, Pos2, Rect, Ui};

use super::ViewModel;
use super::render_utils::screen_to_world;

impl ViewModel {
    pub(super) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 12.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(super) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(super) fn hovered_index(
        ui: &Ui,
        draw_order: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        draw_order
            .iter()
            .rev()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index].max(4.0)).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(super) fn reset_view(&mut self) {
        self.pan = egui::Vec2::ZERO;
        self.zoom = 1.0;
    }
}
