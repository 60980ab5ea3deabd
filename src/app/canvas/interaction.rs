use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::circle_visible;

const WHEEL_ZOOM_SENSITIVITY: f32 = 0.0018;

impl ViewModel {
    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
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
        let factor = (1.0 + (scroll * WHEEL_ZOOM_SENSITIVITY)).clamp(0.85, 1.15);
        self.graph.camera_mut().zoom_at(rect, pointer, factor);
    }

    pub(in crate::app) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.graph.camera_mut().pan(response.drag_delta());
        }
    }

    pub(in crate::app) fn visible_indices(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Vec<usize> {
        (0..screen_positions.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
            .collect()
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index].max(4.0)).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
