use eframe::egui::{self, Align2, FontId, Sense, Stroke, Ui, vec2};

use crate::graph::{GraphPhase, edge_draw_order};
use crate::util::{format_metric, truncate_label};

use super::super::ViewModel;
use super::super::render_utils::{blend_color, draw_background, edge_visible};

const LABEL_MAX_CHARS: usize = 28;

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui, now: f64) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.graph.camera_mut().set_viewport(rect.size());
        draw_background(&painter, rect, &self.theme, self.graph.camera());

        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);

        let Some(render) = self.graph.render().filter(|render| !render.is_empty()) else {
            self.hovered = None;
            let message = match self.graph.phase() {
                GraphPhase::Initializing => "Computing layout…",
                _ if self.graph.input().nodes.is_empty() => "No entities match the current filters.",
                _ => "The network could not be laid out.",
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(15.0),
                self.theme.label,
            );
            return;
        };

        let camera = self.graph.camera();
        let size_zoom = camera.state().ratio.max(0.05).sqrt().recip().clamp(0.6, 3.0);
        let screen_positions = render
            .nodes
            .iter()
            .map(|node| camera.world_to_screen(rect, node.world_pos))
            .collect::<Vec<_>>();
        let highlight = self.graph.highlight();

        let displays = (0..render.nodes.len())
            .filter_map(|index| {
                self.graph
                    .node_display(index, highlight.as_ref(), self.hovered, &self.theme)
            })
            .collect::<Vec<_>>();
        let screen_radii = displays
            .iter()
            .map(|display| display.size * size_zoom)
            .collect::<Vec<_>>();

        let visible = Self::visible_indices(rect, &screen_positions, &screen_radii);
        let mut visible_mask = vec![false; render.nodes.len()];
        for &index in &visible {
            visible_mask[index] = true;
        }
        let hovered = Self::hovered_index(ui, &visible, &screen_positions, &screen_radii);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        for index in edge_draw_order(render, highlight.as_ref()) {
            let edge = &render.edges[index];
            let start = screen_positions[edge.source];
            let end = screen_positions[edge.target];
            if !visible_mask[edge.source]
                && !visible_mask[edge.target]
                && !edge_visible(rect, start, end, 2.0)
            {
                continue;
            }
            let Some(display) = self.graph.edge_display(index, highlight.as_ref(), &self.theme)
            else {
                continue;
            };
            let width = (display.width * size_zoom.sqrt()).max(0.2);
            painter.line_segment([start, end], Stroke::new(width, display.color));
        }

        for index in self.graph.draw_order(highlight.as_ref(), &self.theme) {
            if !visible_mask[index] {
                continue;
            }
            let display = displays[index];
            let position = screen_positions[index];
            let radius = screen_radii[index];
            let is_hovered = hovered == Some(index);

            let color = if is_hovered {
                blend_color(display.color, self.theme.highlight, 0.35)
            } else {
                display.color
            };
            painter.circle_filled(position, radius, color);
            painter.circle_stroke(position, radius, Stroke::new(1.0, self.theme.node_stroke));
            if display.ring {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(2.0, self.theme.selection_ring),
                );
            }

            if display.show_label || is_hovered {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(render.nodes[index].node.display_label(), LABEL_MAX_CHARS),
                    FontId::proportional(12.0),
                    self.theme.label,
                );
            }
        }

        if let Some(index) = hovered {
            let node = &render.nodes[index].node;
            let summary = format!(
                "{}  |  {}  |  {} articles  |  {} links  |  strength {}",
                node.display_label(),
                node.node_type.label(),
                node.count,
                render.neighbors[index].len(),
                format_metric(node.strength)
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                summary,
                FontId::proportional(13.0),
                self.theme.label,
            );
        }

        let hovered_id = hovered.map(|index| render.nodes[index].node.id.clone());
        self.hovered = hovered;

        if response.double_clicked()
            && let Some(id) = &hovered_id
        {
            self.select_and_focus(id, now);
        } else if response.clicked_by(egui::PointerButton::Primary) {
            self.select(hovered_id.as_deref(), now);
        }
    }
}
