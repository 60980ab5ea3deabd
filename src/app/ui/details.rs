use eframe::egui::{self, RichText, Ui};

use crate::util::{format_metric, truncate_label};

use super::super::ViewModel;

struct NeighbourRow {
    id: String,
    label: String,
    weight: f64,
    shared_articles: usize,
}

impl ViewModel {
    fn neighbour_rows(&self, selected_id: &str) -> Vec<NeighbourRow> {
        let input = self.graph.input();
        let mut rows = input
            .edges
            .iter()
            .filter_map(|edge| {
                let other = edge.other_end(selected_id)?;
                let node = input.node(other)?;
                Some(NeighbourRow {
                    id: node.id.clone(),
                    label: node.display_label().to_owned(),
                    weight: edge.weight,
                    shared_articles: edge.article_ids.len(),
                })
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.label.cmp(&b.label)));
        rows
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.graph.selected().map(str::to_owned) else {
            ui.label("Click an entity in the graph or pick a search result.");
            return;
        };

        let Some(node) = self.graph.input().node(&selected_id).cloned() else {
            ui.label("Selected entity is no longer part of the network.");
            return;
        };

        ui.label(
            RichText::new(node.display_label())
                .strong()
                .color(self.theme.node_color(node.node_type)),
        );
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Type: {}", node.node_type.label()));
        ui.label(format!("Articles: {}", node.count));
        ui.label(format!("Connections: {}", node.degree));
        ui.label(format!("Link strength: {}", format_metric(node.strength)));
        if node.label_priority == 0 {
            ui.label("Label priority: zoomed in only");
        } else {
            ui.label(format!("Label priority: {}", node.label_priority));
        }

        let rendered = self
            .graph
            .render()
            .is_some_and(|render| render.node_index(&selected_id).is_some());
        ui.horizontal(|ui| {
            if ui
                .add_enabled(rendered, egui::Button::new("Center on entity"))
                .clicked()
            {
                self.graph.focus_node(&selected_id, now);
            }
            if !rendered {
                ui.weak("not laid out yet");
            }
        });

        ui.separator();
        let neighbours = self.neighbour_rows(&selected_id);
        ui.label(RichText::new(format!("Connected entities ({})", neighbours.len())).strong());
        if neighbours.is_empty() {
            ui.label("No links in the current view.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("neighbour_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, 20.0, neighbours.len(), |ui, row_range| {
                for row in &neighbours[row_range] {
                    let text = format!(
                        "{}  ({}, {} articles)",
                        truncate_label(&row.label, 36),
                        format_metric(row.weight),
                        row.shared_articles
                    );
                    if ui.link(text).on_hover_text(row.id.as_str()).clicked() {
                        clicked = Some(row.id.clone());
                    }
                }
            });

        if let Some(id) = clicked {
            self.select_and_focus(&id, now);
        }
    }
}
