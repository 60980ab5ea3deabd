use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::network::{NodeType, SizeMetric};
use crate::util::truncate_label;

use super::super::{SearchCache, SearchHit, ViewModel};

const SEARCH_RESULT_LIMIT: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    fn search_hits(&mut self) -> Vec<SearchHit> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }

        if let Some(cached) = &self.search_cache
            && cached.snapshot_revision == self.snapshot_revision
            && cached.query == query
        {
            return cached.hits.clone();
        }

        let matcher = SkimMatcherV2::default();
        let mut hits = self
            .graph
            .input()
            .nodes
            .iter()
            .filter_map(|node| {
                let score = fuzzy_match_score(&matcher, node.display_label(), query)
                    .or_else(|| fuzzy_match_score(&matcher, &node.id, query))?;
                Some(SearchHit {
                    id: node.id.clone(),
                    label: node.display_label().to_owned(),
                    score,
                })
            })
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.label.cmp(&b.label)));
        hits.truncate(SEARCH_RESULT_LIMIT);

        self.search_cache = Some(SearchCache {
            query: query.to_owned(),
            snapshot_revision: self.snapshot_revision,
            hits: hits.clone(),
        });
        hits
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Network Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search entities")
            .on_hover_text("Fuzzy match on labels of the entities currently shown.");
        ui.text_edit_singleline(&mut self.search);
        let hits = self.search_hits();
        if !self.search.trim().is_empty() && hits.is_empty() {
            ui.weak("No matching entity.");
        }
        for hit in hits {
            if ui
                .link(truncate_label(&hit.label, 40))
                .on_hover_text(hit.id.as_str())
                .clicked()
            {
                self.select_and_focus(&hit.id, now);
            }
        }

        ui.separator();
        ui.label(RichText::new("Node size").strong());
        let mut metric = self.graph.metric();
        ui.horizontal_wrapped(|ui| {
            for option in [SizeMetric::Count, SizeMetric::Degree, SizeMetric::Strength] {
                ui.selectable_value(&mut metric, option, option.label());
            }
        });
        if metric != self.graph.metric() {
            self.graph.set_size_metric(metric);
        }

        let mut changed = false;

        ui.separator();
        ui.label(RichText::new("Entity types").strong());
        let type_counts = self.data.type_counts();
        for node_type in NodeType::ALL {
            let Some(count) = type_counts.get(&node_type) else {
                continue;
            };
            let mut shown = !self.filter.hidden_types.contains(&node_type);
            let swatch = RichText::new("●").color(self.theme.node_color(node_type));
            ui.horizontal(|ui| {
                ui.label(swatch);
                if ui
                    .checkbox(&mut shown, format!("{} ({count})", node_type.label()))
                    .changed()
                {
                    if shown {
                        self.filter.hidden_types.remove(&node_type);
                    } else {
                        self.filter.hidden_types.insert(node_type);
                    }
                    changed = true;
                }
            });
        }

        ui.separator();
        let max_weight = self.data.max_weight().max(1.0);
        changed |= ui
            .add(
                egui::Slider::new(&mut self.filter.min_weight, 0.0..=max_weight)
                    .text("Min link weight"),
            )
            .on_hover_text("Hide links with fewer shared articles than this.")
            .changed();

        let node_limit = self.data.nodes.len().max(10);
        changed |= ui
            .add(
                egui::Slider::new(&mut self.filter.max_nodes, 10..=node_limit)
                    .step_by(10.0)
                    .text("Max entities"),
            )
            .on_hover_text("Keep the entities with the best label priority.")
            .changed();

        changed |= ui
            .checkbox(&mut self.filter.hide_isolated, "Hide isolated entities")
            .changed();

        ui.separator();
        let mut focus_mode = self.graph.focus_mode();
        if ui
            .checkbox(&mut focus_mode, "Focus on selection")
            .on_hover_text("Lay out only the selected entity and its direct neighbours.")
            .changed()
        {
            self.graph.set_focus_mode(focus_mode, now);
        }

        if changed {
            self.push_snapshot(now);
        }
    }
}
