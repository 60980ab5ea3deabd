use eframe::egui::{self, Align, Context, Layout};

use crate::graph::GraphPhase;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        now: f64,
        networks: &[String],
        network: &str,
        requested_network: &mut Option<String>,
        is_switching: bool,
    ) {
        let needs_frame = self.graph.poll(now);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("IWAC networks");
                    ui.separator();

                    ui.add_enabled_ui(!is_switching, |ui| {
                        egui::ComboBox::from_id_salt("network_selector")
                            .selected_text(network)
                            .show_ui(ui, |ui| {
                                for name in networks {
                                    if ui.selectable_label(name == network, name.as_str()).clicked()
                                        && name != network
                                    {
                                        *requested_network = Some(name.clone());
                                    }
                                }
                            });
                    });
                    if is_switching {
                        ui.spinner();
                    }

                    ui.label(format!(
                        "entities: {}  links: {}",
                        self.data.nodes.len(),
                        self.data.edges.len()
                    ));
                    if let Some(render) = self.graph.render() {
                        ui.label(format!(
                            "shown: {} / {}",
                            render.nodes.len(),
                            render.edges.len()
                        ));
                    }
                    if let Some(generated_at) = &self.data.meta.generated_at {
                        ui.weak(format!("generated {generated_at}"));
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui
                            .button("Reset view")
                            .on_hover_text("Fit the whole graph.")
                            .clicked()
                        {
                            self.graph.reset_camera(now);
                        }
                        if ui.button("−").on_hover_text("Zoom out").clicked() {
                            self.graph.zoom_out(now);
                        }
                        if ui.button("+").on_hover_text("Zoom in").clicked() {
                            self.graph.zoom_in(now);
                        }
                        if self.graph.selected().is_some() && ui.button("Clear selection").clicked() {
                            self.select(None, now);
                        }
                        ui.separator();
                        ui.label(self.layout_status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui, now));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui, now));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui, now));

        if needs_frame || self.graph.is_layout_running() || self.graph.camera().is_animating() {
            ctx.request_repaint();
        } else if let Some(remaining) = self.graph.debounce_remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }

    fn layout_status_text(&self) -> String {
        match self.graph.phase() {
            GraphPhase::Uninitialized => "waiting for data".to_owned(),
            GraphPhase::Initializing => "computing layout…".to_owned(),
            GraphPhase::Ready => {
                let stats = self.graph.stats();
                if stats.full_rebuilds == 0 {
                    return "no layout".to_owned();
                }
                let seeding = if stats.mostly_cached {
                    format!("{} cached", stats.cached_seeds)
                } else {
                    "fresh".to_owned()
                };
                format!(
                    "layout: {} it, {} ms, {seeding}",
                    stats.iterations,
                    stats.elapsed.as_millis()
                )
            }
        }
    }
}
