use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use eframe::egui::{self, Context};

use crate::graph::{GraphConfig, NetworkGraph};
use crate::network::{DataFetcher, NetworkData, NetworkFilter, SizeMetric, spawn_fetch};
use crate::theme::{Theme, ThemeKind};

mod canvas;
mod render_utils;
mod ui;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub network: String,
    pub size_metric: SizeMetric,
    pub theme: ThemeKind,
    pub graph: GraphConfig,
}

pub struct NetworkExplorerApp {
    config: AppConfig,
    fetcher: Arc<DataFetcher>,
    networks: Vec<String>,
    network: String,
    state: AppState,
    switch_rx: Option<Receiver<Result<Arc<NetworkData>, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Arc<NetworkData>, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    data: Arc<NetworkData>,
    graph: NetworkGraph,
    filter: NetworkFilter,
    theme: Theme,
    search: String,
    search_cache: Option<SearchCache>,
    snapshot_revision: u64,
    hovered: Option<usize>,
}

struct SearchCache {
    query: String,
    snapshot_revision: u64,
    hits: Vec<SearchHit>,
}

#[derive(Clone)]
struct SearchHit {
    id: String,
    label: String,
    score: i64,
}

impl NetworkExplorerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(match config.theme {
            ThemeKind::Dark => egui::Visuals::dark(),
            ThemeKind::Light => egui::Visuals::light(),
        });

        let fetcher = Arc::new(DataFetcher::new(config.data_dir.clone()));
        let networks = match fetcher.available_networks() {
            Ok(networks) => networks,
            Err(error) => {
                tracing::warn!("{error:#}");
                Vec::new()
            }
        };
        let network = config.network.clone();
        let state = AppState::Loading {
            rx: spawn_fetch(Arc::clone(&fetcher), network.clone()),
        };

        Self {
            config,
            fetcher,
            networks,
            network,
            state,
            switch_rx: None,
        }
    }

    fn start_load(&self) -> AppState {
        AppState::Loading {
            rx: spawn_fetch(Arc::clone(&self.fetcher), self.network.clone()),
        }
    }
}

impl eframe::App for NetworkExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(data)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            data,
                            &self.config,
                            now,
                        ))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading network \"{}\"...", self.network));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load network data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        retry = ui.button("Retry").clicked();
                        if !self.networks.is_empty() {
                            egui::ComboBox::from_id_salt("error_network")
                                .selected_text(self.network.as_str())
                                .show_ui(ui, |ui| {
                                    for name in &self.networks {
                                        if ui
                                            .selectable_label(*name == self.network, name.as_str())
                                            .clicked()
                                            && *name != self.network
                                        {
                                            self.network = name.clone();
                                            retry = true;
                                        }
                                    }
                                });
                        }
                    });
                });
                if retry {
                    transition = Some(self.start_load());
                }
            }
            AppState::Ready(model) => {
                let mut requested = None;
                let is_switching = self.switch_rx.is_some();
                model.show(
                    ctx,
                    now,
                    &self.networks,
                    &self.network,
                    &mut requested,
                    is_switching,
                );

                if let Some(name) = requested
                    && self.switch_rx.is_none()
                {
                    self.network = name;
                    self.switch_rx = Some(spawn_fetch(Arc::clone(&self.fetcher), self.network.clone()));
                }

                if let Some(rx) = self.switch_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(data)) => model.replace_data(data, now),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.switch_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.switch_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(data: Arc<NetworkData>, config: &AppConfig, now: f64) -> Self {
        let mut graph = NetworkGraph::new(config.graph.clone());
        graph.set_size_metric(config.size_metric);

        let mut model = Self {
            data,
            graph,
            filter: NetworkFilter::default(),
            theme: Theme::from_kind(config.theme),
            search: String::new(),
            search_cache: None,
            snapshot_revision: 0,
            hovered: None,
        };
        model.push_snapshot(now);
        model
    }

    fn push_snapshot(&mut self, now: f64) {
        let snapshot = self.data.filtered(&self.filter);
        tracing::debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "snapshot pushed"
        );
        self.graph.set_input(snapshot.nodes, snapshot.edges, now);
        self.snapshot_revision = self.snapshot_revision.wrapping_add(1);
        self.search_cache = None;
    }

    fn replace_data(&mut self, data: Arc<NetworkData>, now: f64) {
        let available = data.type_counts();
        self.filter
            .hidden_types
            .retain(|node_type| available.contains_key(node_type));
        self.data = data;
        self.hovered = None;
        self.push_snapshot(now);
    }

    fn select(&mut self, id: Option<&str>, now: f64) {
        self.graph.set_selected(id, now);
    }

    fn select_and_focus(&mut self, id: &str, now: f64) {
        self.graph.set_selected(Some(id), now);
        self.graph.focus_node(id, now);
    }
}
