mod build;
mod cache;
mod camera;
mod debounce;
mod fingerprint;
mod reducer;
mod sizing;

use std::borrow::Cow;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

pub use build::{PreparedGraph, RenderEdge, RenderGraph, RenderNode, prepare_graph, refresh_attributes};
pub use cache::{PositionCache, SEED_HALF_EXTENT};
pub use camera::{Camera, CameraConfig, CameraState};
pub use debounce::Debouncer;
pub use fingerprint::NodeSetFingerprint;
pub use reducer::{
    EdgeDisplay, HighlightState, LabelPolicy, Layer, NodeDisplay, edge_draw_order,
    node_draw_order, reduce_edge, reduce_node,
};
pub use sizing::{SizeRange, edge_width};

use crate::layout::{LayoutConfig, LayoutError, LayoutOutcome, LayoutPlan};
use crate::network::{NetworkData, NetworkEdge, NetworkNode, SizeMetric};
use crate::theme::Theme;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
    pub debounce: Duration,
    pub layout: LayoutConfig,
    pub camera: CameraConfig,
    pub sizes: SizeRange,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            layout: LayoutConfig::default(),
            camera: CameraConfig::default(),
            sizes: SizeRange::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphPhase {
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutStats {
    pub nodes: usize,
    pub edges: usize,
    pub iterations: usize,
    pub cached_seeds: usize,
    pub mostly_cached: bool,
    pub elapsed: Duration,
    pub full_rebuilds: u64,
    pub attribute_updates: u64,
}

struct PendingLayout {
    rx: Receiver<Result<LayoutOutcome, LayoutError>>,
    render: RenderGraph,
    fingerprint: NodeSetFingerprint,
    cached_count: usize,
    mostly_cached: bool,
}

pub struct NetworkGraph {
    config: GraphConfig,
    phase: GraphPhase,
    input: NetworkData,
    metric: SizeMetric,
    selected: Option<String>,
    focus_mode: bool,
    render: Option<RenderGraph>,
    fingerprint: Option<NodeSetFingerprint>,
    positions: PositionCache,
    pending: Option<PendingLayout>,
    deferred_refresh: bool,
    debounce: Debouncer,
    camera: Camera,
    stats: LayoutStats,
}

impl NetworkGraph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            debounce: Debouncer::new(config.debounce),
            camera: Camera::new(config.camera.clone()),
            config,
            phase: GraphPhase::Uninitialized,
            input: NetworkData::default(),
            metric: SizeMetric::default(),
            selected: None,
            focus_mode: false,
            render: None,
            fingerprint: None,
            positions: PositionCache::default(),
            pending: None,
            deferred_refresh: false,
            stats: LayoutStats::default(),
        }
    }

    pub fn phase(&self) -> GraphPhase {
        self.phase
    }

    pub fn is_layout_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn render(&self) -> Option<&RenderGraph> {
        self.render.as_ref()
    }

    pub fn input(&self) -> &NetworkData {
        &self.input
    }

    pub fn metric(&self) -> SizeMetric {
        self.metric
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn focus_mode(&self) -> bool {
        self.focus_mode
    }

    pub fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    pub fn position_cache(&self) -> &PositionCache {
        &self.positions
    }

    pub fn debounce_remaining(&self, now: f64) -> Option<Duration> {
        self.debounce.remaining(now)
    }

    /// Stores a new snapshot. The first snapshot is laid out immediately,
    /// later ones after the debounce delay.
    pub fn set_input(&mut self, nodes: Vec<NetworkNode>, edges: Vec<NetworkEdge>, now: f64) {
        self.input = NetworkData {
            nodes,
            edges,
            ..NetworkData::default()
        };

        if let Some(selected) = &self.selected
            && self.input.node(selected).is_none()
        {
            tracing::debug!(%selected, "selection left the snapshot");
            self.selected = None;
        }

        if self.phase == GraphPhase::Uninitialized && self.pending.is_none() {
            self.debounce.cancel();
            self.refresh();
        } else {
            self.debounce.schedule(now);
        }
    }

    pub fn set_size_metric(&mut self, metric: SizeMetric) {
        if metric == self.metric {
            return;
        }
        self.metric = metric;

        if self.pending.is_some() {
            self.deferred_refresh = true;
        } else if let Some(render) = &mut self.render {
            let effective = render_input(&self.input, self.selected.as_deref(), self.focus_mode);
            refresh_attributes(
                render,
                &effective.nodes,
                &effective.edges,
                metric,
                self.config.sizes,
            );
            self.stats.attribute_updates += 1;
        }
    }

    /// At most one node is selected. Unknown ids clear the selection.
    /// Returns whether the selection changed.
    pub fn set_selected(&mut self, id: Option<&str>, now: f64) -> bool {
        let next = id
            .filter(|id| self.input.node(id).is_some())
            .map(str::to_owned);
        if next == self.selected {
            return false;
        }
        self.selected = next;
        if self.focus_mode {
            self.debounce.schedule(now);
        }
        true
    }

    pub fn set_focus_mode(&mut self, focus_mode: bool, now: f64) {
        if focus_mode == self.focus_mode {
            return;
        }
        self.focus_mode = focus_mode;
        if self.selected.is_some() {
            self.debounce.schedule(now);
        }
    }

    /// Collects a finished layout, fires the debounce and steps the camera.
    /// Returns true when the next frame is needed right away; a pending
    /// debounce is reported by [`Self::debounce_remaining`] instead.
    pub fn poll(&mut self, now: f64) -> bool {
        let mut repaint = false;

        if let Some(pending) = self.pending.take() {
            match pending.rx.try_recv() {
                Ok(result) => {
                    self.finish_layout(pending, result);
                    repaint = true;
                }
                Err(TryRecvError::Empty) => {
                    self.pending = Some(pending);
                    repaint = true;
                }
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("layout worker exited without a result");
                    self.phase = GraphPhase::Ready;
                    repaint = true;
                }
            }
        }

        if self.pending.is_none() && self.deferred_refresh {
            self.deferred_refresh = false;
            self.refresh();
            repaint = true;
        }

        if self.debounce.fire(now) {
            self.refresh();
            repaint = true;
        }

        self.camera.tick(now) || repaint
    }

    pub fn wait_for_layout(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending.rx.recv() {
            Ok(result) => self.finish_layout(pending, result),
            Err(_) => {
                tracing::error!("layout worker exited without a result");
                self.phase = GraphPhase::Ready;
            }
        }
    }

    fn refresh(&mut self) {
        if self.pending.is_some() {
            self.deferred_refresh = true;
            return;
        }

        let effective =
            render_input(&self.input, self.selected.as_deref(), self.focus_mode).into_owned();
        let fingerprint = NodeSetFingerprint::of(&effective.nodes);

        if self.fingerprint.as_ref() != Some(&fingerprint) {
            self.start_layout(&effective, fingerprint);
            return;
        }
        let Some(render) = &mut self.render else {
            self.start_layout(&effective, fingerprint);
            return;
        };

        refresh_attributes(
            render,
            &effective.nodes,
            &effective.edges,
            self.metric,
            self.config.sizes,
        );
        self.stats.nodes = render.nodes.len();
        self.stats.edges = render.edges.len();
        self.stats.attribute_updates += 1;
        tracing::debug!(nodes = render.nodes.len(), "attributes updated in place");
    }

    fn start_layout(&mut self, effective: &NetworkData, fingerprint: NodeSetFingerprint) {
        let PreparedGraph {
            render,
            cached_count,
        } = prepare_graph(
            &effective.nodes,
            &effective.edges,
            self.metric,
            self.config.sizes,
            &self.positions,
        );
        let mostly_cached = self
            .positions
            .is_mostly_cached(render.nodes.iter().map(|node| node.node.id.as_str()));
        let plan = LayoutPlan::for_graph(render.nodes.len(), mostly_cached, &self.config.layout);
        let job = render.layout_job(plan);

        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("force-layout".to_owned())
            .spawn(move || {
                let _ = tx.send(job.run());
            });

        match spawned {
            Ok(_) => {
                tracing::debug!(
                    nodes = render.nodes.len(),
                    cached = cached_count,
                    "layout started"
                );
                self.phase = GraphPhase::Initializing;
                self.pending = Some(PendingLayout {
                    rx,
                    render,
                    fingerprint,
                    cached_count,
                    mostly_cached,
                });
            }
            Err(error) => {
                tracing::error!(%error, "failed to start layout worker");
                self.phase = GraphPhase::Ready;
            }
        }
    }

    fn finish_layout(
        &mut self,
        pending: PendingLayout,
        result: Result<LayoutOutcome, LayoutError>,
    ) {
        self.phase = GraphPhase::Ready;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(%error, "layout failed; graph left unrendered");
                self.render = None;
                self.fingerprint = None;
                return;
            }
        };

        let mut render = pending.render;
        render.apply_positions(&outcome.positions);
        for node in &render.nodes {
            self.positions.record(&node.node.id, node.world_pos);
        }

        self.camera.fit_bounds(render.bounds());
        self.stats = LayoutStats {
            nodes: render.nodes.len(),
            edges: render.edges.len(),
            iterations: outcome.iterations,
            cached_seeds: pending.cached_count,
            mostly_cached: pending.mostly_cached,
            elapsed: outcome.elapsed,
            full_rebuilds: self.stats.full_rebuilds + 1,
            attribute_updates: self.stats.attribute_updates,
        };
        tracing::info!(
            nodes = self.stats.nodes,
            edges = self.stats.edges,
            iterations = self.stats.iterations,
            cached = self.stats.cached_seeds,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "layout finished"
        );

        self.render = Some(render);
        self.fingerprint = Some(pending.fingerprint);
    }

    pub fn highlight(&self) -> Option<HighlightState> {
        let render = self.render.as_ref()?;
        let selected = render.node_index(self.selected.as_deref()?)?;
        HighlightState::for_selection(render, selected)
    }

    pub fn label_policy(&self, hovered: Option<usize>) -> LabelPolicy {
        LabelPolicy {
            ratio: self.camera.state().ratio,
            hovered,
        }
    }

    pub fn node_display(
        &self,
        index: usize,
        highlight: Option<&HighlightState>,
        hovered: Option<usize>,
        theme: &Theme,
    ) -> Option<NodeDisplay> {
        let render = self.render.as_ref()?;
        (index < render.nodes.len())
            .then(|| reduce_node(render, index, highlight, self.label_policy(hovered), theme))
    }

    pub fn edge_display(
        &self,
        index: usize,
        highlight: Option<&HighlightState>,
        theme: &Theme,
    ) -> Option<EdgeDisplay> {
        let render = self.render.as_ref()?;
        (index < render.edges.len()).then(|| reduce_edge(render, index, highlight, theme))
    }

    pub fn draw_order(&self, highlight: Option<&HighlightState>, theme: &Theme) -> Vec<usize> {
        self.render
            .as_ref()
            .map(|render| node_draw_order(render, highlight, self.label_policy(None), theme))
            .unwrap_or_default()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn reset_camera(&mut self, now: f64) {
        self.camera.reset(now);
    }

    pub fn zoom_in(&mut self, now: f64) {
        self.camera.zoom_in(now);
    }

    pub fn zoom_out(&mut self, now: f64) {
        self.camera.zoom_out(now);
    }

    /// Animates the camera onto a rendered node. False when `id` is not drawn.
    pub fn focus_node(&mut self, id: &str, now: f64) -> bool {
        let Some(position) = self
            .render
            .as_ref()
            .and_then(|render| render.node_by_id(id))
            .map(|node| node.world_pos)
        else {
            return false;
        };
        self.camera.focus(position, now);
        true
    }
}

impl Default for NetworkGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

/// The snapshot actually laid out: the ego network of the selection in focus
/// mode, otherwise the whole input.
fn render_input<'a>(
    input: &'a NetworkData,
    selected: Option<&str>,
    focus_mode: bool,
) -> Cow<'a, NetworkData> {
    if focus_mode
        && let Some(ego) = selected.and_then(|id| input.ego_network(id))
    {
        return Cow::Owned(ego);
    }
    Cow::Borrowed(input)
}
