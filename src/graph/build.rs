use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};

use crate::layout::{LayoutJob, LayoutPlan};
use crate::network::{NetworkEdge, NetworkNode, SizeMetric};

use super::cache::PositionCache;
use super::sizing::{SizeRange, edge_width};

const MAX_LAYOUT_WEIGHT: f32 = 1.0e6;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
    pub node: NetworkNode,
    pub world_pos: Vec2,
    pub metric_value: f64,
    pub base_size: f32,
    /// Label priority, or the metric rank when the snapshot carries none.
    pub label_rank: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub weight_norm: f64,
    pub base_width: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub index_by_id: HashMap<String, usize>,
    pub neighbors: Vec<Vec<usize>>,
    pub incident: Vec<Vec<usize>>,
    pub metric: SizeMetric,
}

pub struct PreparedGraph {
    pub render: RenderGraph,
    pub cached_count: usize,
}

pub fn prepare_graph(
    nodes: &[NetworkNode],
    edges: &[NetworkEdge],
    metric: SizeMetric,
    sizes: SizeRange,
    cache: &PositionCache,
) -> PreparedGraph {
    let mut render = RenderGraph {
        metric,
        ..RenderGraph::default()
    };
    let mut cached_count = 0;

    for node in nodes {
        if render.index_by_id.contains_key(&node.id) {
            continue;
        }
        let (world_pos, cached) = cache.seed(&node.id);
        if cached {
            cached_count += 1;
        }
        render
            .index_by_id
            .insert(node.id.clone(), render.nodes.len());
        render.nodes.push(RenderNode {
            node: node.clone(),
            world_pos,
            metric_value: 0.0,
            base_size: sizes.midpoint(),
            label_rank: node.label_priority,
        });
    }

    render.edges = collect_edges(&render.index_by_id, edges);
    render.rebuild_adjacency();
    render.apply_sizes(metric, sizes);

    PreparedGraph {
        render,
        cached_count,
    }
}

/// Updates labels, metrics, sizes and edges in place. Positions and the node
/// set are left untouched; input nodes that are not rendered are ignored.
pub fn refresh_attributes(
    render: &mut RenderGraph,
    nodes: &[NetworkNode],
    edges: &[NetworkEdge],
    metric: SizeMetric,
    sizes: SizeRange,
) {
    let mut incoming = HashMap::with_capacity(nodes.len());
    for node in nodes {
        incoming.entry(node.id.as_str()).or_insert(node);
    }

    for render_node in &mut render.nodes {
        if let Some(node) = incoming.get(render_node.node.id.as_str())
            && render_node.node != **node
        {
            render_node.node = (*node).clone();
        }
    }

    render.edges = collect_edges(&render.index_by_id, edges);
    render.rebuild_adjacency();
    render.apply_sizes(metric, sizes);
}

/// Attraction weight handed to the layout, capped at [`MAX_LAYOUT_WEIGHT`].
fn layout_weight(weight: f64) -> f32 {
    if weight.is_nan() {
        return 0.0;
    }
    weight.clamp(0.0, f64::from(MAX_LAYOUT_WEIGHT)) as f32
}

fn collect_edges(index_by_id: &HashMap<String, usize>, edges: &[NetworkEdge]) -> Vec<RenderEdge> {
    let mut seen = HashSet::new();
    let mut collected = Vec::new();

    for edge in edges {
        let (Some(&source), Some(&target)) =
            (index_by_id.get(&edge.source), index_by_id.get(&edge.target))
        else {
            continue;
        };
        if source == target || !seen.insert((source.min(target), source.max(target))) {
            continue;
        }

        collected.push(RenderEdge {
            source,
            target,
            weight: edge.weight,
            weight_norm: edge.weight_norm,
            base_width: edge_width(edge.weight_norm),
        });
    }

    collected
}

impl RenderGraph {
    fn rebuild_adjacency(&mut self) {
        let mut neighbors = vec![Vec::new(); self.nodes.len()];
        let mut incident = vec![Vec::new(); self.nodes.len()];
        for (edge_index, edge) in self.edges.iter().enumerate() {
            neighbors[edge.source].push(edge.target);
            neighbors[edge.target].push(edge.source);
            incident[edge.source].push(edge_index);
            incident[edge.target].push(edge_index);
        }
        self.neighbors = neighbors;
        self.incident = incident;
    }

    fn apply_sizes(&mut self, metric: SizeMetric, sizes: SizeRange) {
        self.metric = metric;

        let mut min_metric = f64::INFINITY;
        let mut max_metric = f64::NEG_INFINITY;
        for render_node in &mut self.nodes {
            let value = metric.value(&render_node.node);
            render_node.metric_value = value;
            if value.is_finite() {
                min_metric = min_metric.min(value);
                max_metric = max_metric.max(value);
            }
        }
        if !min_metric.is_finite() {
            min_metric = 0.0;
            max_metric = 0.0;
        }

        for render_node in &mut self.nodes {
            render_node.base_size = sizes.node_size(render_node.metric_value, min_metric, max_metric);
        }
        self.rank_labels();
    }

    fn rank_labels(&mut self) {
        if self.nodes.iter().any(|node| node.node.label_priority > 0) {
            for render_node in &mut self.nodes {
                render_node.label_rank = render_node.node.label_priority;
            }
            return;
        }

        let mut order = (0..self.nodes.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| {
            self.nodes[b]
                .metric_value
                .total_cmp(&self.nodes[a].metric_value)
                .then(a.cmp(&b))
        });
        for (rank, index) in order.into_iter().enumerate() {
            self.nodes[index].label_rank = rank as u32 + 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&RenderNode> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    pub fn masses(&self) -> Vec<f32> {
        self.neighbors
            .iter()
            .map(|neighbors| 1.0 + neighbors.len() as f32)
            .collect()
    }

    pub fn layout_job(&self, plan: LayoutPlan) -> LayoutJob {
        LayoutJob {
            positions: self.nodes.iter().map(|node| node.world_pos).collect(),
            masses: self.masses(),
            edges: self
                .edges
                .iter()
                .map(|edge| (edge.source, edge.target, layout_weight(edge.weight)))
                .collect(),
            plan,
        }
    }

    pub fn apply_positions(&mut self, positions: &[Vec2]) {
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.world_pos = *position;
        }
    }

    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let mut nodes = self.nodes.iter();
        let first = nodes.next()?.world_pos;
        let (mut min, mut max) = (first, first);
        for node in nodes {
            min = vec2(min.x.min(node.world_pos.x), min.y.min(node.world_pos.y));
            max = vec2(max.x.max(node.world_pos.x), max.y.max(node.world_pos.y));
        }
        Some((min, max))
    }
}
