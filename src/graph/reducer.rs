use std::collections::HashSet;

use eframe::egui::Color32;

use crate::theme::{Theme, scale_alpha};

use super::build::RenderGraph;

pub const SELECTED_SIZE_SCALE: f32 = 1.4;
pub const DIMMED_SIZE_SCALE: f32 = 0.8;
pub const HIGHLIGHT_WIDTH_SCALE: f32 = 2.0;
pub const DIMMED_EDGE_DIVISOR: f32 = 5.0;
pub const BASE_LABEL_BUDGET: f32 = 60.0;
pub const ZOOMED_IN_RATIO: f32 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Back,
    Middle,
    Front,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HighlightState {
    pub selected: usize,
    pub neighbors: HashSet<usize>,
    pub edges: HashSet<usize>,
}

impl HighlightState {
    pub fn for_selection(render: &RenderGraph, selected: usize) -> Option<Self> {
        if selected >= render.nodes.len() {
            return None;
        }
        Some(Self {
            selected,
            neighbors: render.neighbors[selected].iter().copied().collect(),
            edges: render.incident[selected].iter().copied().collect(),
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LabelPolicy {
    pub ratio: f32,
    pub hovered: Option<usize>,
}

impl LabelPolicy {
    pub fn budget(self) -> u32 {
        (BASE_LABEL_BUDGET / self.ratio.max(0.01)).round() as u32
    }

    fn shows_priority(self, priority: u32) -> bool {
        if priority == 0 {
            self.ratio < ZOOMED_IN_RATIO
        } else {
            priority <= self.budget()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeDisplay {
    pub size: f32,
    pub color: Color32,
    pub layer: Layer,
    pub ring: bool,
    pub show_label: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeDisplay {
    pub width: f32,
    pub color: Color32,
    pub layer: Layer,
    pub highlighted: bool,
}

pub fn reduce_node(
    render: &RenderGraph,
    index: usize,
    highlight: Option<&HighlightState>,
    labels: LabelPolicy,
    theme: &Theme,
) -> NodeDisplay {
    let node = &render.nodes[index];
    let base_color = theme.node_color(node.node.node_type);
    let by_priority = labels.shows_priority(node.label_rank);
    let hovered = labels.hovered == Some(index);

    match highlight {
        None => NodeDisplay {
            size: node.base_size,
            color: base_color,
            layer: Layer::Middle,
            ring: false,
            show_label: by_priority || hovered,
        },
        Some(highlight) if highlight.selected == index => NodeDisplay {
            size: node.base_size * SELECTED_SIZE_SCALE,
            color: base_color,
            layer: Layer::Front,
            ring: true,
            show_label: true,
        },
        Some(highlight) if highlight.neighbors.contains(&index) => NodeDisplay {
            size: node.base_size,
            color: base_color,
            layer: Layer::Middle,
            ring: false,
            show_label: true,
        },
        Some(_) => NodeDisplay {
            size: node.base_size * DIMMED_SIZE_SCALE,
            color: scale_alpha(base_color, theme.dim_alpha),
            layer: Layer::Back,
            ring: false,
            show_label: hovered,
        },
    }
}

pub fn reduce_edge(
    render: &RenderGraph,
    index: usize,
    highlight: Option<&HighlightState>,
    theme: &Theme,
) -> EdgeDisplay {
    let edge = &render.edges[index];

    match highlight {
        None => EdgeDisplay {
            width: edge.base_width,
            color: theme.edge,
            layer: Layer::Middle,
            highlighted: false,
        },
        Some(highlight) if highlight.edges.contains(&index) => EdgeDisplay {
            width: edge.base_width * HIGHLIGHT_WIDTH_SCALE,
            color: theme.highlight,
            layer: Layer::Front,
            highlighted: true,
        },
        Some(_) => EdgeDisplay {
            width: edge.base_width / DIMMED_EDGE_DIVISOR,
            color: scale_alpha(theme.edge, 1.0 / DIMMED_EDGE_DIVISOR),
            layer: Layer::Back,
            highlighted: false,
        },
    }
}

pub fn node_draw_order(
    render: &RenderGraph,
    highlight: Option<&HighlightState>,
    labels: LabelPolicy,
    theme: &Theme,
) -> Vec<usize> {
    let mut keyed = (0..render.nodes.len())
        .map(|index| {
            let display = reduce_node(render, index, highlight, labels, theme);
            (display.layer, display.size, index)
        })
        .collect::<Vec<_>>();
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)).then(a.2.cmp(&b.2)));
    keyed.into_iter().map(|(_, _, index)| index).collect()
}

pub fn edge_draw_order(render: &RenderGraph, highlight: Option<&HighlightState>) -> Vec<usize> {
    let mut order = (0..render.edges.len()).collect::<Vec<_>>();
    if let Some(highlight) = highlight {
        order.sort_by_key(|index| highlight.edges.contains(index));
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::cache::PositionCache;
    use crate::graph::build::prepare_graph;
    use crate::graph::sizing::SizeRange;
    use crate::network::{NetworkEdge, NetworkNode, NodeType, SizeMetric};

    fn scenario() -> RenderGraph {
        let node = |id: &str, count: u64, label_priority: u32| NetworkNode {
            id: id.to_owned(),
            node_type: NodeType::Person,
            label: id.to_owned(),
            count,
            degree: 0,
            strength: 0.0,
            label_priority,
        };
        let edge = |source: &str, target: &str| NetworkEdge {
            source: source.to_owned(),
            target: target.to_owned(),
            weight: 1.0,
            weight_norm: 0.5,
            article_ids: Vec::new(),
        };
        prepare_graph(
            &[node("a", 10, 1), node("b", 1, 90), node("c", 5, 0)],
            &[edge("a", "b"), edge("a", "z")],
            SizeMetric::Count,
            SizeRange::default(),
            &PositionCache::default(),
        )
        .render
    }

    const FITTED: LabelPolicy = LabelPolicy {
        ratio: 1.0,
        hovered: None,
    };

    #[test]
    fn selection_promotes_dims_and_highlights() {
        let render = scenario();
        let theme = Theme::dark();
        let highlight = HighlightState::for_selection(&render, 0).expect("a is rendered");

        let selected = reduce_node(&render, 0, Some(&highlight), FITTED, &theme);
        assert_eq!(selected.size, render.nodes[0].base_size * 1.4);
        assert_eq!(selected.layer, Layer::Front);
        assert!(selected.ring);

        let neighbour = reduce_node(&render, 1, Some(&highlight), FITTED, &theme);
        assert_eq!(neighbour.size, render.nodes[1].base_size);
        assert_eq!(neighbour.layer, Layer::Middle);
        assert!(neighbour.show_label);

        let other = reduce_node(&render, 2, Some(&highlight), FITTED, &theme);
        assert_eq!(other.size, render.nodes[2].base_size * 0.8);
        assert_eq!(other.layer, Layer::Back);
        assert!(other.color.a() < theme.node_color(NodeType::Person).a());

        let edge = reduce_edge(&render, 0, Some(&highlight), &theme);
        assert!(edge.highlighted);
        assert_eq!(edge.color, theme.highlight);
        assert_eq!(edge.width, render.edges[0].base_width * 2.0);
    }

    #[test]
    fn edges_away_from_the_selection_fade() {
        let render = scenario();
        let theme = Theme::dark();
        let highlight = HighlightState::for_selection(&render, 2).expect("c is rendered");
        assert!(highlight.neighbors.is_empty());

        let edge = reduce_edge(&render, 0, Some(&highlight), &theme);
        assert_eq!(edge.width, render.edges[0].base_width / 5.0);
        assert_eq!(edge.layer, Layer::Back);
        assert_eq!(edge.color.a(), (theme.edge.a() as f32 / 5.0).round() as u8);
    }

    #[test]
    fn no_selection_uses_defaults() {
        let render = scenario();
        let theme = Theme::dark();
        for index in 0..render.nodes.len() {
            let display = reduce_node(&render, index, None, FITTED, &theme);
            assert_eq!(display.size, render.nodes[index].base_size);
            assert_eq!(display.layer, Layer::Middle);
            assert!(!display.ring);
        }
        let edge = reduce_edge(&render, 0, None, &theme);
        assert_eq!(edge.width, render.edges[0].base_width);
        assert_eq!(edge.color, theme.edge);
    }

    #[test]
    fn label_budget_grows_when_zoomed_in() {
        let render = scenario();
        let theme = Theme::dark();
        let label = |ratio: f32, index: usize| {
            reduce_node(&render, index, None, LabelPolicy { ratio, hovered: None }, &theme)
                .show_label
        };

        assert!(label(1.0, 0));
        assert!(!label(1.0, 1));
        assert!(!label(1.0, 2));
        assert!(label(0.5, 1));
        assert!(label(0.3, 2));
        assert!(reduce_node(&render, 2, None, LabelPolicy { ratio: 1.0, hovered: Some(2) }, &theme).show_label);
    }

    #[test]
    fn spatial_snapshot_without_priorities_still_labels_hubs() {
        let theme = Theme::dark();
        let nodes = scenario()
            .nodes
            .into_iter()
            .map(|render_node| NetworkNode {
                label_priority: 0,
                ..render_node.node
            })
            .collect::<Vec<_>>();
        let render = prepare_graph(
            &nodes,
            &[],
            SizeMetric::Count,
            SizeRange::default(),
            &PositionCache::default(),
        )
        .render;

        assert_eq!(render.nodes[0].label_rank, 1);
        assert_eq!(render.nodes[1].label_rank, 3);
        assert!(reduce_node(&render, 0, None, FITTED, &theme).show_label);
    }

    #[test]
    fn draw_order_puts_the_selection_last() {
        let render = scenario();
        let theme = Theme::dark();
        let highlight = HighlightState::for_selection(&render, 1).expect("b is rendered");
        let order = node_draw_order(&render, Some(&highlight), FITTED, &theme);
        assert_eq!(order.first(), Some(&2));
        assert_eq!(order.last(), Some(&1));
    }
}
