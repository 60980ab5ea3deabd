use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Person,
    Organization,
    Event,
    Subject,
    Location,
    Topic,
    Article,
    #[serde(other)]
    Other,
}

impl NodeType {
    pub const ALL: [NodeType; 8] = [
        Self::Person,
        Self::Organization,
        Self::Event,
        Self::Subject,
        Self::Location,
        Self::Topic,
        Self::Article,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Organization => "Organization",
            Self::Event => "Event",
            Self::Subject => "Subject",
            Self::Location => "Location",
            Self::Topic => "Topic",
            Self::Article => "Article",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SizeMetric {
    /// Raw occurrence count.
    #[default]
    Count,
    /// Number of incident edges.
    Degree,
    /// Sum of incident edge weights.
    Strength,
}

impl SizeMetric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Degree => "degree",
            Self::Strength => "strength",
        }
    }

    pub fn value(self, node: &NetworkNode) -> f64 {
        match self {
            Self::Count => node.count as f64,
            Self::Degree => node.degree as f64,
            Self::Strength => node.strength,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub degree: u64,
    #[serde(default)]
    pub strength: f64,
    /// 1 is the most important label; 0 means "only when zoomed in".
    #[serde(default)]
    pub label_priority: u32,
}

impl NetworkNode {
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    fn priority_rank(&self) -> u32 {
        if self.label_priority == 0 {
            u32::MAX
        } else {
            self.label_priority
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub weight_norm: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub article_ids: Vec<String>,
}

impl NetworkEdge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMeta {
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub total_nodes: Option<usize>,
    #[serde(default)]
    pub total_edges: Option<usize>,
    #[serde(default)]
    pub weight_max: Option<f64>,
    #[serde(default)]
    pub top_label_count: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    #[serde(default)]
    pub meta: NetworkMeta,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkFilter {
    pub hidden_types: BTreeSet<NodeType>,
    pub min_weight: f64,
    pub max_nodes: usize,
    pub hide_isolated: bool,
}

impl Default for NetworkFilter {
    fn default() -> Self {
        Self {
            hidden_types: BTreeSet::new(),
            min_weight: 0.0,
            max_nodes: 400,
            hide_isolated: true,
        }
    }
}

impl NetworkData {
    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn max_weight(&self) -> f64 {
        self.edges
            .iter()
            .map(|edge| edge.weight)
            .fold(0.0, f64::max)
    }

    pub fn type_counts(&self) -> BTreeMap<NodeType, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.node_type).or_insert(0) += 1;
        }
        counts
    }

    /// Closed neighbourhood of `id` with the edges induced among its members.
    pub fn ego_network(&self, id: &str) -> Option<NetworkData> {
        self.node(id)?;

        let mut members = HashSet::from([id]);
        for edge in &self.edges {
            if let Some(other) = edge.other_end(id) {
                members.insert(other);
            }
        }

        let nodes = self
            .nodes
            .iter()
            .filter(|node| members.contains(node.id.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        let present = nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        let edges = self
            .edges
            .iter()
            .filter(|edge| {
                present.contains(edge.source.as_str()) && present.contains(edge.target.as_str())
            })
            .cloned()
            .collect();

        Some(NetworkData {
            nodes,
            edges,
            meta: self.meta.clone(),
        })
    }

    pub fn filtered(&self, filter: &NetworkFilter) -> NetworkData {
        let mut ranked = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !filter.hidden_types.contains(&node.node_type))
            .collect::<Vec<_>>();
        ranked.sort_by(|(a_index, a), (b_index, b)| {
            a.priority_rank()
                .cmp(&b.priority_rank())
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a_index.cmp(b_index))
        });
        ranked.truncate(filter.max_nodes);

        let mut kept_indices = ranked.into_iter().map(|(index, _)| index).collect::<Vec<_>>();
        kept_indices.sort_unstable();

        let kept_ids = kept_indices
            .iter()
            .map(|&index| self.nodes[index].id.as_str())
            .collect::<HashSet<_>>();

        let edges = self
            .edges
            .iter()
            .filter(|edge| {
                edge.weight >= filter.min_weight
                    && kept_ids.contains(edge.source.as_str())
                    && kept_ids.contains(edge.target.as_str())
            })
            .cloned()
            .collect::<Vec<_>>();

        let connected = if filter.hide_isolated {
            let mut connected = HashSet::new();
            for edge in &edges {
                connected.insert(edge.source.as_str());
                connected.insert(edge.target.as_str());
            }
            Some(connected)
        } else {
            None
        };

        let nodes = kept_indices
            .into_iter()
            .map(|index| &self.nodes[index])
            .filter(|node| {
                connected
                    .as_ref()
                    .is_none_or(|connected| connected.contains(node.id.as_str()))
            })
            .cloned()
            .collect();

        NetworkData {
            nodes,
            edges,
            meta: self.meta.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, node_type: NodeType, count: u64, label_priority: u32) -> NetworkNode {
        NetworkNode {
            id: id.to_owned(),
            node_type,
            label: id.to_uppercase(),
            count,
            degree: 0,
            strength: 0.0,
            label_priority,
        }
    }

    fn edge(source: &str, target: &str, weight: f64) -> NetworkEdge {
        NetworkEdge {
            source: source.to_owned(),
            target: target.to_owned(),
            weight,
            weight_norm: 0.0,
            article_ids: Vec::new(),
        }
    }

    fn sample() -> NetworkData {
        NetworkData {
            nodes: vec![
                node("a", NodeType::Person, 10, 1),
                node("b", NodeType::Organization, 1, 3),
                node("c", NodeType::Event, 5, 2),
                node("d", NodeType::Person, 2, 4),
            ],
            edges: vec![edge("a", "b", 3.0), edge("b", "c", 1.0), edge("c", "d", 5.0)],
            meta: NetworkMeta::default(),
        }
    }

    #[test]
    fn ego_network_is_closed_neighbourhood_with_induced_edges() {
        let ego = sample().ego_network("b").expect("b exists");
        let ids = ego.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(ego.edges.len(), 2);
        assert!(ego.edges.iter().all(|edge| edge.touches("b")));
    }

    #[test]
    fn ego_network_of_unknown_id_is_none() {
        assert!(sample().ego_network("zzz").is_none());
    }

    #[test]
    fn filter_hides_types_and_weak_edges() {
        let filter = NetworkFilter {
            hidden_types: BTreeSet::from([NodeType::Organization]),
            min_weight: 2.0,
            max_nodes: 10,
            hide_isolated: true,
        };
        let filtered = sample().filtered(&filter);
        let ids = filtered.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["c", "d"]);
        assert_eq!(filtered.edges, vec![edge("c", "d", 5.0)]);
    }

    #[test]
    fn filter_caps_by_label_priority_and_keeps_input_order() {
        let filter = NetworkFilter {
            max_nodes: 2,
            hide_isolated: false,
            ..NetworkFilter::default()
        };
        let filtered = sample().filtered(&filter);
        let ids = filtered.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "c"]);
        assert!(filtered.edges.is_empty());
    }

    #[test]
    fn empty_label_falls_back_to_id() {
        let mut article = node("article:42", NodeType::Article, 0, 0);
        article.label = "  ".to_owned();
        assert_eq!(article.display_label(), "article:42");
    }

    #[test]
    fn size_metric_reads_the_matching_field() {
        let mut sample = node("x", NodeType::Topic, 7, 1);
        sample.degree = 3;
        sample.strength = 2.5;
        assert_eq!(SizeMetric::Count.value(&sample), 7.0);
        assert_eq!(SizeMetric::Degree.value(&sample), 3.0);
        assert_eq!(SizeMetric::Strength.value(&sample), 2.5);
    }
}
