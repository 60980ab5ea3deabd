use std::collections::HashSet;

use thiserror::Error;

use super::model::NetworkData;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid network JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_network(raw: &str) -> Result<NetworkData, ParseError> {
    let mut data: NetworkData = serde_json::from_str(raw)?;
    normalize(&mut data);
    Ok(data)
}

fn normalize(data: &mut NetworkData) {
    let mut seen = HashSet::with_capacity(data.nodes.len());
    let before = data.nodes.len();
    data.nodes.retain(|node| seen.insert(node.id.clone()));
    let duplicates = before - data.nodes.len();
    if duplicates > 0 {
        tracing::warn!(duplicates, "dropped nodes with duplicate ids");
    }

    let mut negative_weights = 0usize;
    let mut out_of_range_norms = 0usize;
    for edge in &mut data.edges {
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            edge.weight = 0.0;
            negative_weights += 1;
        }

        if !edge.weight_norm.is_finite() {
            edge.weight_norm = 0.0;
            out_of_range_norms += 1;
        } else if !(0.0..=1.0).contains(&edge.weight_norm) {
            edge.weight_norm = edge.weight_norm.clamp(0.0, 1.0);
            out_of_range_norms += 1;
        }
    }

    if negative_weights > 0 {
        tracing::warn!(edges = negative_weights, "clamped invalid edge weights to 0");
    }
    if out_of_range_norms > 0 {
        tracing::warn!(edges = out_of_range_norms, "clamped weightNorm into [0, 1]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NodeType;

    const GLOBAL_SAMPLE: &str = r#"{
        "nodes": [
            {"id": "person:1", "type": "person", "label": "Amadou", "count": 12, "degree": 2, "strength": 7, "labelPriority": 1},
            {"id": "org:9", "type": "organization", "label": "AEEMB", "count": 4, "degree": 1, "strength": 5, "labelPriority": 2},
            {"id": "x:1", "type": "spaceship", "label": "?", "count": 1, "degree": 1, "strength": 2, "labelPriority": 3}
        ],
        "edges": [
            {"source": "person:1", "target": "org:9", "type": "person-organization", "weight": 5, "weightNorm": 1.0, "articleIds": ["a1", "a2"]},
            {"source": "person:1", "target": "x:1", "weight": -2, "weightNorm": 1.7}
        ],
        "meta": {"generatedAt": "2025-01-01T00:00:00Z", "totalNodes": 3, "weightMax": 5, "typePairs": [["person", "organization"]]}
    }"#;

    #[test]
    fn parses_the_generated_shape() {
        let data = parse_network(GLOBAL_SAMPLE).expect("valid document");
        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.nodes[0].node_type, NodeType::Person);
        assert_eq!(data.nodes[2].node_type, NodeType::Other);
        assert_eq!(data.edges[0].article_ids, ["a1", "a2"]);
        assert_eq!(data.meta.total_nodes, Some(3));
        assert!(data.meta.extra.contains_key("typePairs"));
    }

    #[test]
    fn repairs_out_of_range_weights() {
        let data = parse_network(GLOBAL_SAMPLE).expect("valid document");
        assert_eq!(data.edges[1].weight, 0.0);
        assert_eq!(data.edges[1].weight_norm, 1.0);
    }

    #[test]
    fn article_nodes_without_count_default_to_zero() {
        let raw = r#"{
            "nodes": [
                {"id": "topic:3", "type": "topic", "label": "Hajj", "count": 40, "degree": 1, "strength": 0.8, "labelPriority": 1},
                {"id": "article:abc", "type": "article", "label": "Untitled", "topicProb": 0.8, "degree": 1, "strength": 0.8, "labelPriority": 0}
            ],
            "edges": [{"source": "topic:3", "target": "article:abc", "weight": 0.8, "weightNorm": 1.0}]
        }"#;
        let data = parse_network(raw).expect("valid document");
        assert_eq!(data.nodes[1].count, 0);
        assert_eq!(data.nodes[1].label_priority, 0);
        assert_eq!(data.meta.total_nodes, None);
    }

    #[test]
    fn keeps_first_node_for_duplicate_ids() {
        let raw = r#"{
            "nodes": [
                {"id": "a", "type": "person", "label": "first"},
                {"id": "a", "type": "person", "label": "second"}
            ],
            "edges": []
        }"#;
        let data = parse_network(raw).expect("valid document");
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.nodes[0].label, "first");
    }

    #[test]
    fn rejects_documents_without_nodes() {
        assert!(matches!(
            parse_network(r#"{"edges": []}"#),
            Err(ParseError::Json(_))
        ));
    }
}
