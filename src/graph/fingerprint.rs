use crate::network::NetworkNode;

/// Cheap identity of a node set: the count plus three sampled ids.
///
/// Two snapshots with the same length and the same ids at the first, middle
/// and last positions compare equal even if other ids differ. Such snapshots
/// take the attribute-update path and keep their previous layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeSetFingerprint {
    pub count: usize,
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
}

impl NodeSetFingerprint {
    pub fn of(nodes: &[NetworkNode]) -> Self {
        let sample = |index: usize| nodes.get(index).map(|node| node.id.clone());
        let count = nodes.len();

        Self {
            count,
            first: sample(0),
            middle: sample(count / 2),
            last: count.checked_sub(1).and_then(sample),
        }
    }
}
