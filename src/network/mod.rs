mod fetch;
mod model;
mod parse;

pub use fetch::{DataFetcher, FetchError, spawn_fetch};
pub use model::{
    NetworkData, NetworkEdge, NetworkFilter, NetworkMeta, NetworkNode, NodeType, SizeMetric,
};
pub use parse::{ParseError, parse_network};
