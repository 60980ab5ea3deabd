pub mod app;
pub mod graph;
pub mod layout;
pub mod network;
pub mod theme;
pub mod util;
