pub mod cluster;
pub mod grid;
pub mod protocol;
pub mod search;
pub mod types;
pub mod world;


pub use cluster::{ClusterId, ClusterTree};
pub use grid::Grid;
pub use search::SearchError;
pub use types::*;
pub use world::World;
