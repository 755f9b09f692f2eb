pub mod agent;
pub mod cluster;
pub mod random;
pub mod selector;
pub mod tactics;

mod tests;

pub use agent::Agent;
pub use cluster::ClusterAgent;
pub use random::RandomAgent;
