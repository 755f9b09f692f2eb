pub mod database;
pub mod maze;
pub mod runner;

mod tests;

pub use database::Database;
pub use maze::MazeSetup;
pub use runner::{run_match, run_series, MatchConfig, MatchResult};
