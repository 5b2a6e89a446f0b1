pub mod config;
pub mod types;

pub use config::RosterConfig;
pub use types::Candidate;
