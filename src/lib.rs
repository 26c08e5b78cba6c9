//! Pairwise "which is better" rating engine: Elo updates with convergence
//! heuristics, matchmaking over live cohort stats, an undoable rating store,
//! and debounced snapshot persistence.

pub mod config;
pub mod constants;
pub mod engine;
pub mod logging;
pub mod persist;
pub mod session;
pub mod store;

pub use config::Config;
pub use engine::config::EngineSettings;
pub use engine::types::{MatchOutcome, PairSelection};
pub use session::Session;
pub use store::{RatingStore, StoreError};
