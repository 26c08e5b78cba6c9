pub mod cohorts;
pub mod matches;
pub mod players;
pub mod rank;
