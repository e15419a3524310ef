pub mod bet;
pub mod delta;
pub mod episode;
pub mod ranking;
