pub mod bet;
pub mod episode;
pub mod event;
pub mod ranking;
pub mod user;
pub mod user_delta;
