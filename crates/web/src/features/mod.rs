pub mod bets;
pub mod deltas;
pub mod episodes;
pub mod rankings;
pub mod users;
