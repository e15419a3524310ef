mod bet;
mod episode;
mod event;
mod payout_split;
mod ranking;
mod user;
mod user_delta;

pub use bet::{Bet, BetWithAccepters, NewBet};
pub use episode::Episode;
pub use event::ScoredEvent;
pub use payout_split::{PayoutSplits, SplitError};
pub use ranking::Ranking;
pub use user::User;
pub use user_delta::UserDelta;
