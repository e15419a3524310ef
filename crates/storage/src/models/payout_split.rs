use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-episode payout multipliers, keyed by episode number.
///
/// Each list has one entry per star ranked in that episode and is indexed from
/// the worst-rank end: a star ranked `rank` out of `N` earns `split[N - rank]`,
/// so the best-ranked star gets the last entry and the worst-ranked the first.
///
/// Loaded from JSON of the form `{ "1": [1, 1, 2, 3], "2": [1, 2, 3] }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PayoutSplits {
    splits: BTreeMap<i32, Vec<i64>>,
}

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("No payout split configured for episode {0}")]
    Missing(i32),

    #[error("Payout split for episode {0} is empty")]
    Empty(i32),

    #[error("Rank {rank} is outside the {len}-entry payout split of episode {episode}")]
    RankOutOfRange { episode: i32, rank: i32, len: usize },

    #[error("Episodes without a payout split: {0:?}")]
    Uncovered(Vec<i32>),

    #[error("Invalid payout split table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cannot read payout split table: {0}")]
    Io(#[from] std::io::Error),
}

impl PayoutSplits {
    pub fn from_json_str(raw: &str) -> Result<Self, SplitError> {
        let splits: Self = serde_json::from_str(raw)?;
        splits.validate()?;
        Ok(splits)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SplitError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), SplitError> {
        match self.splits.iter().find(|(_, split)| split.is_empty()) {
            Some((episode, _)) => Err(SplitError::Empty(*episode)),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn split_for(&self, episode: i32) -> Result<&[i64], SplitError> {
        self.splits
            .get(&episode)
            .map(Vec::as_slice)
            .ok_or(SplitError::Missing(episode))
    }

    pub fn multiplier_for(&self, episode: i32, rank: i32) -> Result<i64, SplitError> {
        let split = self.split_for(episode)?;
        multiplier(split, rank).ok_or(SplitError::RankOutOfRange {
            episode,
            rank,
            len: split.len(),
        })
    }

    /// Fails with every episode in `episodes` that has no split entry.
    pub fn ensure_covers(&self, episodes: impl IntoIterator<Item = i32>) -> Result<(), SplitError> {
        let mut uncovered: Vec<i32> = episodes
            .into_iter()
            .filter(|episode| !self.splits.contains_key(episode))
            .collect();

        if uncovered.is_empty() {
            return Ok(());
        }

        uncovered.sort_unstable();
        uncovered.dedup();
        Err(SplitError::Uncovered(uncovered))
    }
}

impl FromIterator<(i32, Vec<i64>)> for PayoutSplits {
    fn from_iter<I: IntoIterator<Item = (i32, Vec<i64>)>>(iter: I) -> Self {
        Self {
            splits: iter.into_iter().collect(),
        }
    }
}

/// Multiplier for a 1-based `rank` within `split`, or `None` when the rank is
/// outside `1..=split.len()`.
pub fn multiplier(split: &[i64], rank: i32) -> Option<i64> {
    let rank = usize::try_from(rank).ok()?;
    if rank == 0 || rank > split.len() {
        return None;
    }
    split.get(split.len() - rank).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_rank_takes_last_entry() {
        assert_eq!(multiplier(&[1, 2, 4], 1), Some(4));
    }

    #[test]
    fn test_worst_rank_takes_first_entry() {
        assert_eq!(multiplier(&[1, 2, 4], 3), Some(1));
        assert_eq!(multiplier(&[1, 2, 4], 2), Some(2));
    }

    #[test]
    fn test_rank_outside_split_is_rejected() {
        assert_eq!(multiplier(&[1, 2, 4], 0), None);
        assert_eq!(multiplier(&[1, 2, 4], 4), None);
        assert_eq!(multiplier(&[1, 2, 4], -1), None);
    }

    #[test]
    fn test_parse_json_table() {
        let splits = PayoutSplits::from_json_str(r#"{ "1": [1, 2, 4], "2": [0, 3] }"#).unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits.split_for(1).unwrap(), &[1, 2, 4]);
        assert_eq!(splits.multiplier_for(2, 1).unwrap(), 3);
    }

    #[test]
    fn test_missing_episode_is_an_error() {
        let splits: PayoutSplits = [(1, vec![1, 2, 4])].into_iter().collect();
        assert!(matches!(splits.split_for(7), Err(SplitError::Missing(7))));
        assert!(matches!(
            splits.multiplier_for(1, 5),
            Err(SplitError::RankOutOfRange {
                episode: 1,
                rank: 5,
                len: 3
            })
        ));
    }

    #[test]
    fn test_empty_split_rejected_on_load() {
        let result = PayoutSplits::from_json_str(r#"{ "1": [1, 2], "3": [] }"#);
        assert!(matches!(result, Err(SplitError::Empty(3))));
    }

    #[test]
    fn test_malformed_table_rejected() {
        let result = PayoutSplits::from_json_str(r#"{ "one": [1] }"#);
        assert!(matches!(result, Err(SplitError::Parse(_))));
    }

    #[test]
    fn test_ensure_covers_lists_uncovered_episodes() {
        let splits: PayoutSplits = [(1, vec![1]), (2, vec![1])].into_iter().collect();
        assert!(splits.ensure_covers([1, 2]).is_ok());

        match splits.ensure_covers([4, 1, 3, 4]) {
            Err(SplitError::Uncovered(missing)) => assert_eq!(missing, vec![3, 4]),
            other => panic!("expected uncovered episodes, got {other:?}"),
        }
    }
}
