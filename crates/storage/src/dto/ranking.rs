use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::dto::delta::UserSummary;
use crate::models::Ranking;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub star_id: i32,
    /// 1 is the best.
    pub rank: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRankingsRequest {
    pub user_id: Uuid,
    pub episode_number: i32,
    pub rankings: Vec<RankingEntry>,
}

impl SubmitRankingsRequest {
    /// The rankings must place every star of the episode exactly once, with
    /// ranks `1..=N` for `N` stars.
    pub fn check_against(&self, star_ids: &HashSet<i32>) -> Result<(), String> {
        if self.rankings.len() != star_ids.len() {
            return Err(format!(
                "Expected {} rankings for episode {}, got {}",
                star_ids.len(),
                self.episode_number,
                self.rankings.len()
            ));
        }

        let mut seen_stars = HashSet::new();
        let mut seen_ranks = HashSet::new();
        let max_rank = star_ids.len() as i32;

        for entry in &self.rankings {
            if !star_ids.contains(&entry.star_id) {
                return Err(format!(
                    "Star {} is not in episode {}",
                    entry.star_id, self.episode_number
                ));
            }
            if !seen_stars.insert(entry.star_id) {
                return Err(format!("Star {} is ranked more than once", entry.star_id));
            }
            if entry.rank < 1 || entry.rank > max_rank {
                return Err(format!("Rank {} is outside 1..={}", entry.rank, max_rank));
            }
            if !seen_ranks.insert(entry.rank) {
                return Err(format!("Rank {} is used more than once", entry.rank));
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> Vec<(i32, i32)> {
        self.rankings
            .iter()
            .map(|entry| (entry.star_id, entry.rank))
            .collect()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RankingsQuery {
    pub user_id: Uuid,
    pub episode_number: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankingsResponse {
    pub rankings: Vec<Ranking>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithRankings {
    #[serde(flatten)]
    pub user: UserSummary,
    /// Ordered best first; empty when the user has not ranked.
    pub rankings: Vec<Ranking>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsersWithRankingsResponse {
    pub users: Vec<UserWithRankings>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackfillRankingsResponse {
    pub created_count: u64,
    pub message: String,
}
