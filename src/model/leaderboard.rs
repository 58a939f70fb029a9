use serde::{Deserialize, Serialize};

use super::event::EventCategory;
use super::placement::Rank;

/// Payload of a `leaderboard:update` socket event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUpdate {
    pub event_id: String,
    pub event_name: String,
    pub category: EventCategory,
    #[serde(default)]
    pub placements: Vec<LeaderboardPlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPlacement {
    pub rank: Rank,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub participant_email: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
}
