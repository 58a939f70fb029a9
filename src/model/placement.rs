use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LoungeError;

/// An awarded final ranking. Serialized as the integer 1, 2 or 3.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rank {
    First,
    Second,
    Third,
}

impl TryFrom<u8> for Rank {
    type Error = LoungeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rank::First),
            2 => Ok(Rank::Second),
            3 => Ok(Rank::Third),
            other => Err(LoungeError::InvalidRank(other)),
        }
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        match rank {
            Rank::First => 1,
            Rank::Second => 2,
            Rank::Third => 3,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::First => write!(f, "1st"),
            Rank::Second => write!(f, "2nd"),
            Rank::Third => write!(f, "3rd"),
        }
    }
}

/// A placement already recorded on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub participant_email: Option<String>,
    pub rank: Rank,
    #[serde(default)]
    pub awarded_at: Option<DateTime<Utc>>,
}

impl Placement {
    /// Display label: team id or participant email.
    pub fn recipient(&self) -> &str {
        self.team_id
            .as_deref()
            .or(self.participant_email.as_deref())
            .unwrap_or_default()
    }
}

/// Who receives a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Team(String),
    Participant(String),
}

/// Body of `POST /events/{id}/placement`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementAward {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_email: Option<String>,
    pub rank: Rank,
}

impl PlacementAward {
    pub fn new(recipient: Recipient, rank: Rank) -> Self {
        match recipient {
            Recipient::Team(id) => Self {
                team_id: Some(id),
                participant_email: None,
                rank,
            },
            Recipient::Participant(email) => Self {
                team_id: None,
                participant_email: Some(email),
                rank,
            },
        }
    }

    fn recipient_key(&self) -> &str {
        self.team_id
            .as_deref()
            .or(self.participant_email.as_deref())
            .unwrap_or_default()
    }

    /// True when `existing` already awards this rank to someone else.
    pub fn is_tie_with(&self, existing: &[Placement]) -> bool {
        existing
            .iter()
            .any(|p| p.rank == self.rank && p.recipient() != self.recipient_key())
    }
}
