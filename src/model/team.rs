use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team and its event registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "teamName")]
    pub name: String,
    pub leader_email: String,
    #[serde(default)]
    pub member_emails: Vec<MemberEmail>,
    #[serde(default)]
    pub registered_events: Vec<EventRegistration>,
}

impl Team {
    pub fn has_registrations(&self) -> bool {
        !self.registered_events.is_empty()
    }

    pub fn is_registered_for(&self, event_id: &str) -> bool {
        self.registered_events.iter().any(|r| r.event_id == event_id)
    }

    /// Leader plus members.
    pub fn headcount(&self) -> usize {
        1 + self.member_emails.len()
    }

    /// Leader counts as verified; members carry their own flag.
    pub fn verified_count(&self) -> usize {
        1 + self.member_emails.iter().filter(|m| m.verified).count()
    }
}

/// A team member email with its own verification flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEmail {
    pub email: String,
    #[serde(default)]
    pub verified: bool,
}

/// One event a team signed up for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    #[serde(alias = "event")]
    pub event_id: String,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}
