use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use validator::{Validate, ValidationError};

use super::placement::Placement;

/// A lounge event as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub category: EventCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub number_of_teams: Option<u32>,
    #[serde(default)]
    pub participation_per_team: Option<u32>,
    #[serde(default)]
    pub total_spots: Option<u32>,
    #[serde(default)]
    pub registered_emails: Vec<RegisteredEmail>,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl Event {
    /// Capacity fields that apply to this event's category.
    pub fn capacity(&self) -> Capacity {
        match self.category {
            EventCategory::TeamBattle => Capacity::Teams {
                teams: self.number_of_teams.unwrap_or_default(),
                per_team: self.participation_per_team.unwrap_or_default(),
            },
            EventCategory::SingleBattle => Capacity::Spots(self.total_spots.unwrap_or_default()),
        }
    }

    pub fn is_team_battle(&self) -> bool {
        self.category == EventCategory::TeamBattle
    }
}

/// Participation category of an event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EventCategory {
    TeamBattle,
    SingleBattle,
}

/// Lifecycle status driven by the live event controls.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
    #[default]
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

/// A lifecycle command. Its display form is the URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EventAction {
    Start,
    Pause,
    End,
}

/// A solo registrant on a single-battle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEmail {
    pub email: String,
    #[serde(default)]
    pub verified: bool,
}

/// Category-specific capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Teams { teams: u32, per_team: u32 },
    Spots(u32),
}

impl Capacity {
    /// Maximum number of individual participants.
    pub fn max_participants(&self) -> u32 {
        match *self {
            Capacity::Teams { teams, per_team } => teams.saturating_mul(per_team),
            Capacity::Spots(spots) => spots,
        }
    }
}

/// The admin create/edit form for an event. Validated before any request is sent.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_draft"))]
pub struct EventDraft {
    #[validate(length(min = 1, max = 120, message = "is required"))]
    pub name: String,
    pub category: EventCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(length(max = 2000, message = "is too long"))]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 2, max = 64, message = "must be between 2 and 64"))]
    pub number_of_teams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 16, message = "must be between 1 and 16"))]
    pub participation_per_team: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 1024, message = "must be between 1 and 1024"))]
    pub total_spots: Option<u32>,
}

impl EventDraft {
    pub fn team_battle(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        number_of_teams: u32,
        participation_per_team: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category: EventCategory::TeamBattle,
            start_date,
            end_date,
            description: String::new(),
            image: None,
            number_of_teams: Some(number_of_teams),
            participation_per_team: Some(participation_per_team),
            total_spots: None,
        }
    }

    pub fn single_battle(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        total_spots: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category: EventCategory::SingleBattle,
            start_date,
            end_date,
            description: String::new(),
            image: None,
            number_of_teams: None,
            participation_per_team: None,
            total_spots: Some(total_spots),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Body of `POST /events/{id}/referee`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RefereeAssignment {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

fn draft_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_event_draft(draft: &EventDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(draft_error("name", "Event name is required"));
    }
    if draft.end_date <= draft.start_date {
        return Err(draft_error("schedule", "End date must be after start date"));
    }
    match draft.category {
        EventCategory::TeamBattle => {
            if draft.number_of_teams.is_none() || draft.participation_per_team.is_none() {
                return Err(draft_error(
                    "capacity",
                    "Team battles need a team count and players per team",
                ));
            }
        }
        EventCategory::SingleBattle => {
            if draft.total_spots.is_none() {
                return Err(draft_error(
                    "capacity",
                    "Single battles need a number of spots",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-10-01T18:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_event_deserializes_backend_shape() {
        let json = r#"{
            "_id": "ev1",
            "name": "Friday Fights",
            "category": "single-battle",
            "startDate": "2026-10-01T18:00:00.000Z",
            "endDate": "2026-10-01T22:00:00.000Z",
            "status": "in_progress",
            "totalSpots": 16,
            "registeredEmails": [{"email": "a@x.com", "verified": true}]
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "ev1");
        assert_eq!(event.status, EventStatus::InProgress);
        assert_eq!(event.capacity(), Capacity::Spots(16));
        assert_eq!(event.registered_emails.len(), 1);
        assert!(event.placements.is_empty());
    }

    #[test]
    fn test_missing_status_defaults_to_not_started() {
        let json = r#"{
            "id": "ev2",
            "name": "Squad Cup",
            "category": "team-battle",
            "startDate": "2026-10-01T18:00:00Z",
            "endDate": "2026-10-02T18:00:00Z",
            "numberOfTeams": 8,
            "participationPerTeam": 5
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.status, EventStatus::NotStarted);
        assert_eq!(event.capacity().max_participants(), 40);
    }

    #[test]
    fn test_action_renders_as_path_segment() {
        assert_eq!(EventAction::Start.to_string(), "start");
        assert_eq!(EventAction::End.to_string(), "end");
        assert_eq!(EventStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_draft_rejects_end_before_start() {
        let draft = EventDraft::single_battle("Late", now(), now() - Duration::hours(1), 8);
        let err = draft.validate().unwrap_err();
        let errors = err.field_errors();
        let schema = errors.get("__all__").unwrap();
        assert_eq!(schema[0].code, "schedule");
    }

    #[test]
    fn test_draft_rejects_blank_name() {
        let draft = EventDraft::single_battle("   ", now(), now() + Duration::hours(1), 8);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_team_draft_checks_ranges() {
        let draft = EventDraft::team_battle("Cup", now(), now() + Duration::hours(2), 1, 5);
        let err = draft.validate().unwrap_err();
        assert!(err.field_errors().contains_key("number_of_teams"));

        let ok = EventDraft::team_battle("Cup", now(), now() + Duration::hours(2), 4, 5);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_draft_serializes_camel_case_without_empty_capacity() {
        let draft = EventDraft::single_battle("Solo", now(), now() + Duration::hours(1), 12);
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["totalSpots"], 12);
        assert_eq!(value["category"], "single-battle");
        assert!(value.get("numberOfTeams").is_none());
    }
}
