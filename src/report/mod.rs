//! Paginated analytics report built from one fetch of events and teams.
//!
//! The layout is fixed: page one holds the header, metric grid, trend chart
//! and team statistics; event detail cards follow, a fixed number per page.
//! Every page ends with a footer.

mod csv;
mod html;

pub use csv::{CsvExport, ReportType};

use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::aggregate::{event_participant_count, event_verified_count};
use crate::model::{
    Capacity, Event, EventCategory, EventStatus, ParticipationSnapshot, ParticipationTrend, Rank,
    Team,
};

pub const EVENT_CARDS_PER_PAGE: usize = 4;
pub const REPORT_TITLE: &str = "Event Summary Report";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub snapshot: ParticipationSnapshot,
    pub trend: ParticipationTrend,
    pub team_stats: TeamStats,
    pub event_cards: Vec<EventCard>,
}

/// Only teams with at least one event registration are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStats {
    pub total_teams: usize,
    pub registered_teams: usize,
    pub registered_members: usize,
    pub verified_members: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventCard {
    pub event_id: String,
    pub name: String,
    pub category: EventCategory,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: Capacity,
    pub participants: usize,
    pub verified: usize,
    pub team_names: Vec<String>,
    pub referee: Option<String>,
    pub placements: Vec<(Rank, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section<'a> {
    Header,
    Metrics,
    Trend,
    TeamStats,
    Events(&'a [EventCard]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub number: usize,
    pub total: usize,
    pub sections: Vec<Section<'a>>,
}

impl Report {
    pub fn build(
        snapshot: ParticipationSnapshot,
        trend: ParticipationTrend,
        events: &[Event],
        teams: &[Team],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let registered = teams.iter().filter(|t| t.has_registrations()).collect_vec();
        let team_stats = TeamStats {
            total_teams: teams.len(),
            registered_teams: registered.len(),
            registered_members: registered.iter().map(|t| t.headcount()).sum(),
            verified_members: registered.iter().map(|t| t.verified_count()).sum(),
        };

        let event_cards = events.iter().map(|e| event_card(e, teams)).collect();

        Self {
            title: REPORT_TITLE.to_string(),
            generated_at,
            snapshot,
            trend,
            team_stats,
            event_cards,
        }
    }

    pub fn metrics(&self) -> Vec<MetricTile> {
        let s = &self.snapshot;
        vec![
            MetricTile {
                label: "Total events",
                value: s.total_events.to_string(),
            },
            MetricTile {
                label: "Team battles",
                value: s.team_events.to_string(),
            },
            MetricTile {
                label: "Single battles",
                value: s.single_events.to_string(),
            },
            MetricTile {
                label: "Total participants",
                value: s.total_participants.to_string(),
            },
            MetricTile {
                label: "Team participants",
                value: s.team_participants.to_string(),
            },
            MetricTile {
                label: "Solo participants",
                value: s.solo_participants.to_string(),
            },
            MetricTile {
                label: "Verified",
                value: s.verified_count.to_string(),
            },
            MetricTile {
                label: "Verification rate",
                value: format!("{:.1}%", s.verification_rate),
            },
        ]
    }

    pub fn page_count(&self) -> usize {
        1 + self.event_cards.len().div_ceil(EVENT_CARDS_PER_PAGE)
    }

    pub fn pages(&self) -> Vec<Page<'_>> {
        let total = self.page_count();
        let first = Page {
            number: 1,
            total,
            sections: vec![
                Section::Header,
                Section::Metrics,
                Section::Trend,
                Section::TeamStats,
            ],
        };
        let rest = self
            .event_cards
            .chunks(EVENT_CARDS_PER_PAGE)
            .enumerate()
            .map(|(i, cards)| Page {
                number: i + 2,
                total,
                sections: vec![Section::Events(cards)],
            });
        std::iter::once(first).chain(rest).collect()
    }
}

fn event_card(event: &Event, teams: &[Team]) -> EventCard {
    let team_names = teams
        .iter()
        .filter(|t| t.is_registered_for(&event.id))
        .map(|t| t.name.clone())
        .collect();

    let placements = event
        .placements
        .iter()
        .sorted_by_key(|p| p.rank)
        .map(|p| {
            let label = p
                .team_id
                .as_deref()
                .and_then(|id| teams.iter().find(|t| t.id == id))
                .map(|t| t.name.clone())
                .unwrap_or_else(|| p.recipient().to_string());
            (p.rank, label)
        })
        .collect();

    EventCard {
        event_id: event.id.clone(),
        name: event.name.clone(),
        category: event.category,
        status: event.status,
        start_date: event.start_date,
        end_date: event.end_date,
        capacity: event.capacity(),
        participants: event_participant_count(event, teams),
        verified: event_verified_count(event, teams),
        team_names,
        referee: event.referee.clone(),
        placements,
    }
}
