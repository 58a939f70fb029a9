//! Live event control: lifecycle state machine, placement and referee
//! commands, and the joined events+teams board they refresh.

use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::aggregate::{aggregate, event_participant_count, event_verified_count};
use crate::api;
use crate::error::{LoungeError, Result};
use crate::gateway::Gateway;
use crate::model::{
    Event, EventAction, EventStatus, ParticipationSnapshot, PlacementAward, RefereeAssignment,
    Team,
};

impl EventStatus {
    /// Controls offered for an event in this status.
    pub fn available_actions(self) -> &'static [EventAction] {
        match self {
            EventStatus::NotStarted => &[EventAction::Start],
            EventStatus::InProgress => &[EventAction::Pause, EventAction::End],
            EventStatus::Paused => &[EventAction::Start],
            EventStatus::Completed => &[],
        }
    }

    /// Status after `action`, or `None` if the action is not offered.
    pub fn next(self, action: EventAction) -> Option<EventStatus> {
        match (self, action) {
            (EventStatus::NotStarted | EventStatus::Paused, EventAction::Start) => {
                Some(EventStatus::InProgress)
            }
            (EventStatus::InProgress, EventAction::Pause) => Some(EventStatus::Paused),
            (EventStatus::InProgress, EventAction::End) => Some(EventStatus::Completed),
            _ => None,
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, EventStatus::InProgress | EventStatus::Paused)
    }

    fn board_order(self) -> u8 {
        match self {
            EventStatus::InProgress => 0,
            EventStatus::Paused => 1,
            EventStatus::NotStarted => 2,
            EventStatus::Completed => 3,
        }
    }
}

/// Reject an action the event's current status does not offer.
pub fn check_transition(event: &Event, action: EventAction) -> Result<EventStatus> {
    event
        .status
        .next(action)
        .ok_or_else(|| LoungeError::InvalidTransition {
            event_id: event.id.clone(),
            status: event.status,
            action,
        })
}

/// One event with the teams registered for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEvent {
    pub event: Event,
    pub teams: Vec<Team>,
    pub participant_count: usize,
    pub verified_count: usize,
}

impl LiveEvent {
    pub fn available_actions(&self) -> &'static [EventAction] {
        self.event.status.available_actions()
    }
}

/// Events joined with teams by registration, ordered live-first.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveBoard {
    pub events: Vec<LiveEvent>,
    pub teams: Vec<Team>,
    pub snapshot: ParticipationSnapshot,
}

impl LiveBoard {
    pub fn build(events: Vec<Event>, teams: Vec<Team>) -> Self {
        let snapshot = aggregate(&events, &teams);
        let mut live: Vec<LiveEvent> = events
            .into_iter()
            .map(|event| {
                let registered = teams
                    .iter()
                    .filter(|t| t.is_registered_for(&event.id))
                    .cloned()
                    .collect();
                LiveEvent {
                    participant_count: event_participant_count(&event, &teams),
                    verified_count: event_verified_count(&event, &teams),
                    teams: registered,
                    event,
                }
            })
            .collect();
        // Soonest first, except completed events which show most recent first.
        live.sort_by_key(|e| {
            let ts = e.event.start_date.timestamp();
            let recency = if e.event.status == EventStatus::Completed {
                -ts
            } else {
                ts
            };
            (e.event.status.board_order(), recency)
        });

        Self {
            events: live,
            teams,
            snapshot,
        }
    }

    pub fn find(&self, event_id: &str) -> Option<&LiveEvent> {
        self.events.iter().find(|e| e.event.id == event_id)
    }

    pub fn with_status(&self, status: EventStatus) -> impl Iterator<Item = &LiveEvent> {
        self.events.iter().filter(move |e| e.event.status == status)
    }
}

/// Fetch events and teams together. Either failing fails the whole board
/// with [`LoungeError::Composite`].
#[instrument(skip(gateway))]
pub(crate) async fn fetch_live_board(gateway: &Gateway) -> Result<LiveBoard> {
    let (events, teams) = futures::try_join!(
        api::events::get_events(gateway),
        api::teams::get_teams(gateway)
    )
    .map_err(LoungeError::composite)?;
    let board = LiveBoard::build(events, teams);
    debug!(events = board.events.len(), "built live board");
    Ok(board)
}

/// Issues lifecycle, placement and referee commands. Nothing is changed
/// locally; each successful command refetches the whole board.
#[derive(Debug, Clone)]
pub struct LiveEventController {
    gateway: Gateway,
}

impl LiveEventController {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn start(&self, event: &Event) -> Result<LiveBoard> {
        self.run(event, EventAction::Start).await
    }

    pub async fn pause(&self, event: &Event) -> Result<LiveBoard> {
        self.run(event, EventAction::Pause).await
    }

    pub async fn end(&self, event: &Event) -> Result<LiveBoard> {
        self.run(event, EventAction::End).await
    }

    #[instrument(skip(self, event), fields(event_id = %event.id, status = %event.status))]
    pub async fn run(&self, event: &Event, action: EventAction) -> Result<LiveBoard> {
        let expected = check_transition(event, action)?;
        api::events::send_action(&self.gateway, &event.id, action).await?;
        info!(%expected, "lifecycle command sent");
        self.refresh().await
    }

    /// Ties are allowed: a rank already held by someone else is awarded again.
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn award_placement(&self, event: &Event, award: PlacementAward) -> Result<LiveBoard> {
        if award.is_tie_with(&event.placements) {
            warn!(rank = %award.rank, "rank already awarded, recording a tie");
        }
        api::events::award_placement(&self.gateway, &event.id, &award).await?;
        self.refresh().await
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn assign_referee(&self, event: &Event, email: &str) -> Result<LiveBoard> {
        let assignment = RefereeAssignment {
            email: email.trim().to_string(),
        };
        assignment.validate()?;
        api::events::assign_referee(&self.gateway, &event.id, &assignment).await?;
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<LiveBoard> {
        fetch_live_board(&self.gateway).await
    }
}
