//! Participation counts derived from the raw event and team lists.
//!
//! Everything here is a pure function of its inputs, recomputed from scratch
//! on every fetch.

use itertools::Itertools;

use crate::model::{Event, EventCategory, Participant, ParticipationSnapshot, Team};

/// What to report when there is no real participation data yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EstimatePolicy {
    /// Substitute [`PlaceholderFloor`] numbers and mark the snapshot estimated.
    #[default]
    Placeholder,
    /// Report the real zeros.
    Disabled,
}

/// Placeholder numbers shown on an empty dashboard.
pub struct PlaceholderFloor;

impl PlaceholderFloor {
    pub const EVENTS: usize = 3;
    pub const TEAM_EVENTS: usize = 1;
    pub const PARTICIPANTS: usize = 25;
    pub const TEAM_PARTICIPANTS: usize = 15;
    /// Roughly two thirds verified.
    pub const VERIFIED: usize = 17;
}

/// Aggregate with the default placeholder policy.
pub fn aggregate(events: &[Event], teams: &[Team]) -> ParticipationSnapshot {
    aggregate_with(events, teams, EstimatePolicy::default())
}

pub fn aggregate_with(
    events: &[Event],
    teams: &[Team],
    policy: EstimatePolicy,
) -> ParticipationSnapshot {
    let counts = events.iter().counts_by(|e| e.category);
    let team_events = counts.get(&EventCategory::TeamBattle).copied().unwrap_or(0);
    let single_events = counts.get(&EventCategory::SingleBattle).copied().unwrap_or(0);

    let registered_teams = teams.iter().filter(|t| t.has_registrations());
    let (team_participants, team_verified) = registered_teams
        .fold((0, 0), |(total, verified), team| {
            (total + team.headcount(), verified + team.verified_count())
        });

    let solo: Vec<_> = events
        .iter()
        .filter(|e| e.category == EventCategory::SingleBattle)
        .flat_map(|e| e.registered_emails.iter())
        .collect();
    let solo_participants = solo.len();
    let solo_verified = solo.iter().filter(|r| r.verified).count();

    let total_participants = team_participants + solo_participants;
    let verified_count = team_verified + solo_verified;

    let mut snapshot = ParticipationSnapshot {
        total_events: events.len(),
        team_events,
        single_events,
        total_participants,
        team_participants,
        solo_participants,
        verified_count,
        unverified_count: total_participants - verified_count,
        verification_rate: rate(verified_count, total_participants),
        is_estimated: false,
    };

    if policy == EstimatePolicy::Placeholder {
        apply_placeholders(&mut snapshot);
    }
    snapshot
}

fn rate(verified: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * verified as f64 / total as f64
    }
}

fn apply_placeholders(snapshot: &mut ParticipationSnapshot) {
    if snapshot.total_events == 0 {
        snapshot.total_events = PlaceholderFloor::EVENTS;
        snapshot.team_events = PlaceholderFloor::TEAM_EVENTS;
        snapshot.single_events = PlaceholderFloor::EVENTS - PlaceholderFloor::TEAM_EVENTS;
        snapshot.is_estimated = true;
    }
    if snapshot.total_participants == 0 {
        let total = PlaceholderFloor::PARTICIPANTS;
        let verified = PlaceholderFloor::VERIFIED;
        snapshot.total_participants = total;
        snapshot.team_participants = PlaceholderFloor::TEAM_PARTICIPANTS;
        snapshot.solo_participants = total - PlaceholderFloor::TEAM_PARTICIPANTS;
        snapshot.verified_count = verified;
        snapshot.unverified_count = total - verified;
        snapshot.verification_rate = rate(verified, total);
        snapshot.is_estimated = true;
    }
}

/// Flatten registered team members (leader first) and solo registrants.
pub fn participants(events: &[Event], teams: &[Team]) -> Vec<Participant> {
    let team_members = teams
        .iter()
        .filter(|t| t.has_registrations())
        .flat_map(|team| {
            let leader = Participant::TeamMember {
                email: team.leader_email.clone(),
                verified: true,
                team_id: team.id.clone(),
                is_leader: true,
            };
            let members = team.member_emails.iter().map(|m| Participant::TeamMember {
                email: m.email.clone(),
                verified: m.verified,
                team_id: team.id.clone(),
                is_leader: false,
            });
            std::iter::once(leader).chain(members)
        });

    let solo = events
        .iter()
        .filter(|e| e.category == EventCategory::SingleBattle)
        .flat_map(|event| {
            event.registered_emails.iter().map(|r| Participant::Solo {
                email: r.email.clone(),
                verified: r.verified,
                event_id: event.id.clone(),
            })
        });

    team_members.chain(solo).collect()
}

/// Individuals taking part in one event: solo registrants, or the full
/// headcount of every team registered for it.
pub fn event_participant_count(event: &Event, teams: &[Team]) -> usize {
    match event.category {
        EventCategory::SingleBattle => event.registered_emails.len(),
        EventCategory::TeamBattle => teams
            .iter()
            .filter(|t| t.is_registered_for(&event.id))
            .map(Team::headcount)
            .sum(),
    }
}

/// Verified individuals in one event.
pub fn event_verified_count(event: &Event, teams: &[Team]) -> usize {
    match event.category {
        EventCategory::SingleBattle => {
            event.registered_emails.iter().filter(|r| r.verified).count()
        }
        EventCategory::TeamBattle => teams
            .iter()
            .filter(|t| t.is_registered_for(&event.id))
            .map(Team::verified_count)
            .sum(),
    }
}
