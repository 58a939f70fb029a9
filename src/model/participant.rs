use serde::Serialize;

/// A registrant derived from teams and single-battle events. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    TeamMember {
        email: String,
        verified: bool,
        team_id: String,
        is_leader: bool,
    },
    Solo {
        email: String,
        verified: bool,
        event_id: String,
    },
}

impl Participant {
    pub fn email(&self) -> &str {
        match self {
            Participant::TeamMember { email, .. } | Participant::Solo { email, .. } => email,
        }
    }

    pub fn verified(&self) -> bool {
        match self {
            Participant::TeamMember { verified, .. } | Participant::Solo { verified, .. } => {
                *verified
            }
        }
    }

    pub fn is_solo(&self) -> bool {
        matches!(self, Participant::Solo { .. })
    }
}
