use chrono::NaiveDate;
use serde::Serialize;

/// Participation counts derived from one fetch of events and teams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipationSnapshot {
    pub total_events: usize,
    pub team_events: usize,
    pub single_events: usize,
    pub total_participants: usize,
    pub team_participants: usize,
    pub solo_participants: usize,
    pub verified_count: usize,
    pub unverified_count: usize,
    /// Percentage in `0.0..=100.0`.
    pub verification_rate: f64,
    /// Set when placeholder numbers replaced empty real totals.
    pub is_estimated: bool,
}

/// One day of the participation chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub participants: u32,
    /// Portion contributed by real events starting on or before this day.
    pub event_bump: u32,
}

/// Where a trend series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendSource {
    /// Heuristic baseline shaped by real events inside the window.
    Blended {
        /// Distinct days in the window on which a real event started.
        real_event_days: usize,
    },
    /// Heuristic baseline only; no event started inside the window.
    Heuristic,
    /// Degenerate data; a fully generated series replaced it.
    Synthetic,
}

/// A 30-day participation series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipationTrend {
    pub points: Vec<TrendPoint>,
    pub source: TrendSource,
}

impl ParticipationTrend {
    /// True unless real events shaped the series.
    pub fn is_synthetic(&self) -> bool {
        !matches!(self.source, TrendSource::Blended { .. })
    }

    pub fn peak(&self) -> u32 {
        self.points.iter().map(|p| p.participants).max().unwrap_or_default()
    }
}
