//! 30-day participation chart.
//!
//! The baseline is a heuristic random walk, not a measurement. Real events
//! that started inside the window add bumps on top of it. The result's
//! [`TrendSource`] records how much real signal went into the series, so a
//! caller can label it as synthetic.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::aggregate::event_participant_count;
use crate::model::{Event, ParticipationSnapshot, ParticipationTrend, Team, TrendPoint, TrendSource};

pub const TREND_DAYS: usize = 30;

const BASELINE_SHARE: f64 = 0.7;
const EMPTY_BASELINE: f64 = 10.0;
const CEILING_SHARE: f64 = 1.3;
const DAILY_GROWTH: std::ops::Range<f64> = 0.002..0.015;
const SPIKE_CHANCE: f64 = 0.2;
const SPIKE_GROWTH: std::ops::Range<f64> = 0.02..0.06;
/// Fraction of an event's bump carried into the following days.
const CARRY_SHARE: f64 = 0.4;
const FALLBACK_START: u32 = 5;
const FALLBACK_STEP: u32 = 2;
const FALLBACK_SPIKE: u32 = 8;

impl ParticipationTrend {
    /// Synthesize with the thread-local rng.
    pub fn generate(
        events: &[Event],
        teams: &[Team],
        snapshot: &ParticipationSnapshot,
        today: NaiveDate,
    ) -> Self {
        synthesize_trend(events, teams, snapshot, today, &mut rand::thread_rng())
    }
}

/// Build one point per day for the `TREND_DAYS` days ending on `today`.
pub fn synthesize_trend<R: Rng + ?Sized>(
    events: &[Event],
    teams: &[Team],
    snapshot: &ParticipationSnapshot,
    today: NaiveDate,
    rng: &mut R,
) -> ParticipationTrend {
    let first_day = today - Duration::days(TREND_DAYS as i64 - 1);
    let mut values = baseline(snapshot.total_participants, rng);
    let mut bumps = vec![0.0; TREND_DAYS];

    let mut real_days = [false; TREND_DAYS];
    for event in events {
        let day = (event.start_date.date_naive() - first_day).num_days();
        if !(0..TREND_DAYS as i64).contains(&day) {
            continue;
        }
        let count = event_participant_count(event, teams);
        if count == 0 {
            continue;
        }
        real_days[day as usize] = true;
        overlay_bump(&mut bumps, day as usize, count as f64);
    }
    let real_event_days = real_days.iter().filter(|d| **d).count();

    for (value, bump) in values.iter_mut().zip(&bumps) {
        *value += bump;
    }

    let degenerate = values.iter().all(|v| *v <= 1.0);
    let (values, bumps, source) = if degenerate {
        (fallback_series(), vec![0.0; TREND_DAYS], TrendSource::Synthetic)
    } else if real_event_days > 0 {
        (values, bumps, TrendSource::Blended { real_event_days })
    } else {
        (values, bumps, TrendSource::Heuristic)
    };

    let points = values
        .into_iter()
        .zip(bumps)
        .enumerate()
        .map(|(i, (value, bump))| TrendPoint {
            date: first_day + Duration::days(i as i64),
            participants: value.round().max(0.0) as u32,
            event_bump: bump.round().max(0.0) as u32,
        })
        .collect();

    ParticipationTrend { points, source }
}

/// Random walk from ~70% of the total, never exceeding ~130% of it.
fn baseline<R: Rng + ?Sized>(total_participants: usize, rng: &mut R) -> Vec<f64> {
    let total = total_participants as f64;
    let (mut value, ceiling) = if total_participants == 0 {
        (EMPTY_BASELINE, EMPTY_BASELINE * CEILING_SHARE)
    } else {
        (total * BASELINE_SHARE, total * CEILING_SHARE)
    };

    (0..TREND_DAYS)
        .map(|_| {
            value += value * rng.gen_range(DAILY_GROWTH);
            if rng.gen_bool(SPIKE_CHANCE) {
                value += value * rng.gen_range(SPIKE_GROWTH);
            }
            value = value.min(ceiling);
            value
        })
        .collect()
}

/// Add `size` on `day` and a linearly fading share to every later day.
fn overlay_bump(bumps: &mut [f64], day: usize, size: f64) {
    bumps[day] += size;
    let remaining = bumps.len() - day;
    for (offset, slot) in bumps[day + 1..].iter_mut().enumerate() {
        let fade = 1.0 - (offset + 1) as f64 / remaining as f64;
        *slot += size * CARRY_SHARE * fade;
    }
}

/// Steadily increasing series with a spike every seventh day.
fn fallback_series() -> Vec<f64> {
    (0..TREND_DAYS as u32)
        .map(|i| {
            let spike = if (i + 1) % 7 == 0 { FALLBACK_SPIKE } else { 0 };
            (FALLBACK_START + i * FALLBACK_STEP + spike) as f64
        })
        .collect()
}
