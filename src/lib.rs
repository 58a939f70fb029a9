//! Admin client for a gaming-lounge backend.
//!
//! Covers event CRUD, the live event lifecycle, participation analytics, the
//! printable summary report and the realtime leaderboard feed.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn example() -> lounge_admin::Result<()> {
//! use lounge_admin::{aggregate, ClientConfig, LoungeClient};
//!
//! let client = LoungeClient::from_config(ClientConfig::from_env()?)?;
//! let (events, teams) = (client.get_events().await?, client.get_teams().await?);
//! let snapshot = aggregate(&events, &teams);
//! println!("{} participants, {:.0}% verified", snapshot.total_participants, snapshot.verification_rate);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod leaderboard;
pub mod live;
pub mod model;
pub mod poll;
pub mod report;
pub mod session;
pub mod trend;
pub mod view;

#[cfg(test)]
mod test_support;

pub use aggregate::{aggregate, aggregate_with, participants, EstimatePolicy};
pub use client::LoungeClient;
pub use config::ClientConfig;
pub use error::{LoungeError, Result};
pub use leaderboard::{Leaderboard, LeaderboardFeed};
pub use live::{check_transition, LiveBoard, LiveEvent, LiveEventController};
pub use model::*;
pub use poll::Poller;
pub use report::{CsvExport, Report, ReportType};
pub use session::{AuthRedirect, Session};
pub use trend::synthesize_trend;
pub use view::ViewState;
