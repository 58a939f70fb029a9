mod analytics;
mod booking;
mod catalog;
mod envelope;
mod event;
mod leaderboard;
mod participant;
mod placement;
mod team;
mod user;

pub use analytics::*;
pub use booking::*;
pub use catalog::*;
pub use envelope::*;
pub use event::*;
pub use leaderboard::*;
pub use participant::*;
pub use placement::*;
pub use team::*;
pub use user::*;
