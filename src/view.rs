use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::Result;

/// What a screen shows for one fetched resource: the last good data,
/// plus the error from the most recent failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            updated_at: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Record a fetch outcome. Failures keep the previous data on screen.
    pub fn apply(&mut self, result: Result<T>) {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.updated_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(error = %e, "fetch failed, keeping last good data");
                self.error = Some(e.user_message());
            }
        }
    }

    /// Showing old data next to an error.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }
}
