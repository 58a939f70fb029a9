use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use strum_macros::EnumString;
use tracing::{info, instrument};

use crate::api;
use crate::error::{LoungeError, Result};
use crate::gateway::Gateway;

/// Report kinds the backend can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReportType {
    Summary,
    Events,
    Participants,
    Teams,
}

/// A CSV document prepared by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub report_type: ReportType,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl CsvExport {
    #[instrument(skip(gateway))]
    pub(crate) async fn fetch(
        gateway: &Gateway,
        report_type: ReportType,
        today: NaiveDate,
    ) -> Result<Self> {
        let bytes = api::events::export_events(gateway, "csv", &report_type.to_string()).await?;
        Ok(Self {
            report_type,
            filename: format!("lounge-{report_type}-report-{today}.csv"),
            bytes,
        })
    }

    /// Write the export into `dir` under its own filename.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.bytes).map_err(|source| LoungeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), bytes = self.bytes.len(), "saved csv export");
        Ok(path)
    }
}
