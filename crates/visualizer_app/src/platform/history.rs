use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use visualizer_core::JobId;
use visualizer_logging::{viz_info, viz_warn};

const HISTORY_FILENAME: &str = ".visualizer_history.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub job_id: JobId,
    pub first_seen: DateTime<Utc>,
    pub last_status: String,
}

/// Jobs submitted or tracked from this machine, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Reads the history in `dir`. Unreadable files start an empty history.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(HISTORY_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                viz_warn!("Failed to read job history from {:?}: {}", path, err);
                return Self::default();
            }
        };
        match ron::from_str(&content) {
            Ok(history) => history,
            Err(err) => {
                viz_warn!("Failed to parse job history from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Adds `job_id` on first sight, otherwise refreshes its status.
    pub fn record(&mut self, job_id: JobId, status: &str, now: DateTime<Utc>) {
        match self.entries.iter_mut().find(|entry| entry.job_id == job_id) {
            Some(entry) => entry.last_status = status.to_string(),
            None => self.entries.push(HistoryEntry {
                job_id,
                first_seen: now,
                last_status: status.to_string(),
            }),
        }
    }

    /// Writes through a temp file in `dir` and renames it into place.
    pub fn save(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(io::Error::other)?;

        let target = dir.join(HISTORY_FILENAME);
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|err| err.error)?;
        viz_info!("Saved {} history entries to {:?}", self.entries.len(), target);
        Ok(target)
    }
}
