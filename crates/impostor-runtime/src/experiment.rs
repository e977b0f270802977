//! Experiment bookkeeping: one JSON record per created game.
//!
//! Records land at `<root>/<YYYY-MM-DD>/game_<id>.json`. Writing happens on a
//! blocking thread and never fails game creation; errors are logged.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use impostor_core::{GameConfig, SessionId};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Marker used when the source revision cannot be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// What gets written for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRecord {
    /// Session id.
    pub game_id: SessionId,
    /// Engine that runs the game.
    pub engine: String,
    /// Day the game was created (`YYYY-MM-DD`).
    pub date: String,
    /// Source revision (`git rev-parse HEAD`) or `unknown`.
    pub version: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Full game configuration.
    pub config: GameConfig,
}

/// Sink for per-game experiment records.
#[cfg_attr(test, mockall::automock)]
pub trait ExperimentRecorder: Send + Sync {
    /// Record the creation of a game. Must not block.
    fn record(&self, session_id: SessionId, engine: &str, config: &GameConfig);
}

/// Writes records as JSON files under a storage root.
pub struct FileExperimentRecorder {
    root: PathBuf,
    repo_dir: PathBuf,
    version: Arc<OnceLock<String>>,
}

impl FileExperimentRecorder {
    /// Records go under `root`; the version marker is read from the git
    /// checkout containing the working directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            repo_dir: PathBuf::from("."),
            version: Arc::new(OnceLock::new()),
        }
    }

    /// Read the version marker from `dir` instead of the working directory.
    #[must_use]
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = dir.into();
        self
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the record on a blocking thread.
    pub fn spawn_write(
        &self,
        session_id: SessionId,
        engine: &str,
        config: &GameConfig,
    ) -> JoinHandle<()> {
        let root = self.root.clone();
        let repo_dir = self.repo_dir.clone();
        let version = self.version.clone();
        let created_at = Utc::now();
        let mut record = ExperimentRecord {
            game_id: session_id,
            engine: engine.to_owned(),
            date: created_at.format("%Y-%m-%d").to_string(),
            version: String::new(),
            created_at,
            config: config.clone(),
        };

        tokio::task::spawn_blocking(move || {
            record.version = version.get_or_init(|| git_version(&repo_dir)).clone();
            match write_record(&root, &record) {
                Ok(path) => debug!(%session_id, path = %path.display(), "experiment record written"),
                Err(e) => warn!(%session_id, error = %e, "failed to write experiment record"),
            }
        })
    }
}

impl ExperimentRecorder for FileExperimentRecorder {
    fn record(&self, session_id: SessionId, engine: &str, config: &GameConfig) {
        let _ = self.spawn_write(session_id, engine, config);
    }
}

/// Write `record` to `<root>/<date>/game_<id>.json`.
pub fn write_record(root: &Path, record: &ExperimentRecord) -> std::io::Result<PathBuf> {
    let dir = root.join(&record.date);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("game_{}.json", record.game_id));
    let body = serde_json::to_vec_pretty(record)?;
    std::fs::write(&path, body)?;
    Ok(path)
}

/// Current `HEAD` of the git checkout at `dir`, or [`UNKNOWN_VERSION`].
pub fn git_version(dir: &Path) -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_owned())
}
