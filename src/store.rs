//! JSON file persistence for the league snapshot. Whole-document writes, last writer wins.

use crate::models::League;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "league file I/O failed: {}", e),
            StoreError::Json(e) => write!(f, "league file is not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Load the league from `path`. A missing file is an empty league.
pub fn load_league(path: &Path) -> Result<League, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No league file at {}, starting empty", path.display());
            Ok(League::new())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn to_json(league: &League) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(league)?)
}

/// Write the snapshot to a per-call temp file next to `path`, then rename it over `path`.
pub async fn save_league(path: &Path, league: &League) -> Result<(), StoreError> {
    let json = to_json(league)?;
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
    let written = match tokio::fs::write(&tmp, json).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    Ok(written?)
}

/// Serialises saves of one league file and drops snapshots older than the last one written.
///
/// Callers tag each snapshot with a generation taken under the same lock as the mutation,
/// so the file only ever moves forward even when saves finish out of order.
#[derive(Debug)]
pub struct LeagueWriter {
    path: PathBuf,
    written: Mutex<u64>,
}

impl LeagueWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save `league` as `generation`. Returns false (and writes nothing) when a newer or equal
    /// generation is already on disk.
    pub async fn save(&self, generation: u64, league: &League) -> Result<bool, StoreError> {
        let mut written = self.written.lock().await;
        if generation <= *written {
            log::debug!(
                "Skipping stale snapshot {} (generation {} already saved)",
                generation,
                *written
            );
            return Ok(false);
        }
        save_league(&self.path, league).await?;
        *written = generation;
        Ok(true)
    }
}
