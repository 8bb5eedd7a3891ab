//! Leaderboard: run records and score submission
//!
//! A run's score can be stored at most once. The latch lives on the session
//! and is only set after the store accepted the record, so a failed save can
//! be retried.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{GamePhase, Session};

/// Shortest accepted nickname (characters, after normalization)
pub const MIN_NICKNAME_LEN: usize = 2;
/// Longest accepted nickname
pub const MAX_NICKNAME_LEN: usize = 20;

/// Number of rows shown on the leaderboard screen
pub const LEADERBOARD_ROWS: usize = 10;

/// A finished run as stored on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub nickname: String,
    #[serde(default)]
    pub total_targets: u32,
    #[serde(default)]
    pub levels_completed: u32,
    /// Unix timestamp (ms); 0 when unknown
    #[serde(default)]
    pub created_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NicknameError {
    #[error("Please enter a nickname.")]
    Empty,
    #[error("Nickname must be at least 2 characters.")]
    TooShort,
    #[error("Nickname must be 20 characters or fewer.")]
    TooLong,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Leaderboard is not configured yet.")]
    NotConfigured,
    #[error("Could not save score. Please try again.")]
    Unavailable(String),
    #[error("stored leaderboard is unreadable: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Score already saved for this run.")]
    AlreadySubmitted,
    #[error("The run is still in progress.")]
    RunInProgress,
    #[error(transparent)]
    InvalidNickname(#[from] NicknameError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Collapse whitespace runs to single spaces and trim
pub fn normalize_nickname(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize and check a nickname
pub fn validate_nickname(raw: &str) -> Result<String, NicknameError> {
    let nickname = normalize_nickname(raw);
    let len = nickname.chars().count();
    if len == 0 {
        Err(NicknameError::Empty)
    } else if len < MIN_NICKNAME_LEN {
        Err(NicknameError::TooShort)
    } else if len > MAX_NICKNAME_LEN {
        Err(NicknameError::TooLong)
    } else {
        Ok(nickname)
    }
}

/// Somewhere run records can be kept
pub trait ScoreStore {
    fn append(&mut self, record: RunRecord) -> Result<(), StoreError>;
    fn entries(&self) -> Result<Vec<RunRecord>, StoreError>;
}

/// In-process store, also used by the native build
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<RunRecord>,
    configured: bool,
    outage: Option<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            configured: true,
            outage: None,
        }
    }

    /// A store with no backend behind it
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Make every call fail with `reason` until cleared with `None`
    pub fn set_outage(&mut self, reason: Option<String>) {
        self.outage = reason;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if !self.configured {
            return Err(StoreError::NotConfigured);
        }
        match &self.outage {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl ScoreStore for MemoryStore {
    fn append(&mut self, record: RunRecord) -> Result<(), StoreError> {
        self.check()?;
        self.records.push(record);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<RunRecord>, StoreError> {
        self.check()?;
        Ok(self.records.clone())
    }
}

/// Records kept as a JSON array in the browser's LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "dot_hunt_leaderboard";

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::NotConfigured)
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn append(&mut self, record: RunRecord) -> Result<(), StoreError> {
        let mut records = self.entries()?;
        records.push(record);
        let json = serde_json::to_string(&records)?;
        Self::storage()?
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?;
        log::info!("Leaderboard saved ({} entries)", records.len());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<RunRecord>, StoreError> {
        let stored = Self::storage()?
            .get_item(Self::STORAGE_KEY)
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?;
        match stored {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Store the finished run's record under `nickname`.
///
/// Accepted once the run is lost or stopped on a cleared level. Refused once
/// a record for this run was stored, or while a level is still being played.
/// `now` is the creation timestamp (ms since the Unix epoch).
pub fn submit_score<S: ScoreStore + ?Sized>(
    session: &mut Session,
    store: &mut S,
    nickname: &str,
    now: f64,
) -> Result<RunRecord, SubmitError> {
    if session.score_submitted {
        return Err(SubmitError::AlreadySubmitted);
    }
    if !session.phase.is_between_levels() {
        return Err(SubmitError::RunInProgress);
    }

    let nickname = validate_nickname(nickname)?;
    let record = session.run_record(&nickname, now);
    if let Err(e) = store.append(record.clone()) {
        log::warn!("Score submission failed: {:?}", e);
        return Err(e.into());
    }

    session.score_submitted = true;
    log::info!(
        "Score saved for {}: {} targets, {} levels",
        record.nickname,
        record.total_targets,
        record.levels_completed
    );
    Ok(record)
}

/// Run records in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<RunRecord>,
}

impl Leaderboard {
    /// Sort by targets, then levels, newest first on ties
    pub fn sorted(mut entries: Vec<RunRecord>) -> Self {
        entries.sort_by(|a, b| {
            b.total_targets
                .cmp(&a.total_targets)
                .then(b.levels_completed.cmp(&a.levels_completed))
                .then(b.created_at.total_cmp(&a.created_at))
        });
        Self { entries }
    }

    /// Read and sort everything in `store`
    pub fn load<S: ScoreStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        Ok(Self::sorted(store.entries()?))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `n` entries
    pub fn top(&self, n: usize) -> &[RunRecord] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// 1-based position of an entry equal to `record`
    pub fn rank(&self, record: &RunRecord) -> Option<usize> {
        self.entries.iter().position(|e| e == record).map(|i| i + 1)
    }
}

/// Date column text, e.g. `Mar 4, 2025`; `--` when unknown
pub fn format_date(created_at: f64) -> String {
    if !created_at.is_finite() || created_at <= 0.0 {
        return "--".to_string();
    }
    match DateTime::from_timestamp_millis(created_at as i64) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "--".to_string(),
    }
}
