use std::{
    collections::HashMap,
    fmt, fs,
    path::PathBuf,
};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::usage::CommandUsage;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `session_<unix millis>_<7 base36 chars>`
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();

        Self(format!("session_{}_{suffix}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCount {
    pub command: String,
    pub count: u64,
}

/// In-memory state of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    /// Per-command counts in first-use order.
    pub commands_used: Vec<CommandCount>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            commands_used: Vec::new(),
        }
    }

    fn bump(&mut self, command: &str) {
        match self.commands_used.iter_mut().find(|c| c.command == command) {
            Some(entry) => entry.count += 1,
            None => self.commands_used.push(CommandCount { command: command.to_owned(), count: 1 }),
        }
    }
}

/// What gets written to `<analytics dir>/<session id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Milliseconds.
    pub duration: i64,
    pub commands_used: Vec<CommandCount>,
}

/// Session table plus the process-wide command aggregator it feeds.
#[derive(Debug)]
pub struct SessionTracker {
    analytics_dir: PathBuf,
    sessions: Mutex<HashMap<SessionId, Session>>,
    usage: CommandUsage,
}

impl SessionTracker {
    pub fn new(analytics_dir: impl Into<PathBuf>) -> Self {
        Self {
            analytics_dir: analytics_dir.into(),
            sessions: Mutex::new(HashMap::new()),
            usage: CommandUsage::new(),
        }
    }

    pub fn usage(&self) -> &CommandUsage {
        &self.usage
    }

    pub fn start_session(&self) -> SessionId {
        let id = SessionId::generate();
        let session = Session::new(id.clone());
        let start_time = session.start_time;

        self.sessions.lock().insert(id.clone(), session);
        info!(session_id = %id, start_time = %start_time, "New session started: {id}");

        id
    }

    pub fn session(&self, id: &SessionId) -> Option<Session> {
        self.sessions.lock().get(id).cloned()
    }

    /// Count `command` against the session and the process-wide aggregator.
    /// An unknown session only feeds the aggregator.
    pub fn record_command_usage(&self, id: &SessionId, command: &str) {
        match self.sessions.lock().get_mut(id) {
            Some(session) => session.bump(command),
            None => warn!(session_id = %id, command, "Recorded command for non-existent session: {id}"),
        }

        self.usage.record(command);
        debug!(command, session_id = %id, "Command used: {command}");
    }

    /// Finalize the session and persist its record.
    ///
    /// Returns `None` for unknown sessions and for sessions that were already
    /// ended; the first call is authoritative.
    pub fn end_session(&self, id: &SessionId) -> Option<SessionRecord> {
        let record = {
            let mut sessions = self.sessions.lock();
            let Some(session) = sessions.get_mut(id) else {
                warn!(session_id = %id, "Attempted to end non-existent session: {id}");
                return None;
            };

            if session.end_time.is_some() {
                warn!(session_id = %id, "Attempted to end session twice: {id}");
                return None;
            }

            let end_time = Utc::now();
            let duration = (end_time - session.start_time).num_milliseconds();
            session.end_time = Some(end_time);
            session.duration_ms = Some(duration);

            SessionRecord {
                session_id: id.clone(),
                start_time: session.start_time,
                end_time,
                duration,
                commands_used: session.commands_used.clone(),
            }
        };

        info!(
            session_id = %id,
            duration = %format!("{:.2}s", record.duration as f64 / 1000.0),
            commands_used = %serde_json::to_string(&record.commands_used).unwrap_or_default(),
            "Session ended: {id}"
        );

        match self.persist(&record) {
            Ok(path) => debug!(session_id = %id, path = %path.display(), "Session data saved"),
            Err(err) => error!(session_id = %id, "Failed to save session data: {err:#}"),
        }

        Some(record)
    }

    fn persist(&self, record: &SessionRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.analytics_dir).with_context(|| {
            format!("Failed to create analytics directory: {}", self.analytics_dir.display())
        })?;

        let path = self.analytics_dir.join(format!("{}.json", record.session_id));
        let json = serde_json::to_string_pretty(record).context("Failed to serialize session record")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;

        Ok(path)
    }
}
