use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DeskPilotResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ts: DateTime<Utc>,
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            role,
            content: content.into(),
        }
    }
}

/// Bounded conversation window: a pinned prefix (the original goal and the
/// initial plan) that is never evicted, and a sliding suffix of the most
/// recent turns. Once the total exceeds the window, the oldest non-pinned
/// entry is dropped — head and tail survive, the middle goes.
#[derive(Debug)]
pub struct ConversationHistory {
    pinned: Vec<HistoryEntry>,
    recent: VecDeque<HistoryEntry>,
    window: usize,
}

impl ConversationHistory {
    pub fn new(window: usize) -> Self {
        Self {
            pinned: Vec::new(),
            recent: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Seed entries that must survive truncation.
    pub fn pin(&mut self, entry: HistoryEntry) {
        self.pinned.push(entry);
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.recent.push_back(entry);
        // Keep at least the newest turn even when the pinned prefix alone
        // fills the window.
        let budget = self.window.saturating_sub(self.pinned.len()).max(1);
        while self.recent.len() > budget {
            self.recent.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.pinned.len() + self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.pinned.clear();
        self.recent.clear();
    }

    /// Owned copy, pinned prefix first. This is the only form handed to
    /// other threads or to the proposal boundary.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.pinned
            .iter()
            .chain(self.recent.iter())
            .cloned()
            .collect()
    }
}

/// Append-only JSONL transcript of one run, kept under the platform data
/// dir. Purely observational; the engine never reads it back.
pub struct SessionLog {
    pub session_id: String,
    file_path: PathBuf,
}

impl SessionLog {
    pub fn new() -> DeskPilotResult<Self> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let dir = sessions_dir();
        std::fs::create_dir_all(&dir)?;
        let file_path = dir.join(format!("session_{session_id}.jsonl"));
        Ok(Self {
            session_id,
            file_path,
        })
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            file_path: path,
        }
    }

    pub fn append(&self, entry: &HistoryEntry) -> DeskPilotResult<()> {
        let line = serde_json::to_string(entry)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.file_path
    }
}

fn sessions_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deskpilot")
        .join("sessions")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(role: Role, content: &str) -> HistoryEntry {
        HistoryEntry::now(role, content)
    }

    #[test]
    fn truncation_keeps_pinned_prefix_and_recent_tail() {
        let mut history = ConversationHistory::new(5);
        history.pin(entry(Role::User, "goal"));
        history.pin(entry(Role::Assistant, "plan"));
        for i in 0..10 {
            history.push(entry(Role::System, &format!("turn {i}")));
        }
        let entries = history.snapshot();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].content, "goal");
        assert_eq!(entries[1].content, "plan");
        assert_eq!(entries[2].content, "turn 7");
        assert_eq!(entries[4].content, "turn 9");
    }

    #[test]
    fn newest_turn_survives_even_when_pins_fill_the_window() {
        let mut history = ConversationHistory::new(2);
        history.pin(entry(Role::User, "goal"));
        history.pin(entry(Role::Assistant, "plan"));
        history.push(entry(Role::System, "a"));
        history.push(entry(Role::System, "b"));
        let entries = history.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].content, "b");
    }

    #[test]
    fn under_window_nothing_is_dropped() {
        let mut history = ConversationHistory::new(15);
        history.pin(entry(Role::User, "goal"));
        for i in 0..5 {
            history.push(entry(Role::System, &format!("turn {i}")));
        }
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn session_log_appends_jsonl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::at(dir.path().join("session.jsonl"));
        log.append(&entry(Role::User, "open the editor")).unwrap();
        log.append(&entry(Role::System, "done")).unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: HistoryEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.content, "open the editor");
        assert_eq!(parsed.role, Role::User);
    }
}
