use serde::Serialize;
use std::cell::RefCell;

/// Receives diagnostics from a merge run.
///
/// The merge never logs directly; callers choose where messages go.
pub trait Reporter {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn warn(&self, message: &str);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn warn(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: RefCell<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at(Level::Warn)
    }

    pub fn infos(&self) -> Vec<String> {
        self.at(Level::Info)
    }

    fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }
}

// ── Merge report ─────────────────────────────────────────────────────

/// A profile name targeted by more than one account profile in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub profile_name: String,
    /// Every role that rendered to this name, sorted and deduplicated.
    pub roles: Vec<String>,
    /// The role whose data ended up in the section.
    pub winner: String,
}

impl Duplicate {
    pub fn warning(&self) -> String {
        format!(
            "Profile {} has roles: {}",
            self.profile_name,
            self.roles.join(", ")
        )
    }
}

/// An account profile that lost to the section's occupant under the role
/// preference patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProfile {
    pub profile_name: String,
    pub role: String,
    pub kept_role: String,
    pub pattern: String,
}

/// What a merge run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Stale generated sections removed before writing.
    pub pruned: Vec<String>,
    /// `sso-session` sections written.
    pub sessions: Vec<String>,
    /// `profile` sections written, once each, in first-write order.
    pub profiles: Vec<String>,
    pub skipped: Vec<SkippedProfile>,
    pub duplicates: Vec<Duplicate>,
}

impl MergeReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}
