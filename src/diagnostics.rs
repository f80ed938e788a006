//! Run state tracking and the debug report
//!
//! Each pipeline stage records what it found (paths, counts, page indices)
//! into a [`DiagnosticContext`]. When a run fails, or when debug mode is
//! switched on in the configuration, the context is rendered as a plain text
//! report.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Write as _};

use tracing::debug;

use crate::config::{DebugConfig, Dirs, Settings};
use crate::error::{Error, Result};

/// Pipeline progress for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Located,
    Classified,
    Redacted,
    Merged,
    Done,
    Failed,
}

impl RunState {
    /// The state a successful stage moves to, if any
    pub fn successor(self) -> Option<RunState> {
        match self {
            RunState::Start => Some(RunState::Located),
            RunState::Located => Some(RunState::Classified),
            RunState::Classified => Some(RunState::Redacted),
            RunState::Redacted => Some(RunState::Merged),
            RunState::Merged => Some(RunState::Done),
            RunState::Done | RunState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "start",
            RunState::Located => "located",
            RunState::Classified => "classified",
            RunState::Redacted => "redacted",
            RunState::Merged => "merged",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Explicit record of a run, filled in by the pipeline stages
#[derive(Debug, Clone)]
pub struct DiagnosticContext {
    state: RunState,
    /// Last state reached before failing
    failed_after: Option<RunState>,
    values: BTreeMap<String, String>,
    settings: Option<String>,
    environment: Option<String>,
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self {
            state: RunState::Start,
            failed_after: None,
            values: BTreeMap::new(),
            settings: None,
            environment: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn failed_after(&self) -> Option<RunState> {
        self.failed_after
    }

    /// Move to the next state. Only the successor of the current state is
    /// accepted.
    pub fn advance(&mut self, to: RunState) -> Result<()> {
        if self.state.successor() != Some(to) {
            return Err(Error::General(format!(
                "invalid run state transition from {} to {}",
                self.state, to
            )));
        }
        debug!(from = %self.state, to = %to, "run state");
        self.state = to;
        Ok(())
    }

    /// Record a failure. Any non-terminal state may fail.
    pub fn fail(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.failed_after = Some(self.state);
        self.state = RunState::Failed;
    }

    /// Record a value under `key`, replacing any earlier value
    pub fn record(&mut self, key: &str, value: impl Display) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_settings(&mut self, settings: &Settings) {
        self.settings = Some(format!("{:#?}", settings));
    }

    pub fn set_environment(&mut self, dirs: &Dirs) {
        let mut environment = String::new();
        let _ = writeln!(environment, "program_dir : {}", dirs.program_dir.display());
        let _ = writeln!(environment, "home_dir : {}", dirs.home_dir.display());
        let _ = writeln!(environment, "version : {}", env!("CARGO_PKG_VERSION"));
        self.environment = Some(environment);
    }

    /// Render the categories selected in `debug` as a text report
    pub fn render(&self, debug: &DebugConfig) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n===== DEBUG MODE =====");
        let _ = writeln!(
            out,
            "To turn off debug mode, change \"debug\" : \"active\"\nvariable to false in the configuration file."
        );

        match self.failed_after {
            Some(last) => {
                let _ = writeln!(out, "\nstate : {} (after {})", self.state, last);
            }
            None => {
                let _ = writeln!(out, "\nstate : {}", self.state);
            }
        }

        if debug.globals {
            let _ = writeln!(out, "\n... GLOBALS ...");
            out.push_str(self.environment.as_deref().unwrap_or("<not available>\n"));
        }

        if debug.scope {
            let _ = writeln!(out, "\n... SCOPE ...");
            let _ = writeln!(out, "{}", self.settings.as_deref().unwrap_or("<not resolved>"));
        }

        if debug.locals {
            let _ = writeln!(out, "\n... LOCALS ...");
            for (key, value) in &self.values {
                let _ = writeln!(out, "{} : {}", key, value);
            }
        }

        if !debug.kwargs.is_empty() {
            let _ = writeln!(out, "\n... KWARGS ...");
            for (label, key) in &debug.kwargs {
                let _ = writeln!(out, "{} = {}", label, self.get(key).unwrap_or("<not recorded>"));
            }
        }

        out
    }
}
