// crates/cost-manager-probe/src/summary.rs
// ============================================================================
// Module: Run Summary
// Description: Probe outcomes and deterministic summary artifacts.
// Purpose: Report a run as text, canonical JSON, and markdown.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! A [`SuiteSummary`] holds one [`ProbeOutcome`] per probe that ran.
//! [`SuiteSummary::write_artifacts`] writes `summary.json` with canonical JCS
//! serialization and a `summary.md` for humans.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::ProbeError;
use crate::ProbeId;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Whether a probe passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Every check held.
    Passed,
    /// A request or check failed.
    Failed,
}

/// Class of a probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service could not be reached.
    Transport,
    /// The service answered outside the contract.
    Contract,
    /// Fixture setup failed before the probe ran.
    Setup,
}

impl FailureKind {
    /// Returns the class of a probe error.
    #[must_use]
    pub const fn of(err: &ProbeError) -> Self {
        match err {
            ProbeError::Transport(_) => Self::Transport,
            ProbeError::Contract(_) => Self::Contract,
            ProbeError::Setup(_) => Self::Setup,
        }
    }
}

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Probe that ran.
    pub probe: ProbeId,
    /// Pass or fail.
    pub status: ProbeStatus,
    /// Failure class, when failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Failure message, when failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall-clock duration.
    pub duration_ms: u64,
}

impl ProbeOutcome {
    /// Builds an outcome from a probe result.
    #[must_use]
    pub fn from_result(probe: ProbeId, result: &Result<(), ProbeError>, duration_ms: u64) -> Self {
        match result {
            Ok(()) => Self {
                probe,
                status: ProbeStatus::Passed,
                failure: None,
                message: None,
                duration_ms,
            },
            Err(err) => Self {
                probe,
                status: ProbeStatus::Failed,
                failure: Some(FailureKind::of(err)),
                message: Some(err.to_string()),
                duration_ms,
            },
        }
    }

    /// Returns true when the probe passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ProbeStatus::Passed
    }
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Outcomes of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSummary {
    /// Run start, Unix milliseconds.
    pub started_at_ms: u64,
    /// Run end, Unix milliseconds.
    pub ended_at_ms: u64,
    /// Probes that passed.
    pub passed: usize,
    /// Probes that failed.
    pub failed: usize,
    /// One entry per probe, in execution order.
    pub outcomes: Vec<ProbeOutcome>,
}

impl SuiteSummary {
    /// Builds a summary and counts the outcomes.
    #[must_use]
    pub fn new(started_at_ms: u64, ended_at_ms: u64, outcomes: Vec<ProbeOutcome>) -> Self {
        let passed = outcomes.iter().filter(|outcome| outcome.passed()).count();
        Self {
            started_at_ms,
            ended_at_ms,
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    /// Returns true when no probe failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns the outcome of a probe, if it ran.
    #[must_use]
    pub fn outcome(&self, probe: ProbeId) -> Option<&ProbeOutcome> {
        self.outcomes.iter().find(|outcome| outcome.probe == probe)
    }

    /// Run duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.ended_at_ms.saturating_sub(self.started_at_ms)
    }

    /// Renders one line per probe and a totals line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let mark = if outcome.passed() { "PASS" } else { "FAIL" };
            let _ = write!(out, "{mark} {} ({} ms)", outcome.probe, outcome.duration_ms);
            if let Some(message) = &outcome.message {
                let _ = write!(out, ": {message}");
            }
            out.push('\n');
        }
        let _ = write!(out, "{} passed, {} failed", self.passed, self.failed);
        out
    }

    /// Renders a markdown report.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let status = if self.is_success() { "passed" } else { "failed" };
        let mut out = String::new();
        out.push_str("# Conformance Summary\n\n");
        out.push_str("## Status\n\n");
        let _ = writeln!(out, "- Status: {status}");
        let _ = writeln!(out, "- Passed: {}", self.passed);
        let _ = writeln!(out, "- Failed: {}", self.failed);
        let _ = writeln!(out, "- Duration (ms): {}", self.duration_ms());
        out.push_str("\n## Probes\n\n");
        out.push_str("| Probe | Status | Failure | Duration (ms) |\n");
        out.push_str("|---|---|---|---|\n");
        for outcome in &self.outcomes {
            let status = if outcome.passed() { "passed" } else { "failed" };
            let failure = outcome.message.as_deref().unwrap_or("").replace('|', "\\|");
            let _ = writeln!(
                out,
                "| {} | {status} | {failure} | {} |",
                outcome.probe, outcome.duration_ms
            );
        }
        out
    }

    /// Writes `summary.json` and `summary.md` into `dir`, creating it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory or either file cannot be
    /// written.
    pub fn write_artifacts(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let json_path = dir.join("summary.json");
        let bytes = serde_jcs::to_vec(self).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&json_path, bytes)?;
        let markdown_path = dir.join("summary.md");
        fs::write(&markdown_path, self.to_markdown().as_bytes())?;
        Ok(vec![json_path, markdown_path])
    }
}

/// Current Unix time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}
