// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Live Run Records
// Description: Per-test record of a live conformance run.
// Purpose: Leave the suite summary and a verdict behind, even on panic.
// Dependencies: system-tests, cost-manager-probe, serde, serde_jcs
// ============================================================================

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use cost_manager_probe::SuiteSummary;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// File holding the verdict of one live test.
const VERDICT_FILE: &str = "verdict.json";

/// Verdict written once per live test.
#[derive(Debug, Serialize)]
struct LiveVerdict<'a> {
    /// Test function name.
    test_name: &'a str,
    /// `pass`, `fail`, `panic`, or `aborted`.
    verdict: &'static str,
    /// Start of the test, epoch milliseconds.
    started_at_ms: u128,
    /// End of the test, epoch milliseconds.
    ended_at_ms: u128,
    /// Probes that passed.
    passed: usize,
    /// Probe failures as `name: message`.
    failures: Vec<String>,
    /// Suite files written next to the verdict.
    files: Vec<String>,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Record of one live test under `<run root>/<test name>/`.
#[derive(Debug)]
pub struct LiveRunRecord {
    /// Test function name.
    test_name: String,
    /// Directory of this test's files.
    dir: PathBuf,
    /// When the record was opened.
    started_at_ms: u128,
    /// Whether a verdict has been written.
    recorded: bool,
}

impl LiveRunRecord {
    /// Opens the record directory, under the configured run root when set.
    pub fn open(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let started_at_ms = now_millis();
        let run_root = config.run_root.unwrap_or_else(|| {
            PathBuf::from("target/system-tests").join(format!("run_{started_at_ms}"))
        });
        let dir = run_root.join(test_name);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            test_name: test_name.to_string(),
            dir,
            started_at_ms,
            recorded: false,
        })
    }

    /// Writes the suite summary files and the verdict derived from them.
    pub fn record(&mut self, summary: &SuiteSummary) -> io::Result<()> {
        let written = summary.write_artifacts(&self.dir.join("suite"))?;
        let failures = summary
            .outcomes
            .iter()
            .filter(|outcome| !outcome.passed())
            .map(|outcome| {
                format!("{}: {}", outcome.probe, outcome.message.as_deref().unwrap_or("failed"))
            })
            .collect();
        let verdict = if summary.is_success() { "pass" } else { "fail" };
        let files = written.iter().map(|path| path.display().to_string()).collect();
        self.write_verdict(verdict, summary.passed, failures, files)
    }

    fn write_verdict(
        &mut self,
        verdict: &'static str,
        passed: usize,
        failures: Vec<String>,
        files: Vec<String>,
    ) -> io::Result<()> {
        let record = LiveVerdict {
            test_name: &self.test_name,
            verdict,
            started_at_ms: self.started_at_ms,
            ended_at_ms: now_millis(),
            passed,
            failures,
            files,
        };
        let bytes = serde_jcs::to_vec(&record).map_err(io::Error::other)?;
        fs::write(self.dir.join(VERDICT_FILE), bytes)?;
        self.recorded = true;
        Ok(())
    }
}

impl Drop for LiveRunRecord {
    fn drop(&mut self) {
        if self.recorded {
            return;
        }
        let verdict = if std::thread::panicking() { "panic" } else { "aborted" };
        let _ = self.write_verdict(verdict, 0, Vec::new(), Vec::new());
    }
}
