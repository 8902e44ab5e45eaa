//! Forwarding of locally-known projects to the annoeva monitor.
//!
//! Walks `all_ana_projects` rows that have not been registered yet and
//! shells out to the external tool once per row. The forwarded flag flips
//! N→Y only on a successful invocation and is never reversed, so a repeat
//! run performs no duplicate registrations.

use std::path::PathBuf;
use std::process::Command;

use log::{info, warn};

use crate::errors::{Error, Result};
use crate::projects::AnaProjectRepositoryTrait;

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    /// Verdict used to decide whether the forwarded flag may flip.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// External monitoring tool contract.
pub trait MonitorClientTrait {
    /// Register one project with the monitor.
    fn add_project(&self, proid: &str, ptype: &str, workdir: &str) -> Result<CommandOutcome>;
}

/// Invokes `<annoeva> addproject -p <proid> -t <ptype> -d <workdir>`.
pub struct AnnoevaCommand {
    program: PathBuf,
}

impl AnnoevaCommand {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl MonitorClientTrait for AnnoevaCommand {
    fn add_project(&self, proid: &str, ptype: &str, workdir: &str) -> Result<CommandOutcome> {
        let output = Command::new(&self.program)
            .arg("addproject")
            .args(["-p", proid, "-t", ptype, "-d", workdir])
            .output()
            .map_err(|e| {
                Error::Monitor(format!(
                    "failed to launch {}: {e}",
                    self.program.display()
                ))
            })?;
        Ok(CommandOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Counters reported by one forwarding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardSummary {
    pub forwarded: usize,
    pub failed: usize,
}

pub struct ForwardJob<'a> {
    repo: &'a dyn AnaProjectRepositoryTrait,
    monitor: &'a dyn MonitorClientTrait,
}

impl<'a> ForwardJob<'a> {
    pub fn new(
        repo: &'a dyn AnaProjectRepositoryTrait,
        monitor: &'a dyn MonitorClientTrait,
    ) -> Self {
        Self { repo, monitor }
    }

    /// Forward every pending row owned by `user`. Per-row failures are
    /// logged and leave the flag at `N` for the next pass.
    pub fn run(&self, user: &str) -> Result<ForwardSummary> {
        let pending = self.repo.pending_for_user(user)?;
        if pending.is_empty() {
            info!("no pending projects for {user}");
            return Ok(ForwardSummary::default());
        }

        let mut summary = ForwardSummary::default();
        for row in pending {
            match self.monitor.add_project(&row.proid, &row.ptype, &row.workdir) {
                Ok(outcome) if outcome.success() => {
                    match self.repo.mark_forwarded(&row.proid) {
                        Ok(_) => {
                            info!("registered {} with annoeva", row.proid);
                            summary.forwarded += 1;
                        }
                        Err(e) => {
                            warn!("registered {} but could not mark it: {e}", row.proid);
                            summary.failed += 1;
                        }
                    }
                }
                Ok(outcome) => {
                    warn!(
                        "annoeva rejected {} (exit {:?}): {}",
                        row.proid,
                        outcome.exit_code,
                        outcome.stderr.trim()
                    );
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!("could not invoke annoeva for {}: {e}", row.proid);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "forwarding done: {} registered, {} failed",
            summary.forwarded, summary.failed
        );
        Ok(summary)
    }
}
