//! Crontab self-registration, gated on the host recorded in settings.
//!
//! The forwarding pass is meant to run every two hours on exactly one
//! node. The first invocation records the current hostname as `cronnode`;
//! later invocations on other hosts skip registration with a warning.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use log::{debug, warn};

use evapro_core::settings::Settings;

const CRON_SCHEDULE: &str = "0 */2 * * *";

/// Register the `evapro cron` entry if this is the configured cron node
/// and the entry is not already present.
pub fn ensure_registered(conf_path: &Path) -> anyhow::Result<()> {
    let mut settings = Settings::load_or_default(conf_path)?;
    let host = gethostname::gethostname().to_string_lossy().into_owned();

    match settings.cronnode.as_deref() {
        None => {
            settings.cronnode = Some(host);
            settings.save(conf_path)?;
        }
        Some(node) if node != host => {
            warn!("host {host} does not match configured cron node {node}; skipping crontab registration");
            return Ok(());
        }
        Some(_) => {}
    }

    let program = std::env::current_exe().context("cannot resolve own executable path")?;
    let program_name = program
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("evapro");

    let current = read_crontab()?;
    if has_entry(&current, program_name) {
        debug!("crontab entry already present");
        return Ok(());
    }
    write_crontab(&with_entry(&current, &program.to_string_lossy()))
}

/// True when the crontab already carries a forwarding entry for the
/// program (commented lines do not count).
fn has_entry(crontab: &str, program_name: &str) -> bool {
    let needle = format!("{program_name} cron");
    crontab
        .lines()
        .any(|line| !line.trim_start().starts_with('#') && line.contains(&needle))
}

/// Existing crontab plus our entry, blank lines dropped.
fn with_entry(crontab: &str, program: &str) -> String {
    let mut out = String::new();
    for line in crontab.lines().filter(|l| !l.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("{CRON_SCHEDULE} {program} cron\n"));
    out
}

/// `crontab -l` output; a missing crontab counts as empty.
fn read_crontab() -> anyhow::Result<String> {
    let output = Command::new("crontab")
        .arg("-l")
        .output()
        .context("cannot run `crontab -l`")?;
    if !output.status.success() {
        return Ok(String::new());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Replace the user's crontab via `crontab -`.
fn write_crontab(content: &str) -> anyhow::Result<()> {
    let mut child = Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .spawn()
        .context("cannot run `crontab -`")?;
    child
        .stdin
        .as_mut()
        .context("crontab stdin unavailable")?
        .write_all(content.as_bytes())?;
    let status = child.wait()?;
    if !status.success() {
        anyhow::bail!("crontab update failed with {status}");
    }
    debug!("registered crontab entry");
    Ok(())
}
