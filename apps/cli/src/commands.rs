//! Subcommand implementations: wiring of settings, store, LIMS client,
//! and the core jobs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use evapro_core::forward::{AnnoevaCommand, ForwardJob};
use evapro_core::settings::{load_autoflow_products, Settings};
use evapro_core::sync::{now_sync_time, LimsSyncJob};
use evapro_lims::LimsClient;
use evapro_storage_sqlite::{create_pool, run_migrations, AnaProjectRepository};

/// `evapro init`: create tables, fix permissions, persist the db dir.
pub fn run_init(conf_path: &Path, syncdbdir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut settings = Settings::load_or_default(conf_path)?;
    if let Some(dir) = syncdbdir {
        settings.syncproject = Some(dir);
    }
    let db_path = settings.db_path()?;

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    fix_permissions(&db_path)?;
    settings.save(conf_path)?;

    info!("initialized tracking database at {}", db_path.display());
    println!(
        "review the LIMS connection settings in {}",
        conf_path.display()
    );
    Ok(())
}

/// `evapro lims2evapro`: one sync pass plus the two back-fill passes.
pub fn run_sync(conf_path: &Path) -> anyhow::Result<()> {
    let mut settings = Settings::load(conf_path)?;
    let since = settings
        .syn_lims_time
        .clone()
        .context("syn_lims_time not set in config")?;
    let started_at = now_sync_time();

    let billing_conf = settings
        .lims3
        .as_ref()
        .context("lims3 connection not configured")?;
    let message_conf = settings
        .cloud_message_info
        .as_ref()
        .context("cloud_message_info connection not configured")?;
    let annoeva_conf = settings
        .annoevaconf
        .as_ref()
        .context("annoevaconf path not configured")?;
    let autoflow = load_autoflow_products(annoeva_conf)?;

    let mut lims = LimsClient::connect(billing_conf, message_conf)?;
    let pool = create_pool(&settings.db_path()?)?;
    run_migrations(&pool)?;
    let repo = AnaProjectRepository::new(pool);

    let mut job = LimsSyncJob::new(
        &repo,
        &mut lims,
        autoflow,
        settings.unmatched_report_path()?,
    );
    job.run(&since)?;
    job.backfill_workdirs()?;
    job.backfill_users()?;

    // The sync job owns the cursor; advance it to the job start time so
    // rows created mid-run are picked up next time.
    settings.syn_lims_time = Some(started_at);
    settings.save(conf_path)?;
    Ok(())
}

/// `evapro cron`: forward pending projects for the current user.
pub fn run_forward(conf_path: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(conf_path)?;
    let annoeva = settings
        .annoeva
        .clone()
        .context("annoeva executable not configured")?;

    let pool = create_pool(&settings.db_path()?)?;
    run_migrations(&pool)?;
    let repo = AnaProjectRepository::new(pool);
    let monitor = AnnoevaCommand::new(annoeva);

    let job = ForwardJob::new(&repo, &monitor);
    job.run(&settings.resolved_user())?;
    Ok(())
}

/// Group-writable db so teammates sharing the directory can run jobs.
#[cfg(unix)]
fn fix_permissions(db_path: &Path) -> anyhow::Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    if let Some(dir) = db_path.parent() {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o775))
            .with_context(|| format!("cannot set permissions on {}", dir.display()))?;
    }
    fs::set_permissions(db_path, fs::Permissions::from_mode(0o664))
        .with_context(|| format!("cannot set permissions on {}", db_path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn fix_permissions(_db_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
