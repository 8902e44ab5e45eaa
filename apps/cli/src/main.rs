//! evapro — sync analysis projects between the LIMS and a local tracking
//! database, and forward new ones to the annoeva monitor.

mod commands;
mod crontab;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::warn;

use evapro_core::settings::Settings;

#[derive(Parser)]
#[command(name = "evapro")]
#[command(about = "Sync LIMS analysis projects into a local tracking database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local database tables and fix permissions
    Init {
        /// Directory to store the database, syncproject.db
        #[arg(short = 'd', long)]
        syncdbdir: Option<PathBuf>,
    },
    /// Sync LIMS analysis projects into the all_ana_projects table
    Lims2evapro,
    /// Forward pending projects to the annoeva monitor
    Cron,
    /// Print the resolved config file path
    Conf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let conf_path = Settings::default_path();

    // Every command tries to self-register in the crontab; failure is not
    // fatal for the command itself.
    if let Err(e) = crontab::ensure_registered(&conf_path) {
        warn!("crontab registration skipped: {e}");
    }

    match cli.command {
        Commands::Init { syncdbdir } => commands::run_init(&conf_path, syncdbdir),
        Commands::Lims2evapro => commands::run_sync(&conf_path),
        Commands::Cron => commands::run_forward(&conf_path),
        Commands::Conf => {
            println!("{}", conf_path.display());
            Ok(())
        }
    }
}
