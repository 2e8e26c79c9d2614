//! mfa - mutual fund disclosure analysis pipeline.
//!
//! Fetches fund disclosures, runs the configured analyses, and persists
//! dated JSON reports. `mfa serve` exposes those reports over HTTP.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use mfa_analysis::orchestrator::AnalysisOrchestrator;
use mfa_analysis::routes::{self, DashboardState};
use mfa_analysis::storage::{JsonStore, ReportPaths};
use mfa_common::logging::init_logging;
use mfa_common::MfaConfig;

#[derive(Parser, Debug)]
#[command(name = "mfa")]
#[command(version)]
#[command(about = "Mutual fund disclosure analysis pipeline", long_about = None)]
struct Cli {
    /// Configuration file (default: config/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override logging.level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override logging.format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one analysis, or every enabled analysis
    Analyze {
        /// Analysis id from the config; omit to run all enabled analyses
        analysis_id: Option<String>,

        /// Run date as YYYYMMDD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List the configured analyses
    List,

    /// Show which reports exist for a run date
    Status {
        /// Run date as YYYYMMDD (default: most recent run)
        #[arg(long)]
        date: Option<String>,
    },

    /// Serve the persisted reports over HTTP
    Serve {
        /// Listen address (default: server.listen_addr from the config)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = MfaConfig::load_with_env(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate()?;

    init_logging(&config.logging.level, &config.logging.format);
    tracing::info!("MFA pipeline v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze { analysis_id, date } => {
            analyze(config, analysis_id.as_deref(), date.as_deref()).await
        }
        Commands::List => list(&config),
        Commands::Status { date } => status(&config, date.as_deref()),
        Commands::Serve { addr } => serve(config, addr).await,
    }
}

async fn analyze(config: MfaConfig, analysis_id: Option<&str>, date: Option<&str>) -> Result<()> {
    let orchestrator = AnalysisOrchestrator::new(Arc::new(config));

    // Ctrl-C lets the in-flight category finish, then stops the run.
    let shutdown = orchestrator.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Shutdown requested, finishing the current category");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    let report = orchestrator.run(analysis_id, date).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn list(config: &MfaConfig) -> Result<()> {
    if config.analyses.is_empty() {
        println!("No analyses configured.");
        return Ok(());
    }

    for (id, analysis) in &config.analyses {
        let state = if analysis.enabled { "enabled" } else { "disabled" };
        println!(
            "{:<24} {:<10} type={} strategy={}",
            id,
            state,
            analysis.kind,
            analysis.data_requirements.scraping_strategy
        );
    }
    Ok(())
}

fn status(config: &MfaConfig, date: Option<&str>) -> Result<()> {
    let paths = ReportPaths::new(&config.paths.analysis_dir);

    let date = match date {
        Some(d) => d.to_string(),
        None => match JsonStore::list_date_dirs(paths.root())?.pop() {
            Some(d) => d,
            None => {
                println!("No runs found under {}", paths.root().display());
                return Ok(());
            }
        },
    };

    let date_dir = paths.date_dir(&date);
    let mut found = false;

    for analysis in JsonStore::list_subdirs(&date_dir)? {
        found = true;
        let categories = JsonStore::list_json_stems(&date_dir.join(&analysis))?;
        println!("{}/{}: {} categories", date, analysis, categories.len());
        for category in categories {
            println!("  {}", category);
        }
    }
    for analysis in JsonStore::list_json_stems(&date_dir)? {
        found = true;
        println!("{}/{}", date, analysis);
    }

    if !found {
        println!("No reports for {}", date);
    }
    Ok(())
}

async fn serve(config: MfaConfig, addr: Option<String>) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.server.listen_addr.clone());
    let state = Arc::new(DashboardState::new(&config));
    routes::serve(&addr, state).await?;
    Ok(())
}
