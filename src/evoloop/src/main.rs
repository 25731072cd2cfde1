//! evoloop: variant allocation and statistics engine for A/B/n site
//! experiments.
//!
//! Runs the engine over a JSON snapshot exported by the platform and prints
//! the result as JSON on stdout. Logs go to stderr.

mod snapshot;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use evoloop_core::config::{AppConfig, LoggingConfig};
use evoloop_engine::AllocationEngine;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::snapshot::Snapshot;

#[derive(Parser, Debug)]
#[command(name = "evoloop")]
#[command(about = "Thompson-sampling variant allocation and statistics engine")]
#[command(version)]
struct Cli {
    /// Snapshot file with sites, variants, stats and events
    #[arg(short, long, global = true, env = "EVOLOOP_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Optional config file (TOML); environment variables still apply
    #[arg(long, global = true, env = "EVOLOOP_CONFIG")]
    config: Option<String>,

    /// Monte-Carlo simulations per prob-best estimate (overrides config)
    #[arg(long, global = true, env = "EVOLOOP__ENGINE__NUM_SIMULATIONS")]
    simulations: Option<usize>,

    /// Worker threads for prob-best estimation (overrides config)
    #[arg(long, global = true, env = "EVOLOOP__ENGINE__WORKERS")]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Route one visitor to a variant of a running site
    Assign {
        #[arg(long)]
        site: Uuid,
        #[arg(long)]
        visitor: String,
    },

    /// Rebuild stats from events for one site, or every running site
    Recompute {
        #[arg(long)]
        site: Option<Uuid>,
    },

    /// Per-variant stats report for a site
    Report {
        #[arg(long)]
        site: Uuid,
    },

    /// Probability that each active variant is the best
    ProbBest {
        #[arg(long)]
        site: Uuid,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let snapshot_path = cli
        .snapshot
        .clone()
        .context("a snapshot file is required (--snapshot or EVOLOOP_SNAPSHOT)")?;

    // Load configuration
    let (mut config, load_error) = match cli.config.as_deref() {
        Some(path) => (
            AppConfig::load_from(Some(path))
                .with_context(|| format!("failed to load config from {path}"))?,
            None,
        ),
        None => match AppConfig::load() {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(e)),
        },
    };

    init_tracing(&config.logging);
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Apply CLI overrides
    if let Some(n) = cli.simulations {
        config.engine.num_simulations = n;
    }
    if let Some(n) = cli.workers {
        config.engine.workers = n;
    }

    info!(
        snapshot = %snapshot_path.display(),
        num_simulations = config.engine.num_simulations,
        parallel = config.engine.parallel,
        "Configuration loaded"
    );

    let snapshot = Snapshot::load(&snapshot_path)
        .with_context(|| format!("failed to read snapshot {}", snapshot_path.display()))?;
    let engine = AllocationEngine::new(config.engine.clone());

    match cli.command {
        Commands::Assign { site, visitor } => {
            let site = snapshot.site(site)?;
            let stats = snapshot.current_stats();
            let assignment = engine.assign(site, &snapshot.variants, &stats, &visitor)?;
            print_json(&assignment)?;
        }
        Commands::Recompute { site: Some(site) } => {
            snapshot.site(site)?;
            let outcome = engine.recompute_site(site, &snapshot.variants, &snapshot.events)?;
            print_json(&outcome)?;
        }
        Commands::Recompute { site: None } => {
            let results =
                engine.recompute_all(&snapshot.sites, &snapshot.variants, &snapshot.events);
            print_json(&serde_json::json!({
                "sites_updated": results.len(),
                "results": results,
            }))?;
        }
        Commands::Report { site } => {
            snapshot.site(site)?;
            let stats = snapshot.current_stats();
            let report = engine.site_report(site, &snapshot.variants, &stats)?;
            print_json(&report)?;
        }
        Commands::ProbBest { site } => {
            snapshot.site(site)?;
            let stats = snapshot.current_stats();
            let probs = engine.prob_best(site, &snapshot.variants, &stats)?;
            print_json(&probs)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const SITE: &str = "6f1c1f7e-2d3b-4a57-9a50-0f6c1b2a9d11";

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "evoloop",
            "prob-best",
            "--snapshot",
            "f.json",
            "--site",
            SITE,
            "--simulations",
            "500",
        ])
        .unwrap();
        assert_eq!(cli.snapshot, Some(PathBuf::from("f.json")));
        assert_eq!(cli.simulations, Some(500));
        assert!(matches!(cli.command, Commands::ProbBest { site } if site.to_string() == SITE));
    }

    #[test]
    fn test_flags_before_subcommand() {
        let cli = Cli::try_parse_from([
            "evoloop",
            "--snapshot",
            "f.json",
            "--config",
            "evoloop.toml",
            "assign",
            "--site",
            SITE,
            "--visitor",
            "v1",
        ])
        .unwrap();
        assert_eq!(cli.snapshot, Some(PathBuf::from("f.json")));
        assert_eq!(cli.config.as_deref(), Some("evoloop.toml"));
        assert!(matches!(cli.command, Commands::Assign { ref visitor, .. } if visitor == "v1"));
    }

    #[test]
    fn test_recompute_site_is_optional() {
        let cli = Cli::try_parse_from(["evoloop", "recompute", "--snapshot", "f.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Recompute { site: None }));

        let cli = Cli::try_parse_from([
            "evoloop", "report", "-s", "f.json", "--site", SITE, "--workers", "2",
        ])
        .unwrap();
        assert_eq!(cli.workers, Some(2));
        assert!(matches!(cli.command, Commands::Report { .. }));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["evoloop", "serve", "--snapshot", "f.json"]).is_err());
    }
}
