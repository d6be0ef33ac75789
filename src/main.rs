//! Binary entrypoint for clipwall.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use clipwall::config::Configuration;
use clipwall::events::{CellUpdate, GridCommand, PoolEvent};
use clipwall::sampler::GridSampler;
use clipwall::tasks::manager::ManagerOptions;
use clipwall::tasks::{files, input, manager, presenter};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "clipwall", version, about = "video clip grid with pool-sampled reshuffles")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Override the grid size from the config
    #[arg(long, value_name = "CELLS")]
    grid_size: Option<usize>,

    /// Override the auto-shuffle period (ms)
    #[arg(long, value_name = "MILLIS")]
    tick_ms: Option<u64>,

    /// Deterministic RNG seed for pool shuffling
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Print the planned assignments for N refresh cycles and exit
    #[arg(long, value_name = "CYCLES")]
    dry_run: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("clipwall={}", level).parse().unwrap());
    fmt().with_env_filter(filter).with_target(false).compact().init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(cells) = cli.grid_size {
        cfg.grid_size = cells;
    }
    if let Some(ms) = cli.tick_ms {
        cfg.auto_shuffle_interval = Duration::from_millis(ms);
    }
    if cli.seed.is_some() {
        cfg.shuffle_seed = cli.seed;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;

    if let Some(cycles) = cli.dry_run {
        return run_dry_run(&cfg, cycles);
    }

    // Channels (small/bounded)
    let (pool_tx, pool_rx) = mpsc::channel::<PoolEvent>(8); // Files -> Manager
    let (cmd_tx, cmd_rx) = mpsc::channel::<GridCommand>(32); // Input -> Manager
    let (update_tx, update_rx) = mpsc::channel::<Vec<CellUpdate>>(16); // Manager -> Presenter

    let cancel = CancellationToken::new();

    // Ctrl-C cancels the pipeline
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();

    tasks.spawn({
        let cfg = cfg.clone();
        let pool_tx = pool_tx.clone();
        let cancel = cancel.clone();
        async move {
            files::run(cfg, pool_tx, cancel)
                .await
                .context("files task failed")
        }
    });

    tasks.spawn({
        let options = ManagerOptions {
            grid_size: cfg.grid_size,
            auto_shuffle_interval: cfg.auto_shuffle_interval,
            shuffle_seed: cfg.shuffle_seed,
        };
        let update_tx = update_tx.clone();
        let cancel = cancel.clone();
        async move {
            manager::run(pool_rx, cmd_rx, update_tx, cancel, options)
                .await
                .context("manager task failed")
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            presenter::run(update_rx, cancel)
                .await
                .context("presenter task failed")
        }
    });

    tasks.spawn({
        let cmd_tx = cmd_tx.clone();
        let cancel = cancel.clone();
        async move {
            input::run(cmd_tx, cancel)
                .await
                .context("input task failed")
        }
    });

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

fn run_dry_run(cfg: &Configuration, cycles: usize) -> Result<()> {
    let items = files::scan_library(cfg)?;

    println!(
        "# clipwall dry run\n# clips: {}\n# grid: {}\n# cycles: {}\n# seed: {}\n",
        items.len(),
        cfg.grid_size,
        cycles,
        cfg.shuffle_seed
            .map_or_else(|| "(random)".to_string(), |s| s.to_string())
    );

    if items.is_empty() {
        println!(
            "(no clips discovered under {})",
            cfg.clip_library_path.display()
        );
        return Ok(());
    }

    let mut sampler = GridSampler::new(cfg.grid_size, cfg.shuffle_seed);
    sampler.replace_pool(items);
    for cycle in 0..cycles {
        println!("# cycle {}:", cycle + 1);
        for update in sampler.refresh_grid(false) {
            match update.assignment {
                Some(assignment) => println!("  cell {:>2}: {}", update.cell, assignment.uri),
                None => println!("  cell {:>2}: (cleared)", update.cell),
            }
        }
    }

    Ok(())
}
