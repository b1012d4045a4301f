//! Project Idol Stage CLI
//!
//! Headless simulator for the site's view controller. Mounts a page layout
//! in the in-memory document and replays scripted signals against it.
//!
//! ## Usage
//!
//! ```bash
//! # Print the built-in page layout
//! idolstage layout > page.json
//!
//! # Print the default configuration
//! idolstage config
//!
//! # Mount a layout and show the element tree
//! idolstage inspect --layout page.json
//!
//! # Replay a script and print the final state
//! idolstage run --script steps.json --seed 7
//!
//! # Same, paced in wall-clock time, as JSON
//! idolstage run --script steps.json --realtime --json
//! ```

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use idolstage_core::{MemoryDom, PageLayout, Stage, StageConfig, StageReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::script::{Step, StepRecord};

/// Project Idol - headless stage simulator
#[derive(Parser)]
#[command(name = "idolstage")]
#[command(version = "0.1.0")]
#[command(about = "Project Idol - headless stage simulator")]
#[command(
    long_about = "Mounts the promotional site's view controller on an in-memory document and replays scroll, click, key and intersection signals against it."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the built-in page layout as JSON
    Layout,

    /// Print the default controller configuration as JSON
    Config,

    /// Mount a layout and print its element tree
    Inspect {
        /// Layout JSON file (default: built-in page)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Year written into the footer
        #[arg(long)]
        year: Option<i32>,

        /// Seed for particle placement
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Replay a signal script and report the resulting state
    Run {
        /// Script JSON file
        #[arg(short, long)]
        script: PathBuf,

        /// Layout JSON file (default: built-in page)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for particle placement
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Year written into the footer
        #[arg(long)]
        year: Option<i32>,

        /// Pace waits in wall-clock time
        #[arg(long)]
        realtime: bool,

        /// Run every pending continuation before reporting
        #[arg(long)]
        settle: bool,

        /// Print the run as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct RunOutput {
    steps: Vec<StepRecord>,
    report: StageReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = idolstage_core::logging::init(cli.verbose) {
        eprintln!("Logging already initialized: {}", e);
    }

    match cli.command {
        Commands::Layout => {
            println!("{}", serde_json::to_string_pretty(&PageLayout::promo())?);
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&StageConfig::default())?);
        }

        Commands::Inspect {
            layout,
            config,
            year,
            seed,
        } => {
            let stage = mount(layout.as_deref(), config.as_deref(), year, seed)?;
            print!("{}", stage.dom().outline());
        }

        Commands::Run {
            script,
            layout,
            config,
            seed,
            year,
            realtime,
            settle,
            json,
        } => {
            let steps = script::load(&script)?;
            let mut stage = mount(layout.as_deref(), config.as_deref(), year, seed)?;
            let records = replay(&mut stage, steps, realtime).await?;
            if settle {
                stage.settle();
            }
            let report = stage.report();

            if json {
                let output = RunOutput {
                    steps: records,
                    report,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_run(&records, &report);
            }
        }
    }

    Ok(())
}

fn mount(
    layout: Option<&Path>,
    config: Option<&Path>,
    year: Option<i32>,
    seed: u64,
) -> Result<Stage<MemoryDom>> {
    let layout = match layout {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read layout {}", path.display()))?;
            PageLayout::from_json(&raw)
                .with_context(|| format!("Invalid layout {}", path.display()))?
        }
        None => PageLayout::promo(),
    };
    let config = match config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            StageConfig::from_json(&raw)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => StageConfig::default(),
    };

    let year = year.unwrap_or_else(|| chrono::Local::now().year());
    let mut stage = Stage::new(layout.build(), config)?;
    let summary = stage.mount(year, &mut StdRng::seed_from_u64(seed));
    info!(?summary, seed, year, "Layout mounted");
    Ok(stage)
}

async fn replay(
    stage: &mut Stage<MemoryDom>,
    steps: Vec<Step>,
    realtime: bool,
) -> Result<Vec<StepRecord>> {
    let mut records = Vec::with_capacity(steps.len());

    for (index, step) in steps.into_iter().enumerate() {
        let outcome = match &step {
            Step::Wait { ms } => {
                script::wait(stage, std::time::Duration::from_millis(*ms), realtime).await;
                None
            }
            _ => {
                let signal = script::signal_for(stage, &step)
                    .with_context(|| format!("Step {} ({})", index + 1, step))?;
                signal.map(|signal| stage.dispatch(signal))
            }
        };
        debug!(index, %step, ?outcome, "Step replayed");
        records.push(StepRecord {
            step,
            at_ms: stage.now().as_millis(),
            outcome,
        });
    }

    Ok(records)
}

fn print_run(records: &[StepRecord], report: &StageReport) {
    for (i, record) in records.iter().enumerate() {
        match &record.outcome {
            Some(outcome) => println!(
                "{:>3}. [{:>5} ms] {} -> {} handler(s){}",
                i + 1,
                record.at_ms,
                record.step,
                outcome.handled,
                if outcome.prevent_default {
                    ", default prevented"
                } else {
                    ""
                }
            ),
            None => println!("{:>3}. [{:>5} ms] {}", i + 1, record.at_ms, record.step),
        }
    }

    println!();
    println!("Stage at {} ms:", report.now_ms);
    println!(
        "  Navbar: scrolled={} hidden={}",
        report.navbar.scrolled, report.navbar.hidden_by_direction
    );
    println!("  Filter: {} ({} visible)", report.active_filter, report.visible_items.len());
    println!("  Revealed sections: {}", report.revealed_sections);
    match &report.lightbox_source {
        Some(source) => println!("  Lightbox: {:?} ({})", report.lightbox, source),
        None => println!("  Lightbox: {:?}", report.lightbox),
    }
    println!("  Modal: {}", if report.modal_open { "open" } else { "closed" });
    println!("  Menu: {}", if report.menu_open { "open" } else { "closed" });
    println!(
        "  Scroll lock: {}",
        if report.scroll_locked { "locked" } else { "free" }
    );
    println!(
        "  Loader: {}",
        if report.loader_attached { "attached" } else { "removed" }
    );
    println!("  Pending timers: {}", report.pending_timers);
    println!("  Listeners: {}", report.listeners);
}
