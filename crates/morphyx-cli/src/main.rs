mod cli;
mod report;
mod stats;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use morphyx_common::MorphConfig;
use morphyx_ingestion::load_species;
use morphyx_ranker::{run_morph, MorphResult, TracingObserver};

use crate::cli::Args;

fn init_logging(output_dir: &Path, log_file: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("morphyx=info,warn"));

    let file_layer = if log_file {
        let path = output_dir.join("morph.log");
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

/// Load the inputs, rank every combination and write the reports.
fn run(args: &Args) -> anyhow::Result<Vec<MorphResult>> {
    let config = MorphConfig::load(&args.config, &args.run_config).with_context(|| {
        format!(
            "loading {} and {}",
            args.config.display(),
            args.run_config.display()
        )
    })?;
    info!(
        "Configuration loaded: {} species, {} bait groups, top_k={}, min_baits_present={}",
        config.species.len(),
        config.bait_group_count(),
        config.top_k,
        config.min_baits_present
    );

    let species = load_species(&config).context("loading species data")?;
    let observer = TracingObserver::new(config.ausr_window);
    let results = run_morph(&config.settings(), &species, &observer)?;

    let ranked = results.iter().filter(|r| !r.is_skipped()).count();
    info!("{} of {} combinations ranked", ranked, results.len());

    report::write_reports(&args.output, &results)?;
    Ok(results)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;
    init_logging(&args.output, !args.no_log_file)?;

    info!("morphyx {}", env!("CARGO_PKG_VERSION"));
    run(&args)?;
    Ok(())
}
