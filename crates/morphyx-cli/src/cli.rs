use std::path::PathBuf;

use clap::Parser;

/// Rank candidate genes of a pathway by co-expression with its known genes.
///
/// For example:
///
///     morphyx --config config.yaml --run-config run_config.yaml --output output
#[derive(Debug, Parser)]
#[command(name = "morphyx", version, verbatim_doc_comment)]
pub struct Args {
    /// Configuration YAML file: species, expression matrices, clusterings.
    #[arg(long = "config")]
    pub config: PathBuf,

    /// Run config YAML file: bait groups and top_k. Its top-level keys
    /// override those of --config.
    #[arg(long = "run-config")]
    pub run_config: PathBuf,

    /// Output directory; created if missing.
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,

    /// Do not mirror the log to <output>/morph.log.
    #[arg(long)]
    pub no_log_file: bool,
}
