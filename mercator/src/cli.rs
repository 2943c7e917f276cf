use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Builds a multi-genome synteny/orthology map from pairwise anchor hits.
#[derive(Debug, Parser)]
#[command(name = "mercator", version, about)]
pub struct Args {
    /// Directory containing `<genome>.chroms`, `<genome>.anchors` and
    /// `<g1>-<g2>.hits` files.
    #[arg(long)]
    pub indir: PathBuf,

    /// Directory the map and auxiliary outputs are written to.
    #[arg(long)]
    pub outdir: PathBuf,

    /// Genome names, in the order their input files should be read. Draft
    /// genomes named with `--draft` are moved to the end regardless of
    /// position here.
    pub genomes: Vec<String>,

    /// Mark a genome (by name) as a draft assembly; repeatable.
    #[arg(long = "draft")]
    pub draft_genomes: Vec<String>,

    #[arg(long, default_value_t = 2)]
    pub repeat_num: usize,

    #[arg(long, default_value_t = 0.90)]
    pub repeat_pct: f64,

    #[arg(long, default_value_t = 1.0)]
    pub max_eval: f64,

    #[arg(long, default_value_t = 0.80)]
    pub prune_pct: f64,

    #[arg(long, default_value_t = 300_000)]
    pub join_distance: u64,

    #[arg(long, default_value_t = 2)]
    pub min_run_length: usize,

    #[arg(long, default_value_t = 100)]
    pub padding: u64,

    /// Use the alternative pipeline: join a pre-existing pairwise hits
    /// file instead of discovering cliques from raw hits.
    #[arg(long)]
    pub pairwisehits: Option<PathBuf>,

    /// Dump intermediate edge and run state to the output directory.
    #[arg(long)]
    pub output_hits: bool,
    #[arg(long)]
    pub output_runs: bool,

    /// Suppress progress messages on the diagnostic stream.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] mercator_core::CoreError),

    #[error(transparent)]
    Io(#[from] mercator_io::IoError),

    #[error("{0}")]
    Config(String),
}
