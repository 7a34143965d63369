use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cnv_frequencies::{InputFiles, Pipeline, PipelineConfig, DEFAULT_MIN_SAMPLES};

/// Compute gene-level CNV alteration frequencies per cancer group and cohort
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// histologies file
    histology_file: PathBuf,

    /// consensus CNV calls, optionally gzip compressed
    cnv_consensus_file: PathBuf,

    /// independent primary tumor samples across all cohorts
    all_cohorts_primary_tumors: PathBuf,

    /// independent relapse tumor samples across all cohorts
    all_cohorts_relapse_tumors: PathBuf,

    /// independent primary tumor samples within each cohort
    each_cohort_primary_tumors: PathBuf,

    /// independent relapse tumor samples within each cohort
    each_cohort_relapse_tumors: PathBuf,

    /// output directory
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// path to the annotator R CLI
    #[arg(long, value_name = "SCRIPT")]
    annotator_script: Option<PathBuf>,

    /// strata need more than this number of samples to be reported
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLES)]
    min_samples: usize,

    /// threads number, defaults to all cores
    #[arg(short, long)]
    threads: Option<usize>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    let start = std::time::Instant::now();
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to set up the thread pool")?;
    }

    info!("{:?}", cli);

    let inputs = InputFiles::new(
        cli.histology_file,
        cli.cnv_consensus_file,
        cli.all_cohorts_primary_tumors,
        cli.all_cohorts_relapse_tumors,
        cli.each_cohort_primary_tumors,
        cli.each_cohort_relapse_tumors,
    );

    let mut config = PipelineConfig::default()
        .with_results_dir(cli.results_dir)
        .with_min_samples(cli.min_samples);
    if let Some(script) = cli.annotator_script {
        config = config.with_annotator_script(script);
    }

    let rows = Pipeline::new(config)
        .run(&inputs)
        .context("computing CNV frequencies failed")?;

    info!(
        "{} frequency rows, elapsed time: {:.2?}",
        rows.len(),
        start.elapsed()
    );
    Ok(())
}
