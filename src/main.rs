use anyhow::{Context, Result};
use clap::Parser;
use fisherprep::audio::Sph2Pipe;
use fisherprep::config::PrepareConfig;
use fisherprep::pipeline::{prepare_corpus, print_summary};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "fisherprep")]
#[command(version, about = "Prepare the Fisher corpus for speech recognition training")]
#[command(long_about = "Slice the Fisher English telephone speech corpus into per-utterance \
audio clips with cleaned transcripts and build the training list. Rerunning against an \
existing list verifies it instead, dropping records whose clip is missing or whose text \
is unusable.")]
struct Cli {
    /// Destination directory where prepared data is stored
    #[arg(long)]
    dst: Option<PathBuf>,

    /// Fisher corpus location
    #[arg(long)]
    fisher: Option<PathBuf>,

    /// Number of parallel workers for build mode
    #[arg(short, long)]
    process: Option<usize>,

    /// Path to the sph2pipe executable
    #[arg(long)]
    sph2pipe: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load and layer configuration: defaults, file, env, then CLI flags
    let mut config = PrepareConfig::load().context("Failed to load configuration")?;
    config.apply_cli(cli.dst, cli.fisher, cli.process, cli.sph2pipe);
    config.validate().context("Configuration validation failed")?;

    // Output tree; the text directory is created but left for other recipes
    for dir in [config.clips_dir(), config.text_dir(), config.lists_dir()] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    info!("Corpus:  {}", config.fisher.display());
    info!("Output:  {}", config.dst.display());
    info!("Workers: {}", config.processes);
    info!("Decoder: {}", config.sph2pipe.display());

    let decoder = Arc::new(Sph2Pipe::new(config.sph2pipe.clone()));
    let summary = prepare_corpus(&config, decoder)
        .await
        .context("Corpus preparation failed")?;

    print_summary(&summary);

    Ok(())
}
