use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::audio::Decoder;
use crate::config::PrepareConfig;
use crate::conversation::{process_conversation, ConversationContext};
use crate::error::{FisherPrepError, Result};
use crate::manifest::{verify_manifest, write_manifest};
use crate::text::TranscriptFilter;

/// Which pass a corpus run performed. Selected solely by train-list
/// existence: absent means build, present means verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareMode {
    Build,
    Verify,
}

impl std::fmt::Display for PrepareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrepareMode::Build => write!(f, "build"),
            PrepareMode::Verify => write!(f, "verify"),
        }
    }
}

/// Statistics from a corpus run.
#[derive(Debug, Clone)]
pub struct PrepareSummary {
    /// Pass that ran.
    pub mode: PrepareMode,
    /// The train list the run produced or repaired.
    pub list_path: PathBuf,
    /// Conversations processed; zero for a verify run.
    pub conversations: usize,
    /// Records in the list when the run finished.
    pub records: usize,
    /// Records a verify run dropped.
    pub dropped: usize,
    /// Wall-clock time for the whole run.
    pub total_time: Duration,
}

/// Find every conversation transcript under `<fisher>/trans`.
///
/// Transcripts sit exactly two levels below the trans root
/// (`trans/<scenario>/<name>.txt`). Results are sorted so the train list
/// comes out in the same order on every build.
pub fn discover_transcripts(fisher: &Path) -> Result<Vec<PathBuf>> {
    let trans_dir = fisher.join("trans");
    if !trans_dir.is_dir() {
        return Err(FisherPrepError::FileNotFound(
            trans_dir.display().to_string(),
        ));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(&trans_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    debug!(
        "Found {} transcripts under {}",
        files.len(),
        trans_dir.display()
    );
    Ok(files)
}

/// Prepare the corpus: build the train list, or verify it when it already
/// exists.
///
/// The train list is the only mode selector. A build never runs over a
/// present list, even if the corpus changed since the list was written;
/// delete the list to force a rebuild.
pub async fn prepare_corpus(
    config: &PrepareConfig,
    decoder: Arc<dyn Decoder>,
) -> Result<PrepareSummary> {
    prepare_corpus_with_progress(config, decoder, true).await
}

/// [`prepare_corpus`] with the progress bar switchable, for tests.
pub async fn prepare_corpus_with_progress(
    config: &PrepareConfig,
    decoder: Arc<dyn Decoder>,
    show_progress: bool,
) -> Result<PrepareSummary> {
    let list_path = config.train_list_path();
    if list_path.exists() {
        info!("{} exists, running a verify pass", list_path.display());
        verify_corpus(config)
    } else {
        build_corpus(config, decoder, show_progress).await
    }
}

/// Build mode: decode, slice, and list every conversation in the corpus.
///
/// Conversations are fanned out across a bounded pool of blocking workers.
/// Results are re-sorted by submission index before the single-pass list
/// write, so completion order never shows in the output. The first worker
/// failure aborts the whole build and the train list is not written.
async fn build_corpus(
    config: &PrepareConfig,
    decoder: Arc<dyn Decoder>,
    show_progress: bool,
) -> Result<PrepareSummary> {
    let start_time = Instant::now();
    let list_path = config.train_list_path();

    decoder.check()?;

    let files = discover_transcripts(&config.fisher)?;
    let total = files.len();
    info!(
        "Building {} from {} conversations with {} workers",
        list_path.display(),
        total,
        config.processes
    );

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} conversations ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Semaphore bounds the pool; each conversation is one blocking task.
    let ctx = Arc::new(ConversationContext::new(config.clone(), decoder));
    let semaphore = Arc::new(Semaphore::new(config.processes));
    let mut futures = FuturesUnordered::new();

    for (index, file) in files.into_iter().enumerate() {
        let sem = semaphore.clone();
        let ctx = ctx.clone();
        let pb = progress_bar.clone();

        futures.push(async move {
            let _permit = sem.acquire().await.expect("Semaphore closed");

            debug!("Starting conversation {} ({})", index, file.display());
            let result =
                tokio::task::spawn_blocking(move || process_conversation(&ctx, &file)).await;

            if let Some(ref pb) = pb {
                pb.inc(1);
            }

            (index, result)
        });
    }

    let mut results: Vec<(usize, Vec<String>)> = Vec::with_capacity(total);
    while let Some((index, joined)) = futures.next().await {
        let result = joined
            .map_err(|e| {
                FisherPrepError::Io(std::io::Error::other(format!(
                    "conversation worker panicked: {e}"
                )))
            })
            .and_then(|r| r);
        match result {
            Ok(lines) => results.push((index, lines)),
            Err(e) => {
                if let Some(ref pb) = progress_bar {
                    pb.abandon();
                }
                return Err(e);
            }
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Conversion complete");
    }

    // Submission order, not completion order.
    results.sort_by_key(|r| r.0);
    let lines: Vec<String> = results.into_iter().flat_map(|(_, lines)| lines).collect();

    write_manifest(&list_path, &lines)?;
    info!("Wrote {} records to {}", lines.len(), list_path.display());

    Ok(PrepareSummary {
        mode: PrepareMode::Build,
        list_path,
        conversations: total,
        records: lines.len(),
        dropped: 0,
        total_time: start_time.elapsed(),
    })
}

/// Verify mode: sequential re-check of the existing train list.
fn verify_corpus(config: &PrepareConfig) -> Result<PrepareSummary> {
    let start_time = Instant::now();
    let list_path = config.train_list_path();
    let filter = TranscriptFilter::new();

    let stats = verify_manifest(&list_path, &filter)?;

    Ok(PrepareSummary {
        mode: PrepareMode::Verify,
        list_path,
        conversations: 0,
        records: stats.kept,
        dropped: stats.dropped,
        total_time: start_time.elapsed(),
    })
}

/// Print a summary of the corpus run.
pub fn print_summary(summary: &PrepareSummary) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                  Fisher Preparation Complete                  ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  List:    {}", summary.list_path.display());
    println!("  Mode:    {}", summary.mode);
    match summary.mode {
        PrepareMode::Build => {
            println!("  Conversations: {}", summary.conversations);
            println!("  Records:       {}", summary.records);
        }
        PrepareMode::Verify => {
            println!("  Kept:    {}", summary.records);
            println!("  Dropped: {}", summary.dropped);
        }
    }
    println!();
    println!("  Total:   {:.2}s", summary.total_time.as_secs_f64());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
