use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::audio::{extract_clip, Channel, Decoder};
use crate::config::PrepareConfig;
use crate::error::{FisherPrepError, Result};
use crate::text::TranscriptFilter;
use crate::transcript::parse_transcript_file;

/// Everything a worker needs to process one conversation.
///
/// Shared read-only across workers; each worker writes only under paths keyed
/// by its own conversation's scenario and name.
pub struct ConversationContext {
    pub config: PrepareConfig,
    pub decoder: Arc<dyn Decoder>,
    pub filter: TranscriptFilter,
}

impl ConversationContext {
    pub fn new(config: PrepareConfig, decoder: Arc<dyn Decoder>) -> Self {
        Self {
            config,
            decoder,
            filter: TranscriptFilter::new(),
        }
    }
}

/// Removes intermediate channel WAVs when dropped, so no exit path leaks
/// scratch files next to the corpus audio.
struct ScratchGuard {
    files: Vec<PathBuf>,
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        for path in &self.files {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove scratch file {}: {e}", path.display());
                }
            }
        }
    }
}

/// Convert one conversation into per-utterance clips and manifest records.
///
/// Decodes both channels of the paired `.sph` next to the corpus audio,
/// parses the transcript, and writes one clip per utterance that passes the
/// transcript filter. Utterance indices are assigned before filtering, so
/// sample ids can skip numbers. Both intermediate channel WAVs are removed
/// whether the conversation succeeds or fails partway.
pub fn process_conversation(
    ctx: &ConversationContext,
    transcript_path: &Path,
) -> Result<Vec<String>> {
    let (scenario, name) = conversation_keys(transcript_path)?;

    let source_dir = ctx.config.fisher.join("audio").join(&scenario);
    let sph_file = source_dir.join(format!("{name}.sph"));
    let channel_wavs =
        Channel::BOTH.map(|ch| source_dir.join(format!("{}_c{}.wav", name, ch.number())));

    let _scratch = ScratchGuard {
        files: channel_wavs.to_vec(),
    };

    for (channel, wav_file) in Channel::BOTH.iter().zip(&channel_wavs) {
        ctx.decoder.decode_channel(&sph_file, wav_file, *channel)?;
    }

    let utterances = parse_transcript_file(transcript_path)?;
    let export_dir = ctx.config.clips_dir().join(&scenario);

    let mut lines = Vec::new();
    for (i, utterance) in utterances.iter().enumerate() {
        if !ctx.filter.is_valid(&utterance.text) {
            debug!("Skipping utterance {i} of {name}: unusable text {:?}", utterance.text);
            continue;
        }

        let source = match utterance.channel {
            Channel::A => &channel_wavs[0],
            Channel::B => &channel_wavs[1],
        };
        let line = extract_clip(
            source,
            utterance.start_ms,
            utterance.end_ms,
            &format!("{name}_{i}"),
            &export_dir,
            &utterance.text,
            ctx.config.max_clip_ms,
        )?;
        lines.push(line);
    }

    debug!(
        "Processed {name}: kept {} of {} utterances",
        lines.len(),
        utterances.len()
    );
    Ok(lines)
}

/// Derive the scenario (parent directory name) and conversation name (file
/// stem) that key a transcript's output paths.
fn conversation_keys(path: &Path) -> Result<(String, String)> {
    let scenario = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned());
    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned());

    match (scenario, name) {
        (Some(scenario), Some(name)) => Ok((scenario, name)),
        _ => Err(FisherPrepError::Transcript(format!(
            "cannot derive scenario and name from {}",
            path.display()
        ))),
    }
}
