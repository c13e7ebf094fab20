use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::text::TranscriptFilter;

/// One line of the train list: three positional params (sample id, clip
/// path, clip duration) followed by the free-text transcript.
///
/// The duration is kept as written; a verify pass re-checks records, it does
/// not reinterpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub sample_id: String,
    pub clip_path: PathBuf,
    pub duration: String,
    pub text: String,
}

impl ManifestRecord {
    /// Parse a list line. `None` when the three leading params are missing;
    /// such lines cannot name a clip and are beyond repair.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return None;
        }
        Some(Self {
            sample_id: fields[0].to_string(),
            clip_path: PathBuf::from(fields[1]),
            duration: fields[2].to_string(),
            text: fields[3..].join(" "),
        })
    }

    /// Render back to a list line, single-spaced.
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.sample_id,
            self.clip_path.display(),
            self.duration,
            self.text
        )
    }
}

/// Outcome of a verify pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyStats {
    pub kept: usize,
    pub dropped: usize,
}

/// Re-check an existing train list and rewrite it with only the records
/// that still hold: the clip exists on disk and the text is usable as a
/// training label. Dropped records are reported on stdout. Running the pass
/// twice drops nothing the second time.
pub fn verify_manifest(list_path: &Path, filter: &TranscriptFilter) -> Result<VerifyStats> {
    let content = std::fs::read_to_string(list_path)?;

    let mut kept_lines = Vec::new();
    let mut dropped = 0;
    for line in content.lines() {
        match ManifestRecord::parse(line) {
            Some(record) if record.clip_path.exists() && filter.is_valid(&record.text) => {
                kept_lines.push(record.to_line());
            }
            Some(record) => {
                println!(
                    "{} does not exist or text is invalid, text: {}",
                    record.clip_path.display(),
                    record.text
                );
                dropped += 1;
            }
            None => {
                println!("dropping malformed list line: {line}");
                dropped += 1;
            }
        }
    }

    write_manifest(list_path, &kept_lines)?;
    info!(
        "Verified {}: {} kept, {} dropped",
        list_path.display(),
        kept_lines.len(),
        dropped
    );

    Ok(VerifyStats {
        kept: kept_lines.len(),
        dropped,
    })
}

/// Write the train list in one pass, replacing any previous content.
pub fn write_manifest(path: &Path, lines: &[String]) -> Result<()> {
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}
