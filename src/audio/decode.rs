use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{FisherPrepError, Result};

use super::Channel;

/// Converts one channel of a SPHERE-container recording into a plain
/// waveform file.
///
/// Production use shells out to the LDC `sph2pipe` tool; tests substitute
/// an implementation that synthesizes audio directly.
pub trait Decoder: Send + Sync {
    /// Decode `channel` of `source` into a RIFF wave file at `output`.
    fn decode_channel(&self, source: &Path, output: &Path, channel: Channel) -> Result<()>;

    /// Verify the decoder is usable before any work is scheduled.
    fn check(&self) -> Result<()>;
}

/// The external `sph2pipe` executable.
pub struct Sph2Pipe {
    exe: PathBuf,
}

impl Sph2Pipe {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

impl Decoder for Sph2Pipe {
    fn decode_channel(&self, source: &Path, output: &Path, channel: Channel) -> Result<()> {
        debug!(
            "Decoding channel {} of {} to {}",
            channel,
            source.display(),
            output.display()
        );

        let result = Command::new(&self.exe)
            .arg("-c")
            .arg(channel.to_string())
            .args(["-p", "-f", "rif"])
            .arg(source)
            .arg(output)
            .output()
            .map_err(|e| {
                FisherPrepError::Decode(format!("failed to run {}: {e}", self.exe.display()))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(FisherPrepError::Decode(format!(
                "{} exited with {} for {}: {}",
                self.exe.display(),
                result.status,
                source.display(),
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn check(&self) -> Result<()> {
        if !self.exe.is_file() {
            return Err(FisherPrepError::Decode(format!(
                "sph2pipe not found at {}. Download it from the LDC and point --sph2pipe at it",
                self.exe.display()
            )));
        }
        debug!("Decoder available at {}", self.exe.display());
        Ok(())
    }
}
