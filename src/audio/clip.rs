use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::error::{FisherPrepError, Result};

/// Slice a clip out of a decoded channel wave file, write it under
/// `output_dir`, and return the manifest record for the clip.
///
/// The slice covers `[start_ms, end_ms)`, capped at `max_clip_ms` and
/// clamped to the end of the source; an out-of-range slice yields an empty
/// clip rather than an error. Multi-channel sources are downmixed to mono.
/// The clip is written as `<output_name>.wav`, 16-bit PCM at the source
/// sample rate, and the returned record carries the duration of the audio
/// actually written:
///
/// ```text
/// <output_name> <clip_path> <duration_ms> <text>
/// ```
pub fn extract_clip(
    source: &Path,
    start_ms: f64,
    end_ms: f64,
    output_name: &str,
    output_dir: &Path,
    text: &str,
    max_clip_ms: u64,
) -> Result<String> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        FisherPrepError::ClipExtraction(format!("failed to create {}: {e}", output_dir.display()))
    })?;

    let mut reader = WavReader::open(source).map_err(|e| {
        FisherPrepError::ClipExtraction(format!("failed to open {}: {e}", source.display()))
    })?;
    let spec = reader.spec();
    let rate = spec.sample_rate;
    let total_frames = u64::from(reader.duration());

    let start_ms = start_ms.max(0.0);
    let clip_ms = (end_ms - start_ms).max(0.0).min(max_clip_ms as f64);
    let start_frame = ms_to_frames(start_ms, rate).min(total_frames);
    let len_frames = ms_to_frames(clip_ms, rate).min(total_frames - start_frame);

    let samples = read_mono_frames(&mut reader, start_frame, len_frames, source)?;

    let out_path = output_dir.join(format!("{output_name}.wav"));
    let out_spec = WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&out_path, out_spec).map_err(|e| {
        FisherPrepError::ClipExtraction(format!("failed to create {}: {e}", out_path.display()))
    })?;
    for &sample in &samples {
        writer.write_sample(sample).map_err(|e| {
            FisherPrepError::ClipExtraction(format!("failed to write {}: {e}", out_path.display()))
        })?;
    }
    writer.finalize().map_err(|e| {
        FisherPrepError::ClipExtraction(format!("failed to finalize {}: {e}", out_path.display()))
    })?;

    let duration_ms = frames_to_ms(samples.len() as u64, rate);
    debug!("Wrote clip {} ({duration_ms} ms)", out_path.display());

    Ok(format!(
        "{output_name} {} {duration_ms} {text}",
        out_path.display()
    ))
}

/// Read `len_frames` mono frames starting at `start_frame`, converting
/// float samples and averaging interleaved channels as needed.
fn read_mono_frames<R: std::io::Read>(
    reader: &mut WavReader<R>,
    start_frame: u64,
    len_frames: u64,
    source: &Path,
) -> Result<Vec<i16>> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let skip = start_frame as usize * channels;
    let take = len_frames as usize * channels;

    let bad_sample = |e: hound::Error| {
        FisherPrepError::ClipExtraction(format!("failed to read {}: {e}", source.display()))
    };

    let interleaved: Vec<i16> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i16>()
            .skip(skip)
            .take(take)
            .collect::<std::result::Result<_, _>>()
            .map_err(bad_sample)?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .skip(skip)
            .take(take)
            .map(|s| s.map(|v| (v * i16::MAX as f32) as i16))
            .collect::<std::result::Result<_, _>>()
            .map_err(bad_sample)?,
    };

    if channels <= 1 {
        return Ok(interleaved);
    }

    Ok(interleaved
        .chunks(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect())
}

fn ms_to_frames(ms: f64, rate: u32) -> u64 {
    (ms / 1000.0 * f64::from(rate)).round() as u64
}

fn frames_to_ms(frames: u64, rate: u32) -> u64 {
    (frames as f64 * 1000.0 / f64::from(rate)).round() as u64
}
