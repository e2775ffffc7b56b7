// SPDX-License-Identifier: MIT

//! Voice-clip trimming (`spec.md` §4.4's reference-clip preparation step),
//! a direct port of `original_source/src/local_tts/service.py::prepare_voice_file`:
//! clips longer than 10 seconds are truncated to the first 10 seconds and
//! written to a temporary WAV file; shorter clips pass through untouched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AudioError;

/// Reference clips longer than this are truncated before use.
pub const MAX_VOICE_CLIP_DURATION: Duration = Duration::from_secs(10);

/// Prepare a reference voice clip: if it's longer than
/// [`MAX_VOICE_CLIP_DURATION`], write a truncated copy to `scratch_dir` and
/// return its path; otherwise return `voice_path` unchanged.
///
/// Matches the Python original's behavior of silently returning the
/// original path on any read error (missing file, corrupt header) rather
/// than failing the request — voice loading is attempted downstream with
/// whatever path comes back.
pub fn trim_voice_clip(voice_path: &Path, scratch_dir: &Path) -> Result<PathBuf, AudioError> {
    if !voice_path.exists() {
        return Ok(voice_path.to_path_buf());
    }

    let reader = match hound::WavReader::open(voice_path) {
        Ok(r) => r,
        Err(_) => return Ok(voice_path.to_path_buf()),
    };

    let spec = reader.spec();
    let total_samples = reader.duration() as u64;
    let sample_rate = spec.sample_rate as u64;
    if sample_rate == 0 {
        return Ok(voice_path.to_path_buf());
    }

    let duration = Duration::from_secs_f64(total_samples as f64 / sample_rate as f64);
    if duration <= MAX_VOICE_CLIP_DURATION {
        return Ok(voice_path.to_path_buf());
    }

    let max_frames = (MAX_VOICE_CLIP_DURATION.as_secs_f64() * sample_rate as f64) as u32;
    let trimmed_path = scratch_dir.join(format!(
        "trimmed-{}.wav",
        voice_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("voice")
    ));

    write_trimmed(voice_path, &trimmed_path, max_frames)?;
    Ok(trimmed_path)
}

fn write_trimmed(src: &Path, dst: &Path, max_frames: u32) -> Result<(), AudioError> {
    let mut reader = hound::WavReader::open(src)?;
    let spec = reader.spec();
    let mut writer = hound::WavWriter::create(dst, spec)?;

    let channels = spec.channels.max(1) as u32;
    let max_samples = max_frames.saturating_mul(channels);

    match spec.sample_format {
        hound::SampleFormat::Int => {
            for sample in reader.samples::<i32>().take(max_samples as usize) {
                writer.write_sample(sample?)?;
            }
        }
        hound::SampleFormat::Float => {
            for sample in reader.samples::<f32>().take(max_samples as usize) {
                writer.write_sample(sample?)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
#[path = "trim_tests.rs"]
mod tests;
