// SPDX-License-Identifier: MIT

//! WAV encode/decode (`spec.md` §1: "WAV encoding" is the one piece of the
//! audio path narrow enough to fully specify). Mono 16-bit PCM, matching
//! the format `original_source/src/local_tts/service.py` writes via
//! `scipy.io.wavfile.write` for generated speech.

use std::path::Path;

use crate::error::AudioError;

/// Write mono `samples` (in `[-1.0, 1.0]`) as 16-bit PCM WAV at `sample_rate`.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file back into mono `f32` samples in `[-1.0, 1.0]` plus its
/// sample rate. Multi-channel files are averaged down to mono.
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample.min(32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    };

    if channels <= 1 {
        return Ok((samples, spec.sample_rate));
    }

    let mono = samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

#[cfg(test)]
#[path = "wav_tests.rs"]
mod tests;
