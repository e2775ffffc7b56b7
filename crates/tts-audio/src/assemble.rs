// SPDX-License-Identifier: MIT

//! Audio segment assembly (`spec.md` §4.4): concatenate per-chunk
//! generation output along the time axis into one utterance, matching
//! `original_source/src/local_tts/service.py`'s `torch.cat(audio_segments,
//! dim=1)` step (after its 1-D-to-2-D `unsqueeze(0)` promotion, which here
//! is moot since every segment is already a flat mono sample vector).

use crate::error::AudioError;

/// Concatenate non-empty audio segments into a single sample vector.
/// Empty segments (a chunk that produced no audio) are skipped rather than
/// rejected, matching the original's per-chunk `try/except` that simply
/// omits a failed chunk from `audio_segments`.
///
/// Fails with [`AudioError::EmptyAssembly`] if every segment is empty —
/// there is nothing to play.
pub fn assemble(segments: Vec<Vec<f32>>) -> Result<Vec<f32>, AudioError> {
    let total_len: usize = segments.iter().map(Vec::len).sum();
    if total_len == 0 {
        return Err(AudioError::EmptyAssembly);
    }

    let mut out = Vec::with_capacity(total_len);
    for segment in segments {
        if !segment.is_empty() {
            out.extend(segment);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "assemble_tests.rs"]
mod tests;
