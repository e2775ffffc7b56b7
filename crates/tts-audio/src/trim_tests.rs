use tempfile::tempdir;

use super::*;
use crate::wav::write_wav;

fn silence(seconds: f64, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (seconds * sample_rate as f64) as usize]
}

#[test]
fn short_clip_passes_through_unchanged() {
    let dir = tempdir().unwrap();
    let clip = dir.path().join("short.wav");
    write_wav(&clip, &silence(2.0, 16_000), 16_000).unwrap();

    let result = trim_voice_clip(&clip, dir.path()).unwrap();
    assert_eq!(result, clip);
}

#[test]
fn long_clip_is_trimmed_to_ten_seconds() {
    let dir = tempdir().unwrap();
    let clip = dir.path().join("long.wav");
    write_wav(&clip, &silence(15.0, 16_000), 16_000).unwrap();

    let result = trim_voice_clip(&clip, dir.path()).unwrap();
    assert_ne!(result, clip);

    let (samples, sample_rate) = crate::wav::read_wav(&result).unwrap();
    let duration = samples.len() as f64 / sample_rate as f64;
    assert!(duration <= 10.01, "trimmed clip is {duration}s");
}

#[test]
fn missing_file_passes_through_unchanged() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.wav");
    let result = trim_voice_clip(&missing, dir.path()).unwrap();
    assert_eq!(result, missing);
}
