use tempfile::tempdir;

use super::*;

#[test]
fn write_then_read_recovers_approximately_the_same_samples() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.wav");
    let samples = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];

    write_wav(&path, &samples, 16_000).unwrap();
    let (read_back, sample_rate) = read_wav(&path).unwrap();

    assert_eq!(sample_rate, 16_000);
    assert_eq!(read_back.len(), samples.len());
    for (a, b) in samples.iter().zip(read_back.iter()) {
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
}

#[test]
fn out_of_range_samples_are_clamped_not_wrapped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clamped.wav");
    write_wav(&path, &[2.0, -2.0], 8_000).unwrap();

    let (samples, _) = read_wav(&path).unwrap();
    assert!(samples[0] > 0.9);
    assert!(samples[1] < -0.9);
}

#[test]
fn empty_sample_buffer_produces_a_valid_empty_wav() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.wav");
    write_wav(&path, &[], 22_050).unwrap();

    let (samples, sample_rate) = read_wav(&path).unwrap();
    assert!(samples.is_empty());
    assert_eq!(sample_rate, 22_050);
}
