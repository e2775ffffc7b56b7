use std::time::Duration;

use super::*;

#[tokio::test]
async fn missing_binary_reports_a_descriptive_error() {
    let err = run_playback_command(
        "definitely-not-a-real-playback-binary",
        &[],
        Duration::from_secs(5),
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AudioError::PlaybackBinaryMissing(_)));
}

#[tokio::test]
async fn timeout_kills_a_long_running_process() {
    let err = run_playback_command(
        "sleep",
        &["5".as_ref()],
        Duration::from_millis(50),
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AudioError::PlaybackTimedOut(_)));
}

#[tokio::test]
async fn non_zero_exit_is_ignored_when_must_succeed_is_false() {
    let outcome = run_playback_command("false", &[], Duration::from_secs(5), false)
        .await
        .unwrap();
    assert_eq!(outcome, PlaybackOutcome::NonZeroExitIgnored);
}

#[tokio::test]
async fn non_zero_exit_is_an_error_when_must_succeed_is_true() {
    let err = run_playback_command("false", &[], Duration::from_secs(5), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AudioError::PlaybackFailed(_)));
}
