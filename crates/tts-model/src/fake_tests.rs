use std::path::PathBuf;

use super::*;

#[test]
fn state_for_voice_records_the_call() {
    let model = FakeTtsModel::new();
    let voice = VoiceSource::Name("alba".to_string());
    model.state_for_voice(&voice).unwrap();

    assert_eq!(
        model.calls(),
        vec![FakeCall::StateForVoice(VoiceSourceRecord::Name(
            "alba".to_string()
        ))]
    );
}

#[test]
fn generate_length_scales_with_text_length() {
    let model = FakeTtsModel::new();
    let state = model
        .state_for_voice(&VoiceSource::Name("alba".to_string()))
        .unwrap();

    let short = model.generate(&state, "hi").unwrap();
    let long = model.generate(&state, "a much longer sentence").unwrap();
    assert!(long.len() > short.len());
}

#[test]
fn fail_state_for_targets_a_specific_name() {
    let model = FakeTtsModel::new();
    model.fail_state_for("alba");

    let err = model
        .state_for_voice(&VoiceSource::Name("alba".to_string()))
        .unwrap_err();
    assert!(matches!(err, ModelError::VoiceLoadFailed(_)));

    model
        .state_for_voice(&VoiceSource::Name("marius".to_string()))
        .expect("other voices are unaffected");
}

#[test]
fn fail_generate_toggle() {
    let model = FakeTtsModel::new();
    let state = model
        .state_for_voice(&VoiceSource::Path(PathBuf::from("/tmp/ref.wav")))
        .unwrap();

    model.fail_generate(true);
    assert!(model.generate(&state, "hello").is_err());

    model.fail_generate(false);
    assert!(model.generate(&state, "hello").is_ok());
}
