use super::*;

#[test]
fn voice_state_roundtrips_through_any_downcast() {
    let state = VoiceState::new(42u32);
    assert_eq!(state.0.downcast_ref::<u32>(), Some(&42));
}

#[test]
fn voice_source_path_and_name_are_distinguishable() {
    let a = VoiceSource::Path(PathBuf::from("/tmp/ref.wav"));
    let b = VoiceSource::Name("alba".to_string());
    assert_ne!(a, b);
}
