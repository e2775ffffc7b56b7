use clap::Parser;

use super::*;

#[test]
fn parses_speak_with_just_text() {
    let cli = Cli::try_parse_from(["tts", "speak", "hello there"]).unwrap();
    match cli.command {
        Commands::Speak {
            text,
            voice_path,
            voice_name,
        } => {
            assert_eq!(text, "hello there");
            assert_eq!(voice_path, None);
            assert_eq!(voice_name, None);
        }
        _ => panic!("expected Speak"),
    }
}

#[test]
fn parses_speak_with_voice_flags() {
    let cli = Cli::try_parse_from([
        "tts",
        "speak",
        "hello",
        "--voice-name",
        "alba",
        "--voice-path",
        "/tmp/clip.wav",
    ])
    .unwrap();
    match cli.command {
        Commands::Speak {
            voice_path,
            voice_name,
            ..
        } => {
            assert_eq!(voice_name.as_deref(), Some("alba"));
            assert_eq!(voice_path.as_deref(), Some("/tmp/clip.wav"));
        }
        _ => panic!("expected Speak"),
    }
}

#[test]
fn speak_requires_text_argument() {
    assert!(Cli::try_parse_from(["tts", "speak"]).is_err());
}

#[test]
fn parses_status_and_shutdown() {
    assert!(matches!(
        Cli::try_parse_from(["tts", "status"]).unwrap().command,
        Commands::Status
    ));
    assert!(matches!(
        Cli::try_parse_from(["tts", "shutdown"]).unwrap().command,
        Commands::Shutdown
    ));
}

#[test]
fn rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["tts", "sing"]).is_err());
}
