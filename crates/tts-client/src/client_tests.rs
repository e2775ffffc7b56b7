use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use tempfile::tempdir;
use tokio::net::UnixListener;

use tts_daemon::{protocol, Endpoint, ErrorResponse, GenerateResponse, ShutdownResponse, StatusResponse};

use super::*;

fn set_socket_env(path: &std::path::Path) {
    std::env::set_var("LOCAL_TTS_SOCKET_PATH", path);
    std::env::remove_var("LOCAL_TTS_STATE_DIR");
}

async fn fake_daemon(socket_path: PathBuf) {
    let listener = UnixListener::bind(&socket_path).unwrap();
    loop {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let raw = protocol::read_request(&mut reader, Duration::from_secs(5))
            .await
            .unwrap();
        let endpoint = protocol::parse_endpoint(&raw).unwrap();
        match endpoint {
            Endpoint::Generate(_) => {
                protocol::write_json_response(
                    &mut writer,
                    200,
                    "OK",
                    &GenerateResponse::queued(3),
                    Duration::from_secs(5),
                )
                .await
                .unwrap();
            }
            Endpoint::Status => {
                protocol::write_json_response(
                    &mut writer,
                    200,
                    "OK",
                    &StatusResponse {
                        status: "running",
                        model_loaded: true,
                        ram_percent: 12.5,
                        rss_mb: 256.0,
                    },
                    Duration::from_secs(5),
                )
                .await
                .unwrap();
            }
            Endpoint::Shutdown => {
                protocol::write_json_response(
                    &mut writer,
                    200,
                    "OK",
                    &ShutdownResponse::default(),
                    Duration::from_secs(5),
                )
                .await
                .unwrap();
            }
        }
    }
}

async fn fake_daemon_rejecting(socket_path: PathBuf) {
    let listener = UnixListener::bind(&socket_path).unwrap();
    let (stream, _) = listener.accept().await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    let _raw = protocol::read_request(&mut reader, Duration::from_secs(5))
        .await
        .unwrap();
    protocol::write_json_response(
        &mut writer,
        400,
        "Bad Request",
        &ErrorResponse {
            error: "text must not be empty".into(),
        },
        Duration::from_secs(5),
    )
    .await
    .unwrap();
}

#[tokio::test]
#[serial]
async fn connect_fails_when_no_daemon_is_listening() {
    let dir = tempdir().unwrap();
    set_socket_env(&dir.path().join("inference.sock"));
    assert!(matches!(
        TtsClient::connect(),
        Err(ClientError::DaemonNotRunning)
    ));
}

#[tokio::test]
#[serial]
async fn speak_and_status_round_trip_through_a_running_daemon() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("inference.sock");
    set_socket_env(&socket_path);
    tokio::spawn(fake_daemon(socket_path));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = TtsClient::connect().unwrap();
    let response = client.speak("hello", None, None).await.unwrap();
    assert_eq!(response.ticket, 3);

    let status = client.status().await;
    assert_eq!(status.status, "running");
    assert!(status.model_loaded);
}

#[tokio::test]
#[serial]
async fn shutdown_is_fire_and_forget() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("inference.sock");
    set_socket_env(&socket_path);
    tokio::spawn(fake_daemon(socket_path));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = TtsClient::connect().unwrap();
    client.shutdown().await;
}

#[tokio::test]
#[serial]
async fn rejected_response_surfaces_the_error_message() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("inference.sock");
    set_socket_env(&socket_path);
    tokio::spawn(fake_daemon_rejecting(socket_path));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = TtsClient::connect().unwrap();
    let err = client.speak("irrelevant", None, None).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(msg) if msg.contains("empty")));
}

#[tokio::test]
async fn status_reports_stopped_when_the_daemon_is_unreachable() {
    let dir = tempdir().unwrap();
    let client = TtsClient {
        socket_path: dir.path().join("inference.sock"),
    };
    let status = client.status().await;
    assert_eq!(status.status, "stopped");
    assert!(!status.model_loaded);
}
