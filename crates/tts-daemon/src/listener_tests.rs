use std::io::{Read, Write};
use std::os::unix::net::UnixStream as StdUnixStream;

use tempfile::tempdir;
use tokio::net::UnixListener;
use tokio::sync::Notify;

use tts_core::{Clock, FakeClock};
use tts_coordinator::{ResourceMonitor, SystemCoordinator};
use tts_model::FakeTtsModel;
use tts_worker::{InferenceWorker, ModelLoader, WorkerConfig, WorkerDeps};

use super::*;

fn fake_loader(model: FakeTtsModel) -> ModelLoader {
    Arc::new(move || Ok(Arc::new(model.clone()) as Arc<dyn tts_model::TtsModel>))
}

async fn spawn_test_listener(dir: &std::path::Path) -> (std::path::PathBuf, Arc<Notify>) {
    let clock = Arc::new(FakeClock::new(0));
    let coordinator = Arc::new(SystemCoordinator::new(dir, clock.clone() as Arc<dyn Clock>).unwrap());
    let resource_monitor = Arc::new(ResourceMonitor::new(100.0));

    let (worker, _handle) = InferenceWorker::spawn(
        WorkerDeps {
            coordinator,
            resource_monitor: resource_monitor.clone(),
            model_loader: fake_loader(FakeTtsModel::new()),
            clock: clock as Arc<dyn Clock>,
            scratch_dir: dir.to_path_buf(),
        },
        WorkerConfig::default(),
    );

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        worker: Arc::new(worker),
        resource_monitor,
        shutdown: shutdown.clone(),
    });

    let socket_path = dir.join("test.sock");
    let socket = UnixListener::bind(&socket_path).unwrap();
    let listener = Listener::new(socket, ctx);
    tokio::spawn(listener.run());

    (socket_path, shutdown)
}

fn roundtrip(socket_path: &std::path::Path, request: &str) -> String {
    let mut stream = StdUnixStream::connect(socket_path).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[tokio::test]
async fn generate_returns_a_queued_ticket() {
    let dir = tempdir().unwrap();
    let (socket_path, _shutdown) = spawn_test_listener(dir.path()).await;

    let body = r#"{"text":"hello there"}"#;
    let request = format!(
        "POST /generate HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let response = tokio::task::spawn_blocking({
        let socket_path = socket_path.clone();
        move || roundtrip(&socket_path, &request)
    })
    .await
    .unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains(r#""status":"queued""#));
}

#[tokio::test]
async fn generate_rejects_empty_text() {
    let dir = tempdir().unwrap();
    let (socket_path, _shutdown) = spawn_test_listener(dir.path()).await;

    let body = r#"{"text":""}"#;
    let request = format!(
        "POST /generate HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let response = tokio::task::spawn_blocking({
        let socket_path = socket_path.clone();
        move || roundtrip(&socket_path, &request)
    })
    .await
    .unwrap();

    assert!(response.starts_with("HTTP/1.1 400"));
}

#[tokio::test]
async fn status_reports_not_loaded_before_any_generation() {
    let dir = tempdir().unwrap();
    let (socket_path, _shutdown) = spawn_test_listener(dir.path()).await;

    let request = "POST /status HTTP/1.1\r\nContent-Length: 0\r\n\r\n".to_string();
    let response = tokio::task::spawn_blocking({
        let socket_path = socket_path.clone();
        move || roundtrip(&socket_path, &request)
    })
    .await
    .unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains(r#""model_loaded":false"#));
}

#[tokio::test]
async fn shutdown_responds_then_notifies() {
    let dir = tempdir().unwrap();
    let (socket_path, shutdown) = spawn_test_listener(dir.path()).await;

    let request = "POST /shutdown HTTP/1.1\r\nContent-Length: 0\r\n\r\n".to_string();
    let response = tokio::task::spawn_blocking({
        let socket_path = socket_path.clone();
        move || roundtrip(&socket_path, &request)
    })
    .await
    .unwrap();

    assert!(response.contains(r#""status":"shutting_down""#));
    tokio::time::timeout(std::time::Duration::from_secs(1), shutdown.notified())
        .await
        .expect("shutdown was not signaled");
}
