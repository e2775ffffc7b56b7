use serial_test::serial;
use tempfile::tempdir;

use super::*;

#[test]
#[serial]
fn find_ttsd_binary_honors_explicit_override() {
    std::env::set_var("LOCAL_TTS_DAEMON_BINARY", "/opt/bin/ttsd");
    assert_eq!(find_ttsd_binary(), PathBuf::from("/opt/bin/ttsd"));
    std::env::remove_var("LOCAL_TTS_DAEMON_BINARY");
}

#[test]
fn is_service_running_is_false_when_socket_file_is_absent() {
    let dir = tempdir().unwrap();
    assert!(!is_service_running(&dir.path().join("inference.sock")));
}

#[test]
fn is_service_running_is_true_for_a_listening_socket() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("inference.sock");
    let listener = std::os::unix::net::UnixListener::bind(&socket_path).unwrap();
    assert!(is_service_running(&socket_path));
    drop(listener);
}

#[test]
fn is_service_running_is_false_for_a_stale_socket_file() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("inference.sock");
    {
        let listener = std::os::unix::net::UnixListener::bind(&socket_path).unwrap();
        drop(listener);
    }
    // The bind above leaves the inode on disk but nothing is listening.
    assert!(!is_service_running(&socket_path));
}
