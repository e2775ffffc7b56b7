use super::*;

#[test]
fn fresh_monitor_with_high_threshold_is_safe() {
    let monitor = ResourceMonitor::new(99.9);
    assert!(monitor.is_safe_to_run());
}

#[test]
fn zero_threshold_is_always_critical() {
    let monitor = ResourceMonitor::new(0.0);
    assert!(!monitor.is_safe_to_run());
}

#[test]
fn can_allocate_rejects_when_pushed_past_threshold() {
    let monitor = ResourceMonitor::new(50.0);
    let status = monitor.status();
    // Ask to allocate more than the entire remaining budget.
    let huge = status.memory_total_mb;
    assert!(!monitor.can_allocate(huge));
}

#[test]
fn can_allocate_accepts_tiny_allocation() {
    let monitor = ResourceMonitor::new(99.9);
    assert!(monitor.can_allocate(1.0));
}

#[test]
fn process_rss_mb_is_nonzero_for_the_running_process() {
    let monitor = ResourceMonitor::new(99.9);
    assert!(monitor.process_rss_mb() > 0.0);
}

#[tokio::test]
async fn background_sampler_updates_status() {
    let monitor = Arc::new(ResourceMonitor::new(99.9));
    let handle = monitor.clone().spawn_sampler(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.abort();
    // No panics, status still readable.
    let _ = monitor.status();
}
