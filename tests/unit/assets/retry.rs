use super::*;
use crate::assets::scripted::{Script, ScriptedLoader};
use tokio::time::Instant;

fn policy(retry_count: u32, timeout_ms: u64, base_ms: u64) -> RetryPolicy {
    RetryPolicy {
        retry_count,
        timeout: Duration::from_millis(timeout_ms),
        base_delay: Duration::from_millis(base_ms),
    }
}

#[test]
fn backoff_grows_linearly() {
    let p = policy(3, 1000, 100);
    assert_eq!(p.max_attempts(), 4);
    assert_eq!(p.backoff_after(1), Duration::from_millis(100));
    assert_eq!(p.backoff_after(3), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_transient_failures() {
    let loader = ScriptedLoader::new().with("a", Script::FailTimes(1));
    let token = CancellationToken::new();
    let start = Instant::now();

    let task = load_with_retry(&loader, "a", policy(2, 1000, 100), &token).await;

    assert!(task.is_ready());
    assert_eq!(task.attempts_used, 2);
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(start.elapsed() < Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn exhausts_retries_and_reports_last_error() {
    let loader = ScriptedLoader::new().with("a", Script::AlwaysFail);
    let token = CancellationToken::new();
    let start = Instant::now();

    let task = load_with_retry(&loader, "a", policy(2, 1000, 100), &token).await;

    assert_eq!(task.attempts_used, 3);
    assert_eq!(loader.attempts("a"), 3);
    assert!(matches!(task.outcome, Err(AssetError::Source { .. })));
    // 100ms after attempt 1, 200ms after attempt 2, none after the last
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn hard_timeouts_are_retryable() {
    let loader = ScriptedLoader::new().with("a", Script::Hang);
    let token = CancellationToken::new();

    let task = load_with_retry(&loader, "a", policy(1, 500, 10), &token).await;

    assert_eq!(task.attempts_used, 2);
    assert_eq!(
        task.outcome,
        Err(AssetError::Timeout {
            url: "a".to_string(),
            timeout: Duration::from_millis(500),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn zero_retries_means_one_attempt() {
    let loader = ScriptedLoader::new().with("a", Script::AlwaysFail);
    let token = CancellationToken::new();
    let task = load_with_retry(&loader, "a", policy(0, 500, 10), &token).await;
    assert_eq!(task.attempts_used, 1);
    assert!(!task.is_ready());
}

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_in_flight_attempt() {
    let loader = ScriptedLoader::new().with("a", Script::Hang);
    let token = CancellationToken::new();

    let (task, _) = tokio::join!(
        load_with_retry(&loader, "a", policy(5, 10_000, 10), &token),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        }
    );

    assert!(task.is_cancelled());
    assert_eq!(task.attempts_used, 1);
    assert_eq!(loader.attempts("a"), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_checked_before_first_attempt() {
    let loader = ScriptedLoader::new();
    let token = CancellationToken::new();
    token.cancel();

    let task = load_with_retry(&loader, "a", RetryPolicy::default(), &token).await;

    assert!(task.is_cancelled());
    assert_eq!(task.attempts_used, 0);
    assert_eq!(loader.attempts("a"), 0);
}
