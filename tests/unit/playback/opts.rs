use super::*;

#[test]
fn defaults_match_documented_values() {
    let o = PlayerOpts::default();
    assert_eq!(o.tick_interval(), Duration::from_millis(16));
    assert_eq!(o.end_grace(), Duration::from_millis(250));
    assert_eq!(o.warm_ahead, 2);
    assert!(o.prerender_next);
    assert_eq!(o.exit_grace_override(), None);
    assert_eq!(o.preload, PreloadOpts::default());
}

#[test]
fn partial_json_keeps_other_defaults() {
    let o = PlayerOpts::from_json_str(
        r#"{"tick_ms": 40, "exit_grace_ms": 0, "preload": {"retry_count": 0}}"#,
    )
    .unwrap();
    assert_eq!(o.tick_interval(), Duration::from_millis(40));
    assert_eq!(o.exit_grace_override(), Some(Duration::ZERO));
    assert_eq!(o.preload.retry_count, 0);
    assert_eq!(o.preload.concurrency, 4);
    assert_eq!(o.end_grace_ms, 250);
}

#[test]
fn zero_tick_is_clamped() {
    let o = PlayerOpts {
        tick_ms: 0,
        ..PlayerOpts::default()
    };
    assert_eq!(o.tick_interval(), Duration::from_millis(1));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = PlayerOpts::from_json_str(r#"{"tick_ms": "fast"}"#).unwrap_err();
    assert!(matches!(err, ReelError::Serde(_)));
    assert!(err.to_string().contains("invalid player options"));
}

#[test]
fn instant_exits_zero_the_grace() {
    let o = PlayerOpts::default().with_instant_exits();
    assert_eq!(o.exit_grace_override(), Some(Duration::ZERO));
}
