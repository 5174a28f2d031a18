use super::*;
use crate::effects::kenburns::KenBurnsPreset;
use crate::effects::transitions::TransitionKind;
use crate::foundation::core::{NormPoint, TimeSpan};
use crate::timeline::model::{CalloutEvent, MediaSpec, TextEvent};

fn scene(text_at: &[f64], callout_at: &[f64]) -> Scene {
    Scene {
        span: TimeSpan::new(0.0, 5.0).unwrap(),
        media: MediaSpec {
            src: String::new(),
            credit: None,
            kenburns: KenBurnsPreset::Center,
        },
        text_events: text_at
            .iter()
            .map(|&at| TextEvent {
                role: "body".to_string(),
                html: format!("t@{at}"),
                at,
                effects: BTreeSet::new(),
            })
            .collect(),
        callout_events: callout_at
            .iter()
            .map(|&at| CalloutEvent {
                html: format!("c@{at}"),
                at,
                pos: NormPoint::clamped(0.5, 0.5),
            })
            .collect(),
        transition_in: TransitionKind::Crossfade,
        transition_out: TransitionKind::Crossfade,
    }
}

#[test]
fn fires_on_first_offset_at_or_after_at_and_only_once() {
    let s = scene(&[0.0, 1.0], &[0.5]);
    let mut t = TriggerTracker::new();

    assert_eq!(t.fire_due(0, &s, 0.0), vec![TriggerKey::text(0, 0)]);
    assert!(t.fire_due(0, &s, 0.2).is_empty());
    assert_eq!(t.fire_due(0, &s, 0.5), vec![TriggerKey::callout(0, 0)]);
    assert!(t.fire_due(0, &s, 0.99).is_empty());
    assert_eq!(t.fire_due(0, &s, 1.0), vec![TriggerKey::text(0, 1)]);
    assert!(t.fire_due(0, &s, 3.0).is_empty());
    assert_eq!(t.fired_count(), 3);
}

#[test]
fn one_tick_fires_text_before_callouts_in_declared_order() {
    let s = scene(&[0.3, 0.1], &[0.2, 0.0]);
    let mut t = TriggerTracker::new();
    assert_eq!(
        t.fire_due(4, &s, 1.0),
        vec![
            TriggerKey::text(4, 0),
            TriggerKey::text(4, 1),
            TriggerKey::callout(4, 0),
            TriggerKey::callout(4, 1),
        ]
    );
}

#[test]
fn negative_offset_fires_nothing() {
    let s = scene(&[0.0], &[0.0]);
    let mut t = TriggerTracker::new();
    assert!(t.fire_due(0, &s, -0.01).is_empty());
}

#[test]
fn clear_scene_only_forgets_that_scene() {
    let s = scene(&[0.0], &[0.0]);
    let mut t = TriggerTracker::new();
    t.fire_due(0, &s, 1.0);
    t.fire_due(1, &s, 1.0);

    t.clear_scene(0);
    assert!(!t.is_fired(TriggerKey::text(0, 0)));
    assert!(t.is_fired(TriggerKey::text(1, 0)));
    assert!(t.is_fired(TriggerKey::callout(1, 0)));

    // re-entry fires again
    assert_eq!(t.fire_due(0, &s, 1.0).len(), 2);
}

#[test]
fn mark_all_fires_future_events_and_reports_only_new_ones() {
    let s = scene(&[0.0, 9.0], &[4.0]);
    let mut t = TriggerTracker::new();
    t.fire_due(2, &s, 0.0);

    let newly = t.mark_all(2, &s);
    assert_eq!(newly, vec![TriggerKey::text(2, 1), TriggerKey::callout(2, 0)]);
    assert_eq!(t.fired_count(), 3);

    t.reset();
    assert_eq!(t.fired_count(), 0);
    assert_eq!(t.fired().count(), 0);
}
