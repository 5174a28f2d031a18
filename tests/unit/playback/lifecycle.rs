use super::*;
use crate::assets::preload::PreloadOpts;
use crate::assets::scripted::{Script, ScriptedLoader};
use crate::manifest::model::Manifest;
use crate::render::memory::MemorySurface;

const MANIFEST: &str = r#"{
  "scenes": [
    {
      "duration": 2,
      "media": { "src": "https://cdn.test/a.jpg", "credit": "Photo: A", "kenburns": "left" },
      "transition": "swipe",
      "text": [
        { "role": "title", "html": "<h1>A</h1>", "at": 0, "effects": ["glow"] },
        { "html": "body", "at": 1.0 }
      ],
      "callouts": [ { "html": "here", "at": 0.5, "x": 0.25, "y": 0.75 } ]
    },
    { "duration": 3, "media": { "src": "https://cdn.test/b.jpg" } },
    { "duration": 2, "media": { "src": "https://cdn.test/c.jpg" }, "transitionOut": "zoom" }
  ]
}"#;

const A: &str = "https://cdn.test/a.jpg";
const B: &str = "https://cdn.test/b.jpg";
const C: &str = "https://cdn.test/c.jpg";

fn schedule() -> Arc<Schedule> {
    let m = Manifest::from_json_str(MANIFEST).unwrap();
    Arc::new(m.normalize("").unwrap())
}

fn opts() -> PlayerOpts {
    PlayerOpts {
        prerender_next: false,
        warm_ahead: 0,
        preload: PreloadOpts {
            retry_count: 0,
            timeout_ms: 1000,
            base_delay_ms: 10,
            ..PreloadOpts::default()
        },
        ..PlayerOpts::default()
    }
}

fn manager(loader: ScriptedLoader, opts: &PlayerOpts) -> (LifecycleManager, Arc<ScriptedLoader>) {
    let loader = Arc::new(loader);
    let lm = LifecycleManager::new(schedule(), loader.clone(), opts);
    (lm, loader)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn mount_builds_the_scene_structure_once() {
    let (mut lm, _) = manager(ScriptedLoader::new(), &opts());
    let mut surface = MemorySurface::new();
    let root = surface.root().unwrap();

    let m = lm.mount(&mut surface, 0).unwrap().clone();
    assert_eq!(m.phase, ScenePhase::Loading);
    assert_eq!(surface.children(root), &[m.root]);
    assert_eq!(surface.children(m.root).len(), 5);
    assert_eq!(surface.attr(m.media, "src"), Some(A));
    assert!(surface.has_class(m.media, "kb-left"));
    assert_eq!(surface.content(m.credit.unwrap()), Some("Photo: A"));
    assert!(surface.has_class(m.text[0], "role-title"));
    assert!(surface.has_class(m.text[1], "role-body"));
    assert_eq!(surface.style(m.callouts[0], "left"), Some("25.000%"));
    assert_eq!(surface.style(m.callouts[0], "top"), Some("75.000%"));
    assert!(!surface.has_class(m.text[0], VISIBLE_CLASS));

    let live = surface.live_count();
    let again = lm.mount(&mut surface, 0).unwrap().root;
    assert_eq!(again, m.root);
    assert_eq!(surface.live_count(), live);
}

#[tokio::test(start_paused = true)]
async fn mount_without_render_root_is_fatal() {
    let (mut lm, _) = manager(ScriptedLoader::new(), &opts());
    let mut surface = MemorySurface::detached();
    let err = lm.mount(&mut surface, 0).unwrap_err();
    assert!(matches!(err, ReelError::Mount(_)));
    assert!(lm.mounted_indices().is_empty());

    let mut surface = MemorySurface::new();
    assert!(matches!(lm.mount(&mut surface, 9), Err(ReelError::Mount(_))));
}

#[tokio::test(start_paused = true)]
async fn enter_waits_for_media_and_defers_events() {
    let loader = ScriptedLoader::new().with(A, Script::ReadyAfter(Duration::from_millis(200)));
    let (mut lm, _) = manager(loader, &opts());
    let mut surface = MemorySurface::new();

    lm.enter(&mut surface, 0).unwrap();
    let m = lm.mounted(0).unwrap().clone();
    assert!(m.is_enter_pending());
    assert!(lm.tick_events(&mut surface, 0, 5.0).is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    lm.poll(&mut surface, Instant::now()).unwrap();
    assert_eq!(lm.mounted(0).unwrap().phase, ScenePhase::Loading);

    tokio::time::sleep(Duration::from_millis(150)).await;
    lm.poll(&mut surface, Instant::now()).unwrap();
    assert_eq!(lm.mounted(0).unwrap().phase, ScenePhase::Active);
    assert!(surface.has_class(m.root, "enter-swipe"));
    assert!(surface.has_class(m.root, ACTIVE_CLASS));
    assert_eq!(surface.style(m.root, "animation-duration"), Some("700ms"));
    assert_eq!(surface.style(m.media, "animation-duration"), Some("2.000s"));

    // deferred events fire on the first tick after the enter completes
    let fired = lm.tick_events(&mut surface, 0, 5.0);
    assert_eq!(fired.len(), 3);
    assert!(surface.has_class(m.text[0], VISIBLE_CLASS));
    assert!(surface.has_class(m.text[0], "fx-glow"));
    assert!(surface.has_class(m.callouts[0], VISIBLE_CLASS));
}

#[tokio::test(start_paused = true)]
async fn primed_media_enters_immediately() {
    let (mut lm, loader) = manager(ScriptedLoader::new(), &opts());
    let mut surface = MemorySurface::new();

    lm.prime(2).await;
    assert_eq!(loader.request_order(), vec![A, B]);

    lm.enter(&mut surface, 0).unwrap();
    assert_eq!(lm.mounted(0).unwrap().phase, ScenePhase::Active);
    assert_eq!(lm.tick_events(&mut surface, 0, 0.0).len(), 1);
    assert_eq!(lm.tick_events(&mut surface, 0, 0.6).len(), 1);
    assert_eq!(lm.tick_events(&mut surface, 0, 0.7).len(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_media_still_lets_the_scene_enter() {
    let loader = ScriptedLoader::new().with(A, Script::AlwaysFail);
    let (mut lm, _) = manager(loader, &opts());
    let mut surface = MemorySurface::new();

    lm.enter(&mut surface, 0).unwrap();
    settle().await;
    lm.poll(&mut surface, Instant::now()).unwrap();

    let m = lm.mounted(0).unwrap();
    assert_eq!(m.phase, ScenePhase::Active);
    assert!(surface.has_class(m.media, "media-failed"));
}

#[tokio::test(start_paused = true)]
async fn exit_is_reaped_after_the_transition_duration() {
    let (mut lm, _) = manager(ScriptedLoader::new(), &opts());
    let mut surface = MemorySurface::new();
    lm.prime(3).await;

    lm.enter(&mut surface, 2).unwrap();
    let root = lm.mounted(2).unwrap().root;
    let t0 = Instant::now();
    lm.exit(&mut surface, 2, t0);

    assert!(surface.has_class(root, "exit-zoom"));
    assert!(!surface.has_class(root, "enter-crossfade"));
    assert!(!surface.has_class(root, ACTIVE_CLASS));

    lm.poll(&mut surface, t0 + Duration::from_millis(799)).unwrap();
    assert!(surface.node_exists(root));
    lm.poll(&mut surface, t0 + Duration::from_millis(800)).unwrap();
    assert!(!surface.node_exists(root));
    assert!(lm.mounted(2).is_none());

    // removal is idempotent
    lm.remove(&mut surface, 2);
    lm.exit(&mut surface, 2, t0);
}

#[tokio::test(start_paused = true)]
async fn a_new_exit_force_removes_the_previous_one() {
    let (mut lm, _) = manager(ScriptedLoader::new(), &opts());
    let mut surface = MemorySurface::new();
    lm.prime(3).await;
    let now = Instant::now();

    lm.enter(&mut surface, 0).unwrap();
    lm.exit(&mut surface, 0, now);
    lm.enter(&mut surface, 1).unwrap();
    assert_eq!(lm.mounted_indices(), vec![0, 1]);

    lm.exit(&mut surface, 1, now);
    assert_eq!(lm.mounted_indices(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn zero_grace_removes_on_exit() {
    let o = opts().with_instant_exits();
    let (mut lm, _) = manager(ScriptedLoader::new(), &o);
    let mut surface = MemorySurface::new();
    lm.prime(1).await;

    lm.enter(&mut surface, 0).unwrap();
    lm.exit(&mut surface, 0, Instant::now());
    assert!(lm.mounted(0).is_none());
    assert_eq!(surface.live_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn reentry_clears_fired_events() {
    let o = opts().with_instant_exits();
    let (mut lm, _) = manager(ScriptedLoader::new(), &o);
    let mut surface = MemorySurface::new();
    lm.prime(1).await;

    lm.enter(&mut surface, 0).unwrap();
    assert_eq!(lm.tick_events(&mut surface, 0, 9.0).len(), 3);
    lm.exit(&mut surface, 0, Instant::now());

    lm.enter(&mut surface, 0).unwrap();
    assert_eq!(lm.tick_events(&mut surface, 0, 9.0).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn entering_warms_and_prerenders_upcoming_scenes() {
    let o = PlayerOpts {
        prerender_next: true,
        warm_ahead: 2,
        ..opts()
    };
    let (mut lm, loader) = manager(ScriptedLoader::new(), &o);
    let mut surface = MemorySurface::new();
    lm.prime(1).await;

    lm.enter(&mut surface, 0).unwrap();
    settle().await;
    lm.poll(&mut surface, Instant::now()).unwrap();

    assert_eq!(lm.mounted_indices(), vec![0, 1]);
    assert_eq!(lm.mounted(1).unwrap().phase, ScenePhase::Ready);
    assert_eq!(lm.warmer().state(C), Some(WarmState::Ready));
    assert_eq!(loader.request_order(), vec![A, B, C]);
    let next = lm.mounted(1).unwrap().root;
    assert!(!surface.has_class(next, ACTIVE_CLASS));
}

#[tokio::test(start_paused = true)]
async fn finalize_shows_everything_without_transitions() {
    let (mut lm, _) = manager(ScriptedLoader::new().with_default(Script::Hang), &opts());
    let mut surface = MemorySurface::new();

    lm.enter(&mut surface, 1).unwrap();
    lm.finalize(&mut surface, 0).unwrap();

    assert_eq!(lm.mounted_indices(), vec![0]);
    let m = lm.mounted(0).unwrap();
    assert_eq!(m.phase, ScenePhase::Active);
    assert!(surface.has_class(m.root, ACTIVE_CLASS));
    assert!(!surface.has_class(m.root, "enter-swipe"));
    for n in m.text.iter().chain(&m.callouts) {
        assert!(surface.has_class(*n, VISIBLE_CLASS));
    }
    assert_eq!(lm.triggers().fired_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn reset_clears_surface_and_triggers() {
    let (mut lm, _) = manager(ScriptedLoader::new(), &opts());
    let mut surface = MemorySurface::new();
    lm.finalize(&mut surface, 0).unwrap();

    lm.reset(&mut surface, CancellationToken::new());
    assert!(lm.mounted_indices().is_empty());
    assert_eq!(lm.triggers().fired_count(), 0);
    assert_eq!(surface.live_count(), 1);
}
