use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kiln_common::{ChromeMode, Rect};
use kiln_config::{WorkerConfig, WorkerMode};
use serde_json::{json, Value};
use tempfile::TempDir;

use super::*;
use crate::testing::{FakeCredentials, FakeDisplays, FakeFactory, FakeShell, FakeSurface};
use crate::window_state::{display_fingerprint, OVERLAP_STEP};
use crate::worker::{InProcessWorker, PortPublisher, WorkerEnv};

const PORT: u16 = 4100;
const WORKER_URL: &str = "http://localhost:4100/";

/// Publishes a fixed port and then serves forever.
struct FixedPort;

#[async_trait]
impl InProcessWorker for FixedPort {
    async fn run(self: Box<Self>, _env: WorkerEnv, publisher: PortPublisher) -> Result<(), HostError> {
        publisher.publish(PORT);
        std::future::pending::<()>().await;
        Ok(())
    }
}

struct Recorder {
    log: Arc<Mutex<Vec<&'static str>>>,
    fail_start: bool,
}

#[async_trait]
impl Feature for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn start(&self) -> Result<(), HostError> {
        self.log.lock().unwrap().push("start");
        if self.fail_start {
            return Err(HostError::Other("no".into()));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), HostError> {
        self.log.lock().unwrap().push("stop");
        Ok(())
    }
}

struct Harness {
    host: HostController,
    rx: mpsc::Receiver<HostEvent>,
    factory: FakeFactory,
    shell: FakeShell,
    credentials: FakeCredentials,
    dir: TempDir,
}

fn config() -> KilnConfig {
    let mut config = KilnConfig::default();
    config.worker.mode = WorkerMode::InProcess;
    config
}

fn supervisor(config: &KilnConfig) -> WorkerSupervisor {
    WorkerSupervisor::from_config(&config.worker, false).with_in_process(Box::new(FixedPort))
}

impl Harness {
    fn new(config: KilnConfig, request: LaunchRequest) -> Self {
        let supervisor = supervisor(&config);
        Self::with(config, request, false, supervisor, tempfile::tempdir().unwrap())
    }

    fn with(
        config: KilnConfig,
        request: LaunchRequest,
        no_early_window: bool,
        supervisor: WorkerSupervisor,
        dir: TempDir,
    ) -> Self {
        let shell = FakeShell::default();
        let credentials = FakeCredentials::default();
        let services = HostServices {
            displays: Box::new(FakeDisplays::single(1920, 1080)),
            credentials: Box::new(credentials.share()),
            shell: Box::new(shell.clone()),
        };
        let launch = LaunchOptions {
            request,
            user_data_dir: UserDataDir::resolve(Some(dir.path())).unwrap(),
            no_early_window,
            worker_args: Vec::new(),
        };
        let (tx, rx) = mpsc::channel();
        let host = HostController::new(config, launch, services, supervisor, Handle::current(), tx);
        Self {
            host,
            rx,
            factory: FakeFactory::default(),
            shell,
            credentials,
            dir,
        }
    }

    fn boot(&mut self) {
        self.host.boot(&mut self.factory);
    }

    fn send(&mut self, event: HostEvent) {
        self.host.handle_event(event, &mut self.factory);
    }

    fn ipc(&mut self, window: WindowId, body: Value) {
        self.send(HostEvent::Ipc {
            window,
            body: body.to_string(),
        });
    }

    /// Let spawned tasks run and feed whatever they report back in.
    async fn settle(&mut self) {
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(1)).await;
            while let Ok(event) = self.rx.try_recv() {
                self.host.handle_event(event, &mut self.factory);
            }
        }
    }

    fn surface(&self, window: WindowId) -> FakeSurface {
        self.factory.surface(window).unwrap()
    }

    /// Boot, wait for the worker, and finish loading the first window.
    async fn running(&mut self) -> WindowId {
        self.boot();
        self.settle().await;
        assert_eq!(self.host.state(), AppState::Running);
        let window = self.factory.last_id().unwrap();
        self.send(HostEvent::PageLoaded(window));
        window
    }

    fn reply(&mut self, window: WindowId, channel: &str) {
        self.ipc(
            window,
            json!({"kind": "reply", "payload": {"channel": channel, "value": true}}),
        );
    }

    fn reply_channels(&self, window: WindowId, kind: &str) -> (String, Option<String>) {
        let push = self.surface(window).last(kind).unwrap().payload;
        let confirm = push["reply"]["confirm"].as_str().unwrap().to_string();
        let cancel = push["reply"]["cancel"].as_str().map(String::from);
        (confirm, cancel)
    }
}

// =============================================================================
// BOOT
// =============================================================================

#[tokio::test(start_paused = true)]
async fn early_window_receives_worker_url() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    h.boot();
    let early = h.factory.last_id().unwrap();
    let options = h.factory.options(early).unwrap();
    assert_eq!(options.url, BLANK_URL);
    assert!(options.visible);
    assert!(options.cookie_header.is_none());
    assert_eq!(h.host.state(), AppState::Booting);

    h.settle().await;
    assert_eq!(h.host.state(), AppState::Running);
    assert_eq!(h.factory.created.len(), 1);
    let fake = h.surface(early);
    assert_eq!(fake.state().url.as_deref(), Some(WORKER_URL));
    assert_eq!(h.host.trust().bound_port(), Some(PORT));
    assert_eq!(h.credentials.cookies().len(), 1);
    assert_eq!(fake.last("app-state-changed").unwrap().payload["state"], "running");

    h.send(HostEvent::PageLoaded(early));
    assert!(fake.last("open-resource").unwrap().payload["path"].is_null());
    assert!(fake.state().focused);
}

#[tokio::test(start_paused = true)]
async fn resource_is_resolved_against_sender_cwd() {
    let cwd = tempfile::tempdir().unwrap();
    std::fs::create_dir(cwd.path().join("project")).unwrap();
    let request = LaunchRequest {
        resource: Some("project".into()),
        open_url: None,
        cwd: Some(cwd.path().to_path_buf()),
    };
    let mut h = Harness::new(config(), request);
    let window = h.running().await;

    let expected = cwd.path().join("project").canonicalize().unwrap();
    let push = h.surface(window).last("open-resource").unwrap().payload;
    assert_eq!(push["path"], expected.to_string_lossy().as_ref());
}

#[tokio::test(start_paused = true)]
async fn unresolvable_resource_opens_default_window() {
    let request = LaunchRequest {
        resource: Some("/definitely/not/here".into()),
        ..Default::default()
    };
    let mut h = Harness::new(config(), request);
    let window = h.running().await;

    let fake = h.surface(window);
    assert!(fake.last("open-resource").unwrap().payload["path"].is_null());
    assert!(fake.state().visible);
}

#[tokio::test(start_paused = true)]
async fn no_early_window_waits_for_the_worker() {
    let config = config();
    let supervisor = supervisor(&config);
    let mut h = Harness::with(config, LaunchRequest::default(), true, supervisor, tempfile::tempdir().unwrap());
    h.boot();
    assert!(h.factory.created.is_empty());

    h.settle().await;
    let window = h.factory.last_id().unwrap();
    let options = h.factory.options(window).unwrap();
    assert_eq!(options.url, WORKER_URL);
    assert!(!options.visible);
    let (name, value) = options.cookie_header.clone().unwrap();
    assert_eq!(name, "Cookie");
    assert!(value.contains(h.host.trust().value()));

    h.send(HostEvent::PageLoaded(window));
    assert!(h.surface(window).state().visible);
}

#[tokio::test(start_paused = true)]
async fn missing_worker_fails_the_launch() {
    let config = config();
    let supervisor = WorkerSupervisor::from_config(&config.worker, true);
    let mut h = Harness::with(config, LaunchRequest::default(), false, supervisor, tempfile::tempdir().unwrap());
    h.boot();
    let early = h.factory.last_id().unwrap();

    h.settle().await;
    assert_eq!(h.host.exit_code(), Some(1));
    assert!(h.surface(early).state().destroyed);
}

#[tokio::test(start_paused = true)]
async fn feature_start_failure_exits_without_stop_hooks() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut h = Harness::new(config(), LaunchRequest::default());
    h.host.register_feature(Arc::new(Recorder {
        log: log.clone(),
        fail_start: true,
    }));
    h.boot();
    h.settle().await;

    assert_eq!(h.host.exit_code(), Some(1));
    assert_eq!(*log.lock().unwrap(), vec!["start"]);
}

// =============================================================================
// CLOSING
// =============================================================================

#[tokio::test(start_paused = true)]
async fn confirmed_close_of_last_window_quits() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut h = Harness::new(config(), LaunchRequest::default());
    h.host.register_feature(Arc::new(Recorder {
        log: log.clone(),
        fail_start: false,
    }));
    let mut events = h.host.subscribe();
    let window = h.running().await;

    h.send(HostEvent::CloseRequested(window));
    assert!(h.host.registry().is_closing(window));
    let (confirm, cancel) = h.reply_channels(window, "request-close");
    assert!(cancel.is_some());
    h.reply(window, &confirm);
    h.settle().await;

    assert!(h.surface(window).state().destroyed);
    assert_eq!(h.host.state(), AppState::Stopping);
    assert_eq!(h.host.exit_code(), Some(0));
    assert_eq!(*log.lock().unwrap(), vec!["start", "stop"]);

    let mut closed = false;
    while let Ok(event) = events.try_recv() {
        closed |= matches!(event, AppEvent::WindowClosed(w) if w == window);
    }
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn vetoed_close_keeps_window() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.send(HostEvent::CloseRequested(window));
    let (_, cancel) = h.reply_channels(window, "request-close");
    h.reply(window, &cancel.unwrap());
    h.settle().await;

    assert!(h.host.registry().contains(window));
    assert!(!h.host.registry().is_closing(window));
    assert_eq!(h.host.state(), AppState::Running);

    // The window can be asked again.
    let before = h.surface(window).pushed_kinds().len();
    h.send(HostEvent::CloseRequested(window));
    assert_eq!(h.surface(window).pushed_kinds().len(), before + 1);
}

#[tokio::test(start_paused = true)]
async fn unanswered_close_is_a_veto() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.send(HostEvent::CloseRequested(window));
    tokio::time::sleep(Duration::from_secs(11)).await;
    h.settle().await;

    assert!(h.host.registry().contains(window));
    assert!(!h.host.registry().is_closing(window));
    assert_eq!(h.host.exit_code(), None);
}

#[tokio::test(start_paused = true)]
async fn backend_destroy_of_last_window_quits() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.send(HostEvent::Destroyed(window));
    h.settle().await;
    assert_eq!(h.host.exit_code(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn restart_reopens_a_fresh_window() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.ipc(window, json!({"kind": "restart"}));
    let push = h.surface(window).last("request-close").unwrap().payload;
    assert_eq!(push["reason"], "restart");
    let (confirm, _) = h.reply_channels(window, "request-close");
    h.reply(window, &confirm);
    h.settle().await;

    assert!(!h.host.registry().contains(window));
    assert_eq!(h.host.state(), AppState::Running);
    assert!(!h.host.registry().is_restarting());
    let fresh = h.factory.last_id().unwrap();
    assert_ne!(fresh, window);
    assert_eq!(h.factory.options(fresh).unwrap().url, WORKER_URL);
}

#[tokio::test(start_paused = true)]
async fn vetoed_restart_clears_the_flag() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.ipc(window, json!({"kind": "restart"}));
    assert!(h.host.registry().is_restarting());
    let (_, cancel) = h.reply_channels(window, "request-close");
    h.reply(window, &cancel.unwrap());
    h.settle().await;

    assert!(h.host.registry().contains(window));
    assert!(!h.host.registry().is_restarting());
    assert_eq!(h.factory.created.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn quit_needs_every_window_to_agree() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let first = h.running().await;
    h.send(HostEvent::SecondInstance(LaunchRequest::default()));
    let second = h.factory.last_id().unwrap();
    assert_ne!(first, second);

    h.send(HostEvent::QuitRequested);
    let (first_confirm, first_cancel) = h.reply_channels(first, "about-to-close");
    assert!(first_cancel.is_none());
    let (second_confirm, _) = h.reply_channels(second, "about-to-close");

    h.reply(first, &first_confirm);
    h.settle().await;
    assert_eq!(h.host.state(), AppState::Running);

    h.reply(second, &second_confirm);
    h.settle().await;
    assert_eq!(h.host.exit_code(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn silent_window_vetoes_quit() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let first = h.running().await;
    h.send(HostEvent::SecondInstance(LaunchRequest::default()));

    h.send(HostEvent::QuitRequested);
    let (confirm, _) = h.reply_channels(first, "about-to-close");
    h.reply(first, &confirm);
    tokio::time::sleep(Duration::from_secs(11)).await;
    h.settle().await;

    assert_eq!(h.host.state(), AppState::Running);
    assert_eq!(h.host.registry().app_window_count(), 2);

    // A later quit asks again.
    let asked = h.surface(first).pushed_kinds().len();
    h.send(HostEvent::QuitRequested);
    assert_eq!(h.surface(first).pushed_kinds().len(), asked + 1);
}

#[tokio::test(start_paused = true)]
async fn quit_while_booting_shuts_down() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    h.boot();
    h.send(HostEvent::QuitRequested);
    h.settle().await;
    assert_eq!(h.host.exit_code(), Some(0));
}

#[cfg(unix)]
#[tokio::test]
async fn quit_while_forked_worker_is_starting_stops_its_group() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("worker-helper-ran");
    let mut config = config();
    config.worker = WorkerConfig {
        mode: WorkerMode::Forked,
        command: Some("/bin/sh".into()),
        args: vec![
            "-c".into(),
            format!("(sleep 1; touch '{}') & sleep 30", marker.display()),
            "kiln-worker".into(),
        ],
        startup_timeout_ms: 0,
    };
    let supervisor = WorkerSupervisor::from_config(&config.worker, false);
    let mut h = Harness::with(config, LaunchRequest::default(), false, supervisor, tempfile::tempdir().unwrap());

    h.boot();
    tokio::time::sleep(Duration::from_millis(200)).await;
    h.send(HostEvent::QuitRequested);
    for _ in 0..50 {
        h.settle().await;
        if h.host.exit_code().is_some() {
            break;
        }
    }
    assert_eq!(h.host.exit_code(), Some(0));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "worker group survived shutdown");
}

// =============================================================================
// SECOND INSTANCE AND URLS
// =============================================================================

#[tokio::test(start_paused = true)]
async fn launch_url_goes_to_first_accepting_window() {
    let request = LaunchRequest {
        open_url: Some("kiln://auth?code=1".into()),
        ..Default::default()
    };
    let mut h = Harness::new(config(), request);
    h.factory.accept_links = true;
    let window = h.running().await;
    assert_eq!(h.surface(window).link_offers(), vec!["kiln://auth?code=1"]);
}

#[tokio::test(start_paused = true)]
async fn url_only_second_instance_reuses_open_window() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    h.factory.accept_links = true;
    let mut events = h.host.subscribe();
    let window = h.running().await;

    h.send(HostEvent::SecondInstance(LaunchRequest {
        open_url: Some("kiln://open".into()),
        ..Default::default()
    }));
    assert_eq!(h.factory.created.len(), 1);
    assert_eq!(h.surface(window).link_offers(), vec!["kiln://open"]);

    let mut seen = None;
    while let Ok(event) = events.try_recv() {
        if let AppEvent::SecondInstance { args } = event {
            seen = Some(args);
        }
    }
    assert_eq!(seen, Some(vec!["kiln://open".to_string()]));
}

#[tokio::test(start_paused = true)]
async fn second_instance_during_boot_is_deferred() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    h.boot();
    h.send(HostEvent::SecondInstance(LaunchRequest::default()));
    assert_eq!(h.factory.created.len(), 1);

    h.settle().await;
    assert_eq!(h.factory.created.len(), 2);
    assert_eq!(h.factory.options(h.factory.last_id().unwrap()).unwrap().url, WORKER_URL);
}

#[tokio::test(start_paused = true)]
async fn blocked_navigation_falls_back_to_system_browser() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.send(HostEvent::NavigationBlocked {
        window,
        url: "https://example.com/docs".into(),
    });
    assert_eq!(h.shell.0.borrow().opened_urls, vec!["https://example.com/docs"]);
}

// =============================================================================
// SPLASH
// =============================================================================

fn splash_config() -> KilnConfig {
    let mut config = config();
    config.splash.content = Some("about:splash".into());
    config
}

#[tokio::test(start_paused = true)]
async fn splash_closes_once_target_is_ready_and_min_elapsed() {
    let mut h = Harness::new(splash_config(), LaunchRequest::default());
    h.boot();
    let target = h.factory.created[0].0;
    let splash = h.factory.created[1].0;
    assert_eq!(h.factory.options(splash).unwrap().role, WindowRole::Splash);
    assert_eq!(h.factory.options(splash).unwrap().url, "about:splash");
    assert!(!h.factory.options(target).unwrap().visible);

    h.settle().await;
    h.send(HostEvent::PageLoaded(target));
    assert!(!h.surface(target).state().visible);
    assert!(h.host.registry().contains(splash));

    tokio::time::sleep(Duration::from_millis(1000)).await;
    h.settle().await;
    assert!(!h.host.registry().contains(splash));
    assert!(h.surface(splash).state().destroyed);
    assert!(h.surface(target).state().visible);
}

#[tokio::test(start_paused = true)]
async fn splash_gives_up_at_max_duration() {
    let mut h = Harness::new(splash_config(), LaunchRequest::default());
    h.boot();
    let target = h.factory.created[0].0;
    let splash = h.factory.created[1].0;

    tokio::time::sleep(Duration::from_millis(10_000)).await;
    h.settle().await;
    assert!(!h.host.registry().contains(splash));
    assert!(h.surface(target).state().visible);

    // The late page load reveals normally.
    h.send(HostEvent::PageLoaded(target));
    assert!(h.surface(target).state().focused);
}

#[tokio::test(start_paused = true)]
async fn splash_cannot_be_closed_by_user() {
    let mut h = Harness::new(splash_config(), LaunchRequest::default());
    h.boot();
    let splash = h.factory.created[1].0;
    h.send(HostEvent::CloseRequested(splash));
    assert!(h.surface(splash).last("request-close").is_none());
    assert!(h.host.registry().contains(splash));
}

// =============================================================================
// GEOMETRY AND APPEARANCE
// =============================================================================

#[tokio::test(start_paused = true)]
async fn geometry_saves_after_quiet_period() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.surface(window).set_bounds_externally(Rect::new(50, 60, 900, 700));
    h.send(HostEvent::Moved(window));
    h.settle().await;
    assert!(h.host.store().load_window_state().unwrap().is_none());

    tokio::time::sleep(Duration::from_millis(400)).await;
    h.settle().await;
    let saved = h.host.store().load_window_state().unwrap().unwrap();
    assert_eq!(saved.bounds(), Rect::new(50, 60, 900, 700));
}

#[tokio::test(start_paused = true)]
async fn closing_flushes_pending_geometry() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;

    h.surface(window).set_bounds_externally(Rect::new(5, 6, 700, 500));
    h.send(HostEvent::Resized(window));
    h.send(HostEvent::Destroyed(window));
    h.settle().await;

    let saved = h.host.store().load_window_state().unwrap().unwrap();
    assert_eq!(saved.bounds(), Rect::new(5, 6, 700, 500));
}

#[tokio::test(start_paused = true)]
async fn persisted_geometry_is_reused_on_same_displays() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));
    let displays = FakeDisplays::single(1920, 1080);
    let saved = PersistedWindowGeometry {
        x: 100,
        y: 120,
        width: 1000,
        height: 700,
        display_fingerprint: display_fingerprint(&displays.displays()),
        ..Default::default()
    };
    store.save_window_state(&saved).unwrap();

    let config = config();
    let supervisor = supervisor(&config);
    let mut h = Harness::with(config, LaunchRequest::default(), false, supervisor, dir);
    h.boot();
    let early = h.factory.last_id().unwrap();
    assert_eq!(h.factory.options(early).unwrap().bounds, Rect::new(100, 120, 1000, 700));
}

#[tokio::test(start_paused = true)]
async fn second_window_is_offset_from_the_first() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let first = h.running().await;
    h.send(HostEvent::SecondInstance(LaunchRequest::default()));
    let second = h.factory.last_id().unwrap();

    let a = h.factory.options(first).unwrap().bounds;
    let b = h.factory.options(second).unwrap().bounds;
    assert_eq!((b.x, b.y), (a.x + OVERLAP_STEP, a.y + OVERLAP_STEP));
}

#[cfg(not(target_os = "macos"))]
#[tokio::test(start_paused = true)]
async fn title_bar_choice_persists_and_applies_to_new_windows() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;
    assert_eq!(h.factory.options(window).unwrap().chrome, ChromeMode::Native);

    h.ipc(window, json!({"kind": "set-title-bar-style", "payload": {"style": "custom"}}));
    h.settle().await;
    let saved = h.host.store().load_window_state().unwrap().unwrap();
    assert_eq!(saved.chrome_mode, Some(ChromeMode::Custom));

    h.send(HostEvent::SecondInstance(LaunchRequest::default()));
    let second = h.factory.last_id().unwrap();
    assert_eq!(h.factory.options(second).unwrap().chrome, ChromeMode::Custom);
}

#[tokio::test(start_paused = true)]
async fn background_color_survives_restart_of_the_host() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let window = h.running().await;
    h.ipc(window, json!({"kind": "set-background-color", "payload": {"color": "#336699"}}));
    h.settle().await;

    let saved = h.host.store().load_window_state().unwrap().unwrap();
    assert_eq!(saved.background_color.as_deref(), Some("#336699"));

    let dir = std::mem::replace(&mut h.dir, tempfile::tempdir().unwrap());
    let config = config();
    let supervisor = supervisor(&config);
    let mut next = Harness::with(config, LaunchRequest::default(), false, supervisor, dir);
    next.boot();
    let early = next.factory.last_id().unwrap();
    assert_eq!(
        next.factory.options(early).unwrap().background,
        Color::from_hex("#336699").unwrap()
    );
}

#[tokio::test(start_paused = true)]
async fn quit_saves_the_most_recently_focused_window_last() {
    let mut h = Harness::new(config(), LaunchRequest::default());
    let first = h.running().await;
    h.send(HostEvent::SecondInstance(LaunchRequest::default()));
    let second = h.factory.last_id().unwrap();
    h.surface(first).set_bounds_externally(Rect::new(10, 20, 800, 600));
    h.surface(second).set_bounds_externally(Rect::new(300, 200, 640, 480));
    h.send(HostEvent::Focused(first));

    h.send(HostEvent::QuitRequested);
    let (first_confirm, _) = h.reply_channels(first, "about-to-close");
    let (second_confirm, _) = h.reply_channels(second, "about-to-close");
    h.reply(first, &first_confirm);
    h.reply(second, &second_confirm);
    h.settle().await;
    assert_eq!(h.host.exit_code(), Some(0));

    let saved = h.host.store().load_window_state().unwrap().unwrap();
    assert_eq!(saved.bounds(), Rect::new(10, 20, 800, 600));
}
