//! The host's top-level state machine.
//!
//! [`HostController`] owns every registry and runs on the thread that owns
//! the windowing event loop. Anything slow (starting the worker, feature
//! hooks, timers, waiting on window replies, disk writes) runs on the tokio
//! runtime and reports back as a [`HostEvent`] over a std channel, which
//! the event loop drains into [`HostController::handle_event`].
//!
//! The lifecycle only moves forward: booting -> running -> stopping.

mod chrome;
mod features;
mod launch;

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::time::Duration;

use kiln_common::{AppEvent, AppState, Color, EventBus, HostError, StartupError, WindowId};
use kiln_config::KilnConfig;
use kiln_ipc::{CloseReason, HostPush, PendingReply, ReplyOutcome};
use kiln_platform::{state_file, UserDataDir};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::router::{CommandRouter, HostAction, RouterCtx};
use crate::splash::{self, splash_bounds, SplashCoordinator, SplashOutcome};
use crate::surface::{
    CredentialStore, DisplayProvider, ShellServices, WindowFactory, WindowOptions, WindowRole,
};
use crate::trust::{worker_origin, TrustTokenService};
use crate::window_state::{
    avoid_overlap, capture_geometry, compute_initial_options, GeometryWriter,
    PersistedWindowGeometry, StateStore,
};
use crate::windows::WindowRegistry;
use crate::worker::{WorkerHandle, WorkerLaunch, WorkerSupervisor};

pub use chrome::{ChromeResolver, ChromeSource, CHROME_ENV_VAR};
pub use features::{Feature, FeatureSet};
pub use launch::{resolve_resource, LaunchRequest};

const BLANK_URL: &str = "about:blank";

// =============================================================================
// INPUTS
// =============================================================================

/// Everything decided before the controller exists.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub request: LaunchRequest,
    pub user_data_dir: UserDataDir,
    /// Never show a window before the worker is ready.
    pub no_early_window: bool,
    /// Startup arguments for the worker, host-only flags already removed.
    pub worker_args: Vec<String>,
}

/// OS- and backend-facing collaborators.
pub struct HostServices {
    pub displays: Box<dyn DisplayProvider>,
    pub credentials: Box<dyn CredentialStore>,
    pub shell: Box<dyn ShellServices>,
}

/// Things that happened, delivered in order to the controller.
pub enum HostEvent {
    WorkerReady(Result<WorkerHandle, StartupError>),
    FeaturesStarted(Result<(), StartupError>),
    Ipc { window: WindowId, body: String },
    Focused(WindowId),
    Blurred(WindowId),
    Moved(WindowId),
    Resized(WindowId),
    /// A page finished loading in the window.
    PageLoaded(WindowId),
    /// The user asked the OS to close the window.
    CloseRequested(WindowId),
    /// The backend lost the window without being asked to.
    Destroyed(WindowId),
    CloseDecision {
        window: WindowId,
        reason: CloseReason,
        outcome: ReplyOutcome,
    },
    SplashDone(SplashOutcome),
    SecondInstance(LaunchRequest),
    NavigationBlocked { window: WindowId, url: String },
    QuitRequested,
    /// Pending geometry is on disk and the writer has stopped.
    StateFlushed,
}

fn rank(state: AppState) -> u8 {
    match state {
        AppState::Booting => 0,
        AppState::Running => 1,
        AppState::Stopping => 2,
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct HostController {
    config: KilnConfig,
    launch: LaunchOptions,
    state: AppState,
    registry: WindowRegistry,
    router: CommandRouter,
    trust: TrustTokenService,
    supervisor: Option<WorkerSupervisor>,
    worker: Option<WorkerHandle>,
    /// Still waiting for the worker's port.
    worker_start: Option<JoinHandle<()>>,
    features: FeatureSet,
    features_started: bool,
    writer: GeometryWriter,
    store: StateStore,
    chrome: ChromeResolver,
    background: Color,
    persisted_background: Option<String>,
    splash: Option<SplashCoordinator>,
    /// Window shown before the worker was ready; the first dispatch reuses it.
    early_window: Option<WindowId>,
    /// Windows loading the worker page, with the resource to open once loaded.
    pending_opens: HashMap<WindowId, Option<String>>,
    pending_url: Option<String>,
    deferred: Vec<LaunchRequest>,
    quit_waiting: HashSet<WindowId>,
    services: HostServices,
    bus: EventBus,
    events: mpsc::Sender<HostEvent>,
    runtime: Handle,
    exit_code: Option<i32>,
    finished: bool,
}

impl HostController {
    pub fn new(
        config: KilnConfig,
        launch: LaunchOptions,
        services: HostServices,
        supervisor: WorkerSupervisor,
        runtime: Handle,
        events: mpsc::Sender<HostEvent>,
    ) -> Self {
        let store = StateStore::new(state_file(&launch.user_data_dir));
        let persisted = match store.load_window_state() {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::error!(error = %e, "failed to read window state");
                None
            }
        };
        let chrome = ChromeResolver::from_process(
            persisted.as_ref().and_then(|p| p.chrome_mode),
            config.chrome.preference,
        );
        let persisted_background = persisted.as_ref().and_then(|p| p.background_color.clone());
        let background = persisted_background
            .as_deref()
            .and_then(Color::from_hex)
            .or_else(|| Color::from_hex(&config.window.background_color))
            .unwrap_or(Color::BLACK);
        let writer = GeometryWriter::spawn(
            store.clone(),
            Duration::from_millis(config.window.save_debounce_ms),
            &runtime,
        );
        let router = CommandRouter::new(Duration::from_millis(config.ipc.reply_timeout_ms));

        Self {
            config,
            launch,
            state: AppState::Booting,
            registry: WindowRegistry::new(),
            router,
            trust: TrustTokenService::new(),
            supervisor: Some(supervisor),
            worker: None,
            worker_start: None,
            features: FeatureSet::new(),
            features_started: false,
            writer,
            store,
            chrome,
            background,
            persisted_background,
            splash: None,
            early_window: None,
            pending_opens: HashMap::new(),
            pending_url: None,
            deferred: Vec::new(),
            quit_waiting: HashSet::new(),
            services,
            bus: EventBus::new(64),
            events,
            runtime,
            exit_code: None,
            finished: false,
        }
    }

    pub fn register_feature(&mut self, feature: std::sync::Arc<dyn Feature>) {
        self.features.register(feature);
    }

    pub fn router_mut(&mut self) -> &mut CommandRouter {
        &mut self.router
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn trust(&self) -> &TrustTokenService {
        &self.trust
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.bus.subscribe()
    }

    /// Set once shutdown has fully completed.
    pub fn exit_code(&self) -> Option<i32> {
        self.finished.then(|| self.exit_code.unwrap_or(0))
    }

    // =========================================================================
    // BOOT
    // =========================================================================

    /// Show whatever goes up before the worker, then start the worker.
    pub fn boot(&mut self, factory: &mut dyn WindowFactory) {
        let (mode, source) = self.chrome.resolve();
        tracing::info!(chrome = %mode, ?source, "booting");
        self.bus.publish(AppEvent::StateChanged(AppState::Booting));

        if self.config.splash.is_enabled() {
            self.open_splash(factory);
        } else if self.config.window.show_early && !self.launch.no_early_window {
            match self.open_window(factory, WindowRole::Main, None, BLANK_URL, true) {
                Ok(id) => self.early_window = Some(id),
                Err(e) => tracing::warn!(error = %e, "could not show early window"),
            }
        }

        self.start_worker();
    }

    fn open_splash(&mut self, factory: &mut dyn WindowFactory) {
        let show_target = self.config.splash.show_window_early;
        let target = match self.open_window(factory, WindowRole::Main, None, BLANK_URL, show_target) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "could not create window behind splash");
                return;
            }
        };
        self.early_window = Some(target);

        let target_bounds = self
            .registry
            .get(target)
            .and_then(|r| r.surface.bounds())
            .unwrap_or_default();
        let displays = self.services.displays.displays();
        let content = self.config.splash.content.clone().unwrap_or_default();
        let options = WindowOptions {
            role: WindowRole::Splash,
            name: None,
            title: self.config.window.title.clone(),
            url: splash_url(&content),
            bounds: splash_bounds(target_bounds, &displays, &self.config.splash),
            min_size: (0, 0),
            maximized: false,
            fullscreen: false,
            chrome: self.chrome.mode(),
            background: self.background,
            visible: true,
            cookie_header: None,
        };
        let splash_id = self.registry.allocate_id();
        match factory.create(splash_id, &options) {
            Ok(surface) => {
                self.registry
                    .register(splash_id, WindowRole::Splash, None, options.chrome, surface);
                self.registry.mark_visible(splash_id);
            }
            Err(e) => {
                tracing::warn!(error = %e, "splash unavailable; showing window directly");
                self.reveal(target);
                return;
            }
        }

        let (coordinator, ready) = SplashCoordinator::new(splash_id, target);
        let min = Duration::from_millis(self.config.splash.min_duration_ms);
        let max = Duration::from_millis(self.config.splash.max_duration_ms);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let outcome = splash::race(min, max, ready).await;
            let _ = events.send(HostEvent::SplashDone(outcome));
        });
        self.splash = Some(coordinator);
    }

    fn start_worker(&mut self) {
        let Some(supervisor) = self.supervisor.take() else {
            return;
        };
        let launch = WorkerLaunch {
            token: self.trust.token().clone(),
            user_data_dir: self.launch.user_data_dir.path().to_path_buf(),
            args: self.launch.worker_args.clone(),
        };
        let events = self.events.clone();
        self.worker_start = Some(self.runtime.spawn(async move {
            let result = supervisor.start(launch).await;
            let _ = events.send(HostEvent::WorkerReady(result));
        }));
    }

    fn on_worker_ready(&mut self, mut handle: WorkerHandle) {
        let port = handle.port();
        if self.state == AppState::Stopping {
            tracing::info!(port, "worker came up during shutdown; stopping it");
            if let Err(e) = handle.terminate() {
                self.fail(e.into());
            }
            return;
        }
        tracing::info!(port, "worker ready");
        self.worker = Some(handle);
        self.bus.publish(AppEvent::WorkerReady { port });

        if let Err(e) = self.trust.bind(port, self.services.credentials.as_mut()) {
            self.fail(e.into());
            return;
        }

        let features = self.features.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = features.start_all().await;
            let _ = events.send(HostEvent::FeaturesStarted(result));
        });
    }

    fn on_features_started(&mut self, factory: &mut dyn WindowFactory) {
        if self.state == AppState::Stopping {
            if self.finished {
                self.features.stop_all();
            } else {
                self.features_started = true;
            }
            return;
        }
        self.features_started = true;
        self.set_state(AppState::Running);

        let request = std::mem::take(&mut self.launch.request);
        self.dispatch_launch(factory, request);
        for request in std::mem::take(&mut self.deferred) {
            self.on_second_instance(request, factory);
        }
    }

    fn set_state(&mut self, next: AppState) {
        if rank(next) <= rank(self.state) {
            return;
        }
        tracing::info!(from = ?self.state, to = ?next, "app state changed");
        self.state = next;
        self.bus.publish(AppEvent::StateChanged(next));
        self.registry.broadcast(&HostPush::AppStateChanged { state: next });
    }

    fn fail(&mut self, err: HostError) {
        tracing::error!(error = %err, fatal = err.is_fatal(), "host failure");
        self.exit_code = Some(1);
        self.begin_shutdown();
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    pub fn handle_event(&mut self, event: HostEvent, factory: &mut dyn WindowFactory) {
        if matches!(event, HostEvent::WorkerReady(_)) {
            self.worker_start = None;
        }
        match event {
            // Startup results still matter after shutdown: whatever came up
            // late has to be stopped again.
            HostEvent::WorkerReady(Ok(handle)) => self.on_worker_ready(handle),
            HostEvent::FeaturesStarted(Ok(())) => self.on_features_started(factory),
            _ if self.finished => {}
            HostEvent::WorkerReady(Err(e)) | HostEvent::FeaturesStarted(Err(e)) => {
                self.fail(e.into())
            }
            HostEvent::StateFlushed => self.finish_shutdown(),
            _ if self.state == AppState::Stopping => {
                tracing::debug!("event ignored while stopping");
            }
            HostEvent::Ipc { window, body } => self.on_ipc(window, &body, factory),
            HostEvent::Focused(window) => {
                if self.registry.focus(window) {
                    self.bus.publish(AppEvent::WindowFocused(window));
                }
            }
            HostEvent::Blurred(window) => self.registry.blur(window),
            HostEvent::Moved(window) | HostEvent::Resized(window) => self.schedule_save(window),
            HostEvent::PageLoaded(window) => self.on_page_loaded(window),
            HostEvent::CloseRequested(window) => self.request_close(window, CloseReason::User),
            HostEvent::Destroyed(window) => self.destroy_window(window, factory),
            HostEvent::CloseDecision {
                window,
                reason,
                outcome,
            } => self.on_close_decision(window, reason, outcome, factory),
            HostEvent::SplashDone(outcome) => self.finish_splash(outcome),
            HostEvent::SecondInstance(request) => self.on_second_instance(request, factory),
            HostEvent::NavigationBlocked { window, url } => self.on_navigation_blocked(window, &url),
            HostEvent::QuitRequested => self.request_quit(),
        }
    }

    fn on_ipc(&mut self, window: WindowId, body: &str, factory: &mut dyn WindowFactory) {
        let mut actions = Vec::new();
        let mut ctx = RouterCtx {
            registry: &mut self.registry,
            trust: &self.trust,
            shell: self.services.shell.as_mut(),
            credentials: self.services.credentials.as_mut(),
            actions: &mut actions,
        };
        self.router.dispatch(window, body, &mut ctx);

        for action in actions {
            match action {
                HostAction::Close(window) => self.destroy_window(window, factory),
                HostAction::Restart(window) => self.restart(window),
                HostAction::PersistChrome(mode) => {
                    self.chrome.set_persisted(mode);
                    self.save_now();
                }
                HostAction::PersistBackground(hex) => {
                    if let Some(color) = Color::from_hex(&hex) {
                        self.background = color;
                    }
                    self.persisted_background = Some(hex);
                    self.save_now();
                }
            }
        }
    }

    fn on_page_loaded(&mut self, window: WindowId) {
        // Only the worker page counts; blank and splash loads do not.
        let Some(resource) = self.pending_opens.remove(&window) else {
            return;
        };
        if let Some(record) = self.registry.get_mut(window) {
            record.surface.push(&HostPush::OpenResource { path: resource });
        }

        match self.splash.as_mut() {
            Some(splash) if splash.target() == window && !splash.is_done() => {
                splash.target_ready(window);
            }
            _ => self.reveal(window),
        }
        self.deliver_pending_url();
    }

    fn on_navigation_blocked(&mut self, window: WindowId, url: &str) {
        if self.registry.open_external_link(url) {
            return;
        }
        tracing::debug!(window_id = %window, url, "handing blocked navigation to the system");
        if let Err(e) = self.services.shell.open_external(url) {
            tracing::warn!(url, error = %e, "could not open url externally");
        }
    }

    fn finish_splash(&mut self, outcome: SplashOutcome) {
        let Some(mut splash) = self.splash.take() else {
            return;
        };
        if outcome == SplashOutcome::TimedOut {
            tracing::warn!("splash reached its maximum duration");
        }
        splash.transition(&mut self.registry);
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    fn on_second_instance(&mut self, request: LaunchRequest, factory: &mut dyn WindowFactory) {
        let args = request
            .resource
            .iter()
            .chain(request.open_url.iter())
            .cloned()
            .collect();
        self.bus.publish(AppEvent::SecondInstance { args });

        if self.state == AppState::Booting {
            self.deferred.push(request);
            return;
        }

        if request.is_url_only() && self.registry.app_window_count() > 0 {
            self.pending_url = request.open_url;
            self.deliver_pending_url();
            if let Some(window) = self.registry.most_recent(&[WindowRole::Main]) {
                self.reveal(window);
            }
            return;
        }
        self.dispatch_launch(factory, request);
    }

    /// Open the requested resource, or a default window when there is none
    /// or it does not resolve.
    fn dispatch_launch(&mut self, factory: &mut dyn WindowFactory, request: LaunchRequest) {
        let resource = request.resource.as_deref().and_then(|raw| {
            match resolve_resource(raw, request.cwd.as_deref()) {
                Ok(path) => Some(path.to_string_lossy().into_owned()),
                Err(e) => {
                    tracing::warn!(error = %e, "opening default window instead");
                    None
                }
            }
        });
        if request.open_url.is_some() {
            self.pending_url = request.open_url;
        }

        let Some(url) = self.worker_url() else {
            tracing::warn!("worker not ready; launch dropped");
            return;
        };

        let early = self
            .early_window
            .take()
            .filter(|id| self.registry.contains(*id));
        let target = match early {
            Some(id) => {
                if let Some(record) = self.registry.get_mut(id) {
                    record.surface.load_url(&url);
                }
                id
            }
            None => match self.open_window(factory, WindowRole::Main, None, &url, false) {
                Ok(id) => id,
                Err(e) => {
                    if self.registry.app_window_count() == 0 {
                        self.fail(e);
                    } else {
                        tracing::error!(error = %e, "failed to open window");
                    }
                    return;
                }
            },
        };
        tracing::info!(window_id = %target, resource = ?resource, "dispatching launch");
        self.pending_opens.insert(target, resource);
    }

    fn worker_url(&self) -> Option<String> {
        let port = self.trust.bound_port()?;
        let entry = &self.config.window.entry_path;
        let sep = if entry.starts_with('/') { "" } else { "/" };
        Some(format!("{}{sep}{entry}", worker_origin(port)))
    }

    fn deliver_pending_url(&mut self) {
        let Some(url) = self.pending_url.take() else {
            return;
        };
        if !self.registry.open_external_link(&url) {
            tracing::warn!(url = %url, "no window accepted the url");
        }
    }

    fn reveal(&mut self, window: WindowId) {
        if let Some(record) = self.registry.get_mut(window) {
            if !record.surface.is_visible() {
                record.surface.show();
            }
            record.surface.focus();
        }
        self.registry.mark_visible(window);
    }

    // =========================================================================
    // WINDOWS
    // =========================================================================

    fn open_window(
        &mut self,
        factory: &mut dyn WindowFactory,
        role: WindowRole,
        name: Option<String>,
        url: &str,
        visible: bool,
    ) -> Result<WindowId, HostError> {
        let persisted = match self.store.load_window_state() {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::error!(error = %e, "failed to read window state");
                None
            }
        };
        let displays = self.services.displays.displays();
        let cursor = self.services.displays.cursor_position();
        let candidate = compute_initial_options(persisted.as_ref(), &displays, cursor);
        let placement = avoid_overlap(candidate, &self.registry.open_bounds(None), &displays, cursor);

        let chrome = self.chrome.mode();
        let cookie_header = self
            .trust
            .bound_port()
            .map(|port| ("Cookie".to_string(), self.trust.cookie_for(port).header_value()));
        let options = WindowOptions {
            role,
            name: name.clone(),
            title: self.config.window.title.clone(),
            url: url.to_string(),
            bounds: placement.bounds,
            min_size: (self.config.window.min_width, self.config.window.min_height),
            maximized: placement.maximized,
            fullscreen: placement.fullscreen,
            chrome,
            background: self.background,
            visible,
            cookie_header,
        };

        let id = self.registry.allocate_id();
        let surface = factory.create(id, &options)?;
        self.registry.register(id, role, name, chrome, surface);
        if visible {
            self.registry.mark_visible(id);
        }
        if let Some(record) = self.registry.get_mut(id) {
            record.surface.push(&HostPush::AppStateChanged { state: self.state });
        }
        self.bus.publish(AppEvent::WindowOpened(id));
        Ok(id)
    }

    fn capture(&self, window: WindowId) -> Option<PersistedWindowGeometry> {
        let record = self.registry.get(window)?;
        if record.role != WindowRole::Main {
            return None;
        }
        capture_geometry(
            record.surface.as_ref(),
            &self.services.displays.displays(),
            self.chrome.persisted(),
            self.persisted_background.clone(),
        )
    }

    fn schedule_save(&mut self, window: WindowId) {
        if self.registry.is_closing(window) {
            return;
        }
        if let Some(geometry) = self.capture(window) {
            self.writer.schedule(window, geometry);
        }
    }

    /// Write the most recent main window's record straight away.
    fn save_now(&mut self) {
        let Some(window) = self.registry.most_recent(&[WindowRole::Main]) else {
            return;
        };
        if let Some(geometry) = self.capture(window) {
            self.writer.flush(geometry);
        }
    }

    // =========================================================================
    // CLOSING
    // =========================================================================

    fn request_close(&mut self, window: WindowId, reason: CloseReason) {
        let Some(record) = self.registry.get(window) else {
            return;
        };
        if record.is_splash() {
            tracing::debug!(window_id = %window, "splash cannot be closed by the user");
            return;
        }
        if self.registry.is_closing(window) {
            tracing::debug!(window_id = %window, "close already pending");
            return;
        }

        self.registry.begin_close(window);
        match self.router.request_close(&mut self.registry, window, reason) {
            Some(pending) => self.await_reply(window, reason, pending),
            None => self.registry.cancel_close(window),
        }
    }

    fn await_reply(&self, window: WindowId, reason: CloseReason, pending: PendingReply) {
        let timeout = self.router.reply_timeout();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let outcome = pending.wait(timeout).await;
            let _ = events.send(HostEvent::CloseDecision {
                window,
                reason,
                outcome,
            });
        });
    }

    fn on_close_decision(
        &mut self,
        window: WindowId,
        reason: CloseReason,
        outcome: ReplyOutcome,
        factory: &mut dyn WindowFactory,
    ) {
        if reason == CloseReason::Quit {
            self.on_quit_decision(window, outcome);
            return;
        }
        if outcome.is_confirmed() {
            self.destroy_window(window, factory);
            return;
        }

        tracing::info!(window_id = %window, ?reason, ?outcome, "close vetoed");
        self.registry.cancel_close(window);
        if reason == CloseReason::Restart && self.registry.restart_target() == Some(window) {
            self.registry.end_restart();
        }
    }

    fn restart(&mut self, window: WindowId) {
        if !self.registry.contains(window) {
            return;
        }
        if !self.registry.begin_restart(window) {
            tracing::warn!(window_id = %window, "restart already in progress");
            return;
        }
        tracing::info!(window_id = %window, "restarting window");
        self.request_close(window, CloseReason::Restart);
        if !self.registry.is_closing(window) {
            self.registry.end_restart();
        }
    }

    /// Tear a window down and apply the restart and quit policies.
    fn destroy_window(&mut self, window: WindowId, factory: &mut dyn WindowFactory) {
        let Some(role) = self.remove_window(window) else {
            return;
        };

        if self.registry.restart_target() == Some(window) {
            self.dispatch_launch(factory, LaunchRequest::default());
            self.registry.end_restart();
            return;
        }
        if role != WindowRole::Splash
            && self.registry.app_window_count() == 0
            && !self.registry.is_restarting()
        {
            tracing::info!("last window closed");
            self.begin_shutdown();
        }
    }

    fn remove_window(&mut self, window: WindowId) -> Option<WindowRole> {
        let role = self.registry.get(window)?.role;
        if let Some(geometry) = self.capture(window) {
            self.writer.flush(geometry);
        }
        self.writer.window_closed(window);
        self.router.dispose_window(window);
        self.pending_opens.remove(&window);
        self.quit_waiting.remove(&window);
        if self.early_window == Some(window) {
            self.early_window = None;
        }
        if let Some(mut record) = self.registry.remove(window) {
            record.surface.destroy();
        }
        self.bus.publish(AppEvent::WindowClosed(window));
        Some(role)
    }

    // =========================================================================
    // QUIT AND SHUTDOWN
    // =========================================================================

    /// Ask every window whether the app may quit.
    pub fn request_quit(&mut self) {
        match self.state {
            AppState::Stopping => return,
            AppState::Booting => {
                self.begin_shutdown();
                return;
            }
            AppState::Running => {}
        }
        if !self.quit_waiting.is_empty() {
            tracing::debug!("quit already pending");
            return;
        }

        let windows: Vec<WindowId> = self
            .registry
            .ids()
            .into_iter()
            .filter(|id| self.registry.get(*id).is_some_and(|r| !r.is_splash()))
            .collect();
        for window in windows {
            if let Some(pending) = self.router.about_to_close(&mut self.registry, window, CloseReason::Quit) {
                self.quit_waiting.insert(window);
                self.await_reply(window, CloseReason::Quit, pending);
            }
        }
        if self.quit_waiting.is_empty() {
            self.begin_shutdown();
        }
    }

    fn on_quit_decision(&mut self, window: WindowId, outcome: ReplyOutcome) {
        if !self.quit_waiting.contains(&window) {
            return;
        }
        if !outcome.is_confirmed() {
            tracing::info!(window_id = %window, ?outcome, "quit vetoed");
            self.quit_waiting.clear();
            return;
        }
        self.quit_waiting.remove(&window);
        if self.quit_waiting.is_empty() {
            self.begin_shutdown();
        }
    }

    /// Close every window and flush state. The rest happens once the
    /// writer confirms with [`HostEvent::StateFlushed`].
    fn begin_shutdown(&mut self) {
        if self.state == AppState::Stopping {
            return;
        }
        self.set_state(AppState::Stopping);

        // Least recently focused first, so the last geometry written is the
        // window the user was looking at.
        for window in self.registry.ids().into_iter().rev() {
            self.remove_window(window);
        }
        self.splash = None;

        let writer = self.writer.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            writer.shutdown().await;
            let _ = events.send(HostEvent::StateFlushed);
        });
    }

    fn finish_shutdown(&mut self) {
        if self.finished {
            return;
        }
        if self.features_started {
            self.features.stop_all();
        }
        if let Some(start) = self.worker_start.take() {
            // Cancelling the start stops whatever it already spawned.
            tracing::info!("worker still starting; abandoning it");
            start.abort();
        }
        if let Some(mut worker) = self.worker.take() {
            if let Err(e) = worker.terminate() {
                tracing::error!(error = %e, "failed to stop worker");
                self.exit_code = Some(1);
            }
        }
        self.finished = true;
        tracing::info!(exit_code = self.exit_code.unwrap_or(0), "shutdown complete");
    }
}

impl Drop for HostController {
    fn drop(&mut self) {
        if let Some(start) = self.worker_start.take() {
            start.abort();
        }
    }
}

/// Splash content is either a URL or a local file.
fn splash_url(content: &str) -> String {
    if content.contains("://") || content.starts_with("about:") {
        content.to_string()
    } else {
        format!("file://{content}")
    }
}

#[cfg(test)]
mod tests;
