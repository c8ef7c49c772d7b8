//! Optional splash window shown while the first window gets ready.
//!
//! Two clocks race. The minimum keeps the splash up for at least that
//! long even when the target is ready right away; the maximum tears it
//! down even if the target never signals. The loser is dropped, which
//! cancels it.

use std::time::Duration;

use kiln_common::{Display, Rect, WindowId};
use kiln_config::SplashConfig;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::window_state::nearest_display;
use crate::windows::WindowRegistry;

pub const DEFAULT_SPLASH_SIZE: (u32, u32) = (640, 480);

/// How the race ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashOutcome {
    /// Target was ready and the minimum had elapsed.
    Ready,
    /// Maximum elapsed first.
    TimedOut,
}

/// Splash bounds: configured size (or 640x480) centered on the display
/// nearest the target window's center.
pub fn splash_bounds(target: Rect, displays: &[Display], config: &SplashConfig) -> Rect {
    let width = config.width.unwrap_or(DEFAULT_SPLASH_SIZE.0) as i32;
    let height = config.height.unwrap_or(DEFAULT_SPLASH_SIZE.1) as i32;
    let area = nearest_display(displays, target.center())
        .map(|d| d.bounds)
        .unwrap_or(target);
    area.centered(width, height)
}

/// Resolve once the splash may go away.
///
/// Both clocks start now. A dropped `ready` sender counts as "never ready".
pub async fn race(min: Duration, max: Duration, ready: oneshot::Receiver<()>) -> SplashOutcome {
    let started = Instant::now();
    let ready_path = async {
        if ready.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep_until(started + min).await;
    };

    tokio::select! {
        biased;
        () = ready_path => SplashOutcome::Ready,
        () = tokio::time::sleep_until(started + max) => SplashOutcome::TimedOut,
    }
}

/// Splash state owned by the host controller.
pub struct SplashCoordinator {
    splash: WindowId,
    target: WindowId,
    ready: Option<oneshot::Sender<()>>,
    done: bool,
}

impl SplashCoordinator {
    /// Returns the coordinator and the receiver to feed into [`race`].
    pub fn new(splash: WindowId, target: WindowId) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                splash,
                target,
                ready: Some(tx),
                done: false,
            },
            rx,
        )
    }

    pub fn splash(&self) -> WindowId {
        self.splash
    }

    pub fn target(&self) -> WindowId {
        self.target
    }

    /// The target painted its first frame.
    pub fn target_ready(&mut self, window: WindowId) {
        if window != self.target {
            return;
        }
        if let Some(tx) = self.ready.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Show the target if needed and close the splash. Only the first call
    /// does anything; returns whether this call did the work.
    pub fn transition(&mut self, registry: &mut WindowRegistry) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        self.ready = None;

        if let Some(record) = registry.get_mut(self.target) {
            if !record.surface.is_visible() {
                record.surface.show();
            }
            record.surface.focus();
        }
        registry.mark_visible(self.target);
        if let Some(mut record) = registry.remove(self.splash) {
            record.surface.destroy();
        }
        tracing::debug!(splash = %self.splash, target = %self.target, "splash dismissed");
        true
    }
}
