//! Remembered window geometry and where new windows go.
//!
//! Geometry is only trusted on the display layout it was saved under. The
//! layout identity is a fingerprint of every attached display's bounds, so
//! plugging in or rearranging a monitor makes the saved geometry fall back
//! to centered defaults.

mod store;
mod writer;

use kiln_common::{ChromeMode, Display, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::surface::WindowSurface;

pub use store::{StateStore, WINDOW_STATE_KEY};
pub use writer::GeometryWriter;

/// Fixed nudge applied when a new window would line up with an open one.
pub const OVERLAP_STEP: i32 = 30;

/// Extra attempts beyond one per open window before giving up.
pub const OVERLAP_SLACK: usize = 4;

/// Used when the platform reports no displays at all.
const FALLBACK_DISPLAY: Rect = Rect::new(0, 0, 1280, 800);

/// The persisted window record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedWindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub maximized: bool,
    pub fullscreen: bool,
    pub chrome_mode: Option<ChromeMode>,
    pub display_fingerprint: String,
    pub background_color: Option<String>,
}

impl Default for PersistedWindowGeometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            maximized: false,
            fullscreen: false,
            chrome_mode: None,
            display_fingerprint: String::new(),
            background_color: None,
        }
    }
}

impl PersistedWindowGeometry {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Where and how a new window opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlacement {
    pub bounds: Rect,
    pub maximized: bool,
    pub fullscreen: bool,
}

impl WindowPlacement {
    pub fn normal(bounds: Rect) -> Self {
        Self {
            bounds,
            maximized: false,
            fullscreen: false,
        }
    }
}

/// Order-independent identity of the attached display layout.
pub fn display_fingerprint(displays: &[Display]) -> String {
    let mut parts: Vec<String> = displays
        .iter()
        .map(|d| {
            let b = d.bounds;
            format!("{}:{}:{}:{}", b.x, b.y, b.width, b.height)
        })
        .collect();
    parts.sort();
    parts.join(",")
}

/// The display closest to `point`; the first one wins ties.
pub fn nearest_display(displays: &[Display], point: Point) -> Option<&Display> {
    displays.iter().min_by_key(|d| d.bounds.distance_sq(point))
}

/// Two thirds of the work area of the display nearest `cursor`, centered.
pub fn default_placement(displays: &[Display], cursor: Point) -> WindowPlacement {
    let area = nearest_display(displays, cursor)
        .map(|d| d.work_area)
        .unwrap_or(FALLBACK_DISPLAY);
    let width = area.width * 2 / 3;
    let height = area.height * 2 / 3;
    WindowPlacement::normal(area.centered(width, height))
}

/// Reuse the persisted geometry only on the layout it was saved under.
pub fn compute_initial_options(
    persisted: Option<&PersistedWindowGeometry>,
    displays: &[Display],
    cursor: Point,
) -> WindowPlacement {
    let live = display_fingerprint(displays);
    match persisted {
        Some(saved) if saved.display_fingerprint == live && saved.is_usable() => WindowPlacement {
            bounds: saved.bounds(),
            maximized: saved.maximized,
            fullscreen: saved.fullscreen,
        },
        Some(_) => {
            tracing::debug!(fingerprint = %live, "display layout changed; using default geometry");
            default_placement(displays, cursor)
        }
        None => default_placement(displays, cursor),
    }
}

/// Snapshot a live window for saving. `None` once the surface is gone.
pub fn capture_geometry(
    surface: &dyn WindowSurface,
    displays: &[Display],
    chrome_mode: Option<ChromeMode>,
    background_color: Option<String>,
) -> Option<PersistedWindowGeometry> {
    if surface.is_destroyed() {
        return None;
    }
    let bounds = surface.bounds()?;
    Some(PersistedWindowGeometry {
        x: bounds.x,
        y: bounds.y,
        width: bounds.width,
        height: bounds.height,
        maximized: surface.is_maximized(),
        fullscreen: surface.is_full_screen(),
        chrome_mode,
        display_fingerprint: display_fingerprint(displays),
        background_color,
    })
}

fn collides(candidate: Rect, open: &[Rect]) -> bool {
    open.iter().any(|o| o.x == candidate.x || o.y == candidate.y)
}

/// Nudge a new window so its origin doesn't line up with an open window.
///
/// A candidate that already clears every open window is kept as-is.
/// Otherwise maximized and fullscreen candidates are swapped for a centered
/// default before offsetting. The loop runs at most
/// `open.len() + OVERLAP_SLACK` times; if it still collides the last
/// offset wins.
pub fn avoid_overlap(
    candidate: WindowPlacement,
    open: &[Rect],
    displays: &[Display],
    cursor: Point,
) -> WindowPlacement {
    if !collides(candidate.bounds, open) {
        return candidate;
    }

    let mut placement = candidate;
    if placement.maximized || placement.fullscreen {
        placement = default_placement(displays, cursor);
    }

    let cap = open.len() + OVERLAP_SLACK;
    for _ in 0..cap {
        if !collides(placement.bounds, open) {
            return placement;
        }
        placement.bounds.x += OVERLAP_STEP;
        placement.bounds.y += OVERLAP_STEP;
    }

    if collides(placement.bounds, open) {
        tracing::debug!(
            x = placement.bounds.x,
            y = placement.bounds.y,
            attempts = cap,
            "overlap avoidance gave up"
        );
    }
    placement
}
