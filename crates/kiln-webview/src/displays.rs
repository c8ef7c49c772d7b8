//! Monitor layout as the host sees it.
//!
//! winit only reports monitors while the event loop is running, so the
//! app refreshes this snapshot from the loop and the host reads it.

use std::cell::RefCell;
use std::rc::Rc;

use kiln_common::{Display, Point};
use kiln_core::DisplayProvider;
use winit::event_loop::ActiveEventLoop;

use crate::convert::monitor_display;

#[derive(Debug, Default)]
struct Snapshot {
    displays: Vec<Display>,
    cursor: Point,
}

/// Cheap to clone; clones share one snapshot.
#[derive(Clone, Default)]
pub struct MonitorDisplays {
    inner: Rc<RefCell<Snapshot>>,
}

impl MonitorDisplays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&self, event_loop: &ActiveEventLoop) {
        let displays = event_loop
            .available_monitors()
            .map(|m| monitor_display(m.position(), m.size(), m.scale_factor()))
            .collect();
        self.set_displays(displays);
    }

    pub fn set_displays(&self, displays: Vec<Display>) {
        self.inner.borrow_mut().displays = displays;
    }

    /// Last known pointer position in screen coordinates.
    pub fn set_cursor(&self, point: Point) {
        self.inner.borrow_mut().cursor = point;
    }
}

impl DisplayProvider for MonitorDisplays {
    fn displays(&self) -> Vec<Display> {
        self.inner.borrow().displays.clone()
    }

    fn cursor_position(&self) -> Point {
        self.inner.borrow().cursor
    }
}
