//! Conversion between host geometry and winit / wry types.
//!
//! Host rects are logical pixels; winit reports physical ones.

use kiln_common::{Display, Rect};
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize};

// =============================================================================
// COORDINATE CONVERSION
// =============================================================================

pub fn rect_from_physical(
    position: PhysicalPosition<i32>,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> Rect {
    let position: LogicalPosition<i32> = position.to_logical(scale_factor);
    let size: LogicalSize<i32> = size.to_logical(scale_factor);
    Rect::new(position.x, position.y, size.width, size.height)
}

/// Split a host rect into a winit position and size. Negative sizes clamp to zero.
pub fn rect_to_logical(rect: Rect) -> (LogicalPosition<i32>, LogicalSize<u32>) {
    (
        LogicalPosition::new(rect.x, rect.y),
        LogicalSize::new(rect.width.max(0) as u32, rect.height.max(0) as u32),
    )
}

pub fn monitor_display(
    position: PhysicalPosition<i32>,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> Display {
    Display {
        scale_factor,
        ..Display::new(rect_from_physical(position, size, scale_factor))
    }
}

/// Bounds for a child webview covering the whole client area.
pub fn fill_bounds(size: PhysicalSize<u32>) -> wry::Rect {
    wry::Rect {
        position: wry::dpi::Position::Physical(wry::dpi::PhysicalPosition::new(0, 0)),
        size: wry::dpi::Size::Physical(wry::dpi::PhysicalSize::new(size.width, size.height)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
