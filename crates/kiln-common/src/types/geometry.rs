use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Squared distance from `p` to the closest point of this rectangle.
    /// Zero when `p` lies inside.
    pub fn distance_sq(&self, p: Point) -> i64 {
        let clamp = |v: i32, lo: i32, hi: i32| v.max(lo).min(hi);
        let cx = clamp(p.x, self.x, self.x + self.width);
        let cy = clamp(p.y, self.y, self.y + self.height);
        let dx = i64::from(p.x - cx);
        let dy = i64::from(p.y - cy);
        dx * dx + dy * dy
    }

    /// A `width` x `height` rectangle centered inside this one.
    pub fn centered(&self, width: i32, height: i32) -> Rect {
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }
}

/// One attached monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub bounds: Rect,
    /// Bounds minus taskbars/docks. Equal to `bounds` when the platform
    /// cannot tell.
    pub work_area: Rect,
    pub scale_factor: f64,
}

impl Display {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            work_area: bounds,
            scale_factor: 1.0,
        }
    }
}
