//! Canvas geometry primitives.

use serde::{Deserialize, Serialize};

/// Grid unit for position snapping, in canvas pixels.
pub const GRID_UNIT: f64 = 20.0;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snap both coordinates to the nearest grid line.
    pub fn snapped(self) -> Self {
        Self {
            x: (self.x / GRID_UNIT).round() * GRID_UNIT,
            y: (self.y / GRID_UNIT).round() * GRID_UNIT,
        }
    }

    /// Clamp both coordinates to be non-negative.
    pub fn floored(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

/// The rectangular region tables may be placed in. Never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            min_x: GRID_UNIT,
            min_y: GRID_UNIT,
            width: 3000.0,
            height: 2000.0,
            padding: 40.0,
        }
    }
}

impl CanvasBounds {
    /// Top-left placement anchor, snapped to the grid.
    pub fn anchor(&self) -> Point {
        Point::new(self.min_x + self.padding, self.min_y + self.padding).snapped()
    }

    /// Clamp a candidate position so a box of the given size stays fully
    /// inside the padded region.
    pub fn clamp(&self, position: Point, box_width: f64, box_height: f64) -> Point {
        let max_x = self.min_x + self.width - box_width - self.padding;
        let max_y = self.min_y + self.height - box_height - self.padding;
        Point {
            x: position.x.min(max_x).max(self.min_x + self.padding),
            y: position.y.min(max_y).max(self.min_y + self.padding),
        }
    }
}
