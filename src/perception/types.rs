use serde::{Deserialize, Serialize};

/// Axis-aligned box in screen pixels, `x1 < x2`, `y1 < y2`.
/// Produced fresh by each capture; never reused across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    /// True when `other` lies fully inside this box (edges included).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && self.x2 >= other.x2 && self.y2 >= other.y2
    }

    /// Centre of the box, rounded to integer pixel coordinates.
    pub fn center(&self) -> (i32, i32) {
        (
            ((self.x1 + self.x2) / 2.0).round() as i32,
            ((self.y1 + self.y2) / 2.0).round() as i32,
        )
    }
}

/// A detected interactive element. `id` addresses the element only within
/// the snapshot it was resolved from; it is not a durable handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UIElement {
    pub id: usize,
    pub bounds: BoundingBox,
}

/// The element list for one engine step. Superseded by the next capture;
/// the engine holds at most the latest snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub elements: Vec<UIElement>,
    pub width: u32,
    pub height: u32,
}

impl ScreenSnapshot {
    pub fn element(&self, id: usize) -> Option<&UIElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Raw output of the snapshot boundary: detector boxes plus the screenshot
/// they were detected on. Boxes share the `width`×`height` pixel space.
#[derive(Debug, Clone)]
pub struct RawCapture {
    pub boxes: Vec<BoundingBox>,
    pub width: u32,
    pub height: u32,
    pub image_png: Vec<u8>,
}
