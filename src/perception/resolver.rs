//! Turns the detector's raw box set into a stable, addressable element list.
//!
//! Three passes: drop degenerate boxes, suppress boxes fully enclosed by a
//! larger surviving box, then sort into reading order on a coarse grid and
//! assign sequential ids. Pure functions; idempotent for a given input.

use crate::perception::types::{BoundingBox, RawCapture, ScreenSnapshot, UIElement};

/// Pixel size of the row/column buckets used for reading-order sorting.
/// Tunable constant, not derived from screen geometry.
pub const DEFAULT_GRID_BUCKET: f32 = 30.0;

/// Resolve raw detector boxes into the canonical element list.
pub fn resolve_elements(raw: &[BoundingBox], grid_bucket: f32) -> Vec<UIElement> {
    let survivors = filter_contained(raw);
    order_and_assign(survivors, grid_bucket)
}

/// Build a [`ScreenSnapshot`] straight from a capture.
pub fn build_snapshot(capture: &RawCapture, grid_bucket: f32) -> ScreenSnapshot {
    ScreenSnapshot {
        elements: resolve_elements(&capture.boxes, grid_bucket),
        width: capture.width,
        height: capture.height,
    }
}

/// Containment suppression: every box fully enclosed by another surviving
/// box is removed. Walking in area-descending order makes the tie-break for
/// identical boxes deterministic: the first in sort order survives.
fn filter_contained(raw: &[BoundingBox]) -> Vec<BoundingBox> {
    // Degenerate boxes would corrupt the area ordering below.
    let boxes: Vec<BoundingBox> = raw.iter().copied().filter(|b| b.area() > 0.0).collect();
    if boxes.len() != raw.len() {
        tracing::debug!(
            dropped = raw.len() - boxes.len(),
            "discarded zero/negative-area detector boxes"
        );
    }
    if boxes.len() <= 1 {
        return boxes;
    }

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[b]
            .area()
            .partial_cmp(&boxes[a].area())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = vec![true; boxes.len()];
    for (pos, &i) in order.iter().enumerate() {
        if !keep[i] {
            continue;
        }
        for &j in &order[pos + 1..] {
            if keep[j] && boxes[i].contains(&boxes[j]) {
                keep[j] = false;
            }
        }
    }

    boxes
        .into_iter()
        .zip(keep)
        .filter_map(|(b, k)| k.then_some(b))
        .collect()
}

/// Stable sort by (row bucket of center-y, column bucket of left edge),
/// then assign ids 0..n-1 in that order. Approximates reading order.
fn order_and_assign(mut boxes: Vec<BoundingBox>, grid_bucket: f32) -> Vec<UIElement> {
    boxes.sort_by_key(|b| {
        let center_y = (b.y1 + b.y2) / 2.0;
        (
            (center_y / grid_bucket).floor() as i64,
            (b.x1 / grid_bucket).floor() as i64,
        )
    });
    boxes
        .into_iter()
        .enumerate()
        .map(|(id, bounds)| UIElement { id, bounds })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x1: f32, y1: f32, x2: f32, y2: f32) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2)
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(resolve_elements(&[], DEFAULT_GRID_BUCKET).is_empty());
    }

    #[test]
    fn degenerate_boxes_are_dropped() {
        let raw = vec![bb(10.0, 10.0, 10.0, 50.0), bb(5.0, 5.0, 4.0, 4.0)];
        assert!(resolve_elements(&raw, DEFAULT_GRID_BUCKET).is_empty());
    }

    #[test]
    fn enclosed_box_is_suppressed() {
        let raw = vec![
            bb(10.0, 10.0, 100.0, 100.0),
            bb(30.0, 30.0, 70.0, 70.0),
            bb(200.0, 200.0, 250.0, 250.0),
        ];
        let elements = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].bounds, bb(10.0, 10.0, 100.0, 100.0));
        assert_eq!(elements[1].bounds, bb(200.0, 200.0, 250.0, 250.0));
    }

    #[test]
    fn identical_boxes_dedupe_to_one() {
        let raw = vec![bb(0.0, 0.0, 50.0, 50.0), bb(0.0, 0.0, 50.0, 50.0)];
        let elements = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn no_survivor_contains_another() {
        let raw = vec![
            bb(0.0, 0.0, 300.0, 300.0),
            bb(10.0, 10.0, 100.0, 100.0),
            bb(20.0, 20.0, 60.0, 60.0),
            bb(150.0, 150.0, 280.0, 290.0),
            bb(310.0, 0.0, 400.0, 80.0),
        ];
        let elements = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        for a in &elements {
            for b in &elements {
                if a.id != b.id {
                    assert!(!a.bounds.contains(&b.bounds), "{:?} contains {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn reading_order_rows_then_columns() {
        // Row buckets from center_y: the first two share a row, the third
        // sits below despite the same left edge as the first.
        let raw = vec![
            bb(40.0, 0.0, 50.0, 60.0),
            bb(0.0, 65.0, 10.0, 125.0),
            bb(0.0, 0.0, 10.0, 60.0),
        ];
        let elements = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].bounds, bb(0.0, 0.0, 10.0, 60.0));
        assert_eq!(elements[1].bounds, bb(40.0, 0.0, 50.0, 60.0));
        assert_eq!(elements[2].bounds, bb(0.0, 65.0, 10.0, 125.0));
    }

    #[test]
    fn ids_are_sequential_from_zero() {
        let raw = vec![
            bb(0.0, 0.0, 20.0, 20.0),
            bb(100.0, 0.0, 120.0, 20.0),
            bb(0.0, 100.0, 20.0, 120.0),
            bb(100.0, 100.0, 120.0, 120.0),
        ];
        let elements = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        let ids: Vec<usize> = elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn resolver_is_idempotent() {
        let raw = vec![
            bb(5.0, 5.0, 90.0, 40.0),
            bb(10.0, 10.0, 30.0, 30.0),
            bb(200.0, 8.0, 260.0, 44.0),
            bb(12.0, 100.0, 88.0, 140.0),
        ];
        let first = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        let second = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        assert_eq!(first, second);
    }

    #[test]
    fn ties_preserve_detector_emission_order() {
        // Same grid cell for both; the stable sort must keep input order.
        let raw = vec![bb(2.0, 2.0, 12.0, 12.0), bb(4.0, 4.0, 13.0, 13.0)];
        let elements = resolve_elements(&raw, DEFAULT_GRID_BUCKET);
        assert_eq!(elements[0].bounds, raw[0]);
        assert_eq!(elements[1].bounds, raw[1]);
    }
}
