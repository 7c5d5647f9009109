// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

/// Half-open containment: `x ∈ [x0, x1)`, `y ∈ [y0, y1)`.
///
/// Used when assigning a point to a node, so a point on a shared child edge
/// is owned by exactly one child.
pub(crate) fn contains_half_open(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1
}

/// Closed containment: `x ∈ [x0, x1]`, `y ∈ [y0, y1]`.
///
/// Used when matching points against a query window, so a candidate sitting
/// exactly on the window edge is still reported.
pub(crate) fn contains_closed(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Edge-inclusive AABB overlap test.
pub(crate) fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
