// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear nearest-point search over arc-length sampled curves.

use core::fmt;
use core::time::Duration;

use kurbo::Point;

use crate::Curve;

/// Default number of uniform arc-length steps for the coarse scan.
pub const DEFAULT_SAMPLE_RATE: usize = 100;

/// Number of interval refinement iterations after the coarse scan.
const REFINE_ITERATIONS: usize = 5;

/// Result of a nearest-point query against a single curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult {
    /// The nearest point found on the curve.
    pub point: Point,
    /// Euclidean distance from the query to [`Self::point`].
    pub distance: f64,
    /// Arc length from the start of the curve to [`Self::point`].
    pub arclen: f64,
    /// Index of the curve this result came from.
    pub curve: usize,
    /// Number of coarse samples evaluated.
    pub samples_checked: usize,
    /// Wall-clock time spent in the query. Zero without the `std` feature.
    pub elapsed: Duration,
}

/// Nearest-point search by coarse uniform scan plus interval refinement.
///
/// The searcher walks `sample_rate + 1` uniform arc-length steps to find the
/// closest sample, then narrows the bracket one sample step to either side
/// of it: each refinement iteration evaluates the bracket at fractions 0.33
/// and 0.67 and keeps the half containing the closer of the two, discarding
/// roughly a third of the interval per iteration. This is not a
/// golden-section search; the fixed iteration count bounds per-query work
/// regardless of curve complexity.
///
/// Queries take `&self` and never allocate.
pub struct LinearSearch<'c, C: Curve + ?Sized> {
    curve: &'c C,
    curve_index: usize,
    sample_rate: usize,
    path_length: f64,
    sample_step: f64,
}

impl<C: Curve + ?Sized> fmt::Debug for LinearSearch<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearSearch")
            .field("curve_index", &self.curve_index)
            .field("sample_rate", &self.sample_rate)
            .field("path_length", &self.path_length)
            .finish_non_exhaustive()
    }
}

impl<'c, C: Curve + ?Sized> LinearSearch<'c, C> {
    /// Create a searcher over `curve` with the default sample rate.
    pub fn new(curve: &'c C, curve_index: usize) -> Self {
        Self::with_sample_rate(curve, curve_index, DEFAULT_SAMPLE_RATE)
    }

    /// Create a searcher with an explicit sample rate (must be at least 1).
    ///
    /// The curve's arc length is computed once here; queries only evaluate
    /// points.
    pub fn with_sample_rate(curve: &'c C, curve_index: usize, sample_rate: usize) -> Self {
        debug_assert!(sample_rate >= 1, "sample_rate must be at least 1");
        let path_length = curve.length();
        Self {
            curve,
            curve_index,
            sample_rate,
            path_length,
            sample_step: path_length / sample_rate as f64,
        }
    }

    /// Arc length of the underlying curve, as measured at construction.
    pub fn path_length(&self) -> f64 {
        self.path_length
    }

    /// Find the nearest point on the curve to `query`.
    ///
    /// Always returns a result; on a degenerate (zero length) curve every
    /// sample coincides and refinement is a no-op.
    pub fn find_nearest(&self, query: Point) -> SearchResult {
        #[cfg(feature = "std")]
        let start = std::time::Instant::now();

        // Coarse scan over the uniform samples.
        let mut best_arclen = 0.0;
        let mut best_dist = f64::INFINITY;
        for i in 0..=self.sample_rate {
            let s = self.path_length * (i as f64) / (self.sample_rate as f64);
            let d = query.distance(self.curve.point_at_length(s));
            if d < best_dist {
                best_dist = d;
                best_arclen = s;
            }
        }

        // Narrow the bracket around the best sample.
        let mut lo = (best_arclen - self.sample_step).max(0.0);
        let mut hi = (best_arclen + self.sample_step).min(self.path_length);
        for _ in 0..REFINE_ITERATIONS {
            let span = hi - lo;
            let t1 = lo + span * 0.33;
            let t2 = lo + span * 0.67;
            let d1 = query.distance(self.curve.point_at_length(t1));
            let d2 = query.distance(self.curve.point_at_length(t2));
            if d1 < d2 {
                hi = t2;
            } else {
                lo = t1;
            }
        }

        // Refinement can only improve on the coarse scan or tie it; keep
        // whichever candidate is closer.
        let refined_arclen = 0.5 * (lo + hi);
        let refined_point = self.curve.point_at_length(refined_arclen);
        let refined_dist = query.distance(refined_point);
        let (point, distance, arclen) = if refined_dist <= best_dist {
            (refined_point, refined_dist, refined_arclen)
        } else {
            (
                self.curve.point_at_length(best_arclen),
                best_dist,
                best_arclen,
            )
        };

        #[cfg(feature = "std")]
        let elapsed = start.elapsed();
        #[cfg(not(feature = "std"))]
        let elapsed = Duration::ZERO;

        SearchResult {
            point,
            distance,
            arclen,
            curve: self.curve_index,
            samples_checked: self.sample_rate + 1,
            elapsed,
        }
    }
}

/// Run every searcher and keep the globally nearest result.
///
/// `samples_checked` and `elapsed` in the returned result are totals across
/// all searchers. Returns `None` for an empty slice. There is no cross-curve
/// pruning; each curve is scanned independently.
pub fn nearest_among<C: Curve + ?Sized>(
    searchers: &[LinearSearch<'_, C>],
    query: Point,
) -> Option<SearchResult> {
    let mut best: Option<SearchResult> = None;
    let mut samples_total = 0;
    let mut elapsed_total = Duration::ZERO;
    for searcher in searchers {
        let result = searcher.find_nearest(query);
        samples_total += result.samples_checked;
        elapsed_total += result.elapsed;
        match &best {
            Some(b) if b.distance <= result.distance => {}
            _ => best = Some(result),
        }
    }
    best.map(|mut b| {
        b.samples_checked = samples_total;
        b.elapsed = elapsed_total;
        b
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{BezPath, Line};

    #[test]
    fn straight_line_projects_to_foot() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        let search = LinearSearch::new(&line, 0);
        let result = search.find_nearest(Point::new(5.0, 3.0));
        assert!((result.point.x - 5.0).abs() < 1e-3);
        assert!(result.point.y.abs() < 1e-9);
        assert!((result.distance - 3.0).abs() < 1e-6);
        assert_eq!(result.curve, 0);
        assert_eq!(result.samples_checked, DEFAULT_SAMPLE_RATE + 1);
    }

    #[test]
    fn refinement_never_worse_than_coarse_scan() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((30.0, 80.0), (70.0, -40.0), (100.0, 20.0));
        let search = LinearSearch::new(&path, 0);
        let query = Point::new(48.0, 35.0);

        // Coarse minimum recomputed directly from the shared sampling.
        let coarse = crate::sample_curve(&path, 0, DEFAULT_SAMPLE_RATE)
            .iter()
            .map(|s| query.distance(s.point))
            .fold(f64::INFINITY, f64::min);

        let result = search.find_nearest(query);
        assert!(
            result.distance <= coarse + 1e-12,
            "refined {} exceeds coarse {}",
            result.distance,
            coarse
        );
    }

    #[test]
    fn on_curve_midpoint_query_has_zero_distance() {
        // At rate 10 the coarse sample i=5 lands exactly on the query, so
        // the result must be the midpoint itself at distance zero.
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        let search = LinearSearch::with_sample_rate(&line, 0, 10);
        let result = search.find_nearest(Point::new(5.0, 0.0));
        assert!(result.distance < 1e-12, "distance {}", result.distance);
        assert!((result.point.x - 5.0).abs() < 1e-12);
        assert!(result.point.y.abs() < 1e-12);
        assert_eq!(result.samples_checked, 11);
    }

    #[test]
    fn degenerate_curve_returns_constant_distance() {
        let line = Line::new((4.0, 4.0), (4.0, 4.0));
        let search = LinearSearch::new(&line, 7);
        let result = search.find_nearest(Point::new(1.0, 0.0));
        assert_eq!(result.point, Point::new(4.0, 4.0));
        assert!((result.distance - 5.0).abs() < 1e-9);
        assert_eq!(result.arclen, 0.0);
        assert_eq!(result.curve, 7);
    }

    #[test]
    fn endpoint_queries_clamp_to_curve() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        let search = LinearSearch::new(&line, 0);
        let result = search.find_nearest(Point::new(-20.0, 0.0));
        assert!(result.point.x.abs() < 1e-6);
        assert!((result.distance - 20.0).abs() < 1e-3);
    }

    #[test]
    fn nearest_among_picks_closest_curve_and_sums_work() {
        let near = Line::new((0.0, 0.0), (10.0, 0.0));
        let far = Line::new((0.0, 100.0), (10.0, 100.0));
        let searchers = [LinearSearch::new(&near, 0), LinearSearch::new(&far, 1)];
        let result = nearest_among(&searchers, Point::new(5.0, 1.0)).unwrap();
        assert_eq!(result.curve, 0);
        assert_eq!(result.samples_checked, 2 * (DEFAULT_SAMPLE_RATE + 1));
        assert!((result.distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nearest_among_empty_is_none() {
        let searchers: [LinearSearch<'_, Line>; 0] = [];
        assert!(nearest_among(&searchers, Point::ZERO).is_none());
    }
}
