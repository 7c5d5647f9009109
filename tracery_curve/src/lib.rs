// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arc-length curve sampling and linear nearest-point search.
//!
//! This crate provides the curve-side primitives shared by the Tracery
//! spatial crates, built on top of [`kurbo`]:
//!
//! - [`Curve`] – a minimal arc-length parameterization trait, implemented
//!   here for [`BezPath`] and [`Line`]. Curves are owned by the caller;
//!   samplers and searchers only borrow them.
//! - [`SampledPoint`] – one point taken at a uniform arc-length step,
//!   tagged with its source curve index and arc length.
//! - [`sample_curve`] – uniform arc-length sampling, the shared contract
//!   used both for direct linear scans and for building spatial indices.
//! - [`search::LinearSearch`] – the baseline nearest-point query: a coarse
//!   scan over the uniform samples followed by a fixed number of interval
//!   refinement steps around the best sample.
//!
//! The linear searcher is deliberately simple and allocation-free per
//! query; it is the reference answer that index-backed searchers (e.g.
//! `tracery_quadtree`) are measured against.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::vec::Vec;

use kurbo::{BezPath, Line, ParamCurve, ParamCurveArclen, Point, Rect, Shape};

pub mod search;

/// Accuracy used for arc length computation and inversion on path segments.
///
/// Sampling feeds interactive queries, so this favors speed over exactness;
/// the refinement pass in [`search::LinearSearch`] absorbs the residual
/// parameterization error.
const ARCLEN_ACCURACY: f64 = 1e-6;

/// A curve that can be addressed by arc length.
///
/// `point_at_length` clamps its argument to `[0, length]`, so callers may
/// pass slightly out-of-range values produced by interval arithmetic
/// without checking first.
pub trait Curve {
    /// Total arc length of the curve.
    fn length(&self) -> f64;

    /// The point at arc length `s` from the start, clamped to the curve.
    fn point_at_length(&self, s: f64) -> Point;

    /// Axis-aligned bounding box of the curve.
    fn bounds(&self) -> Rect;
}

impl Curve for BezPath {
    fn length(&self) -> f64 {
        self.segments().map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum()
    }

    fn point_at_length(&self, s: f64) -> Point {
        let mut remaining = s.max(0.0);
        let mut last = None;
        for seg in self.segments() {
            let len = seg.arclen(ARCLEN_ACCURACY);
            if remaining <= len {
                let t = seg.inv_arclen(remaining, ARCLEN_ACCURACY);
                return seg.eval(t);
            }
            remaining -= len;
            last = Some(seg);
        }
        // Past the end (or an empty path): the final on-curve point.
        match last {
            Some(seg) => seg.eval(1.0),
            None => Point::ZERO,
        }
    }

    fn bounds(&self) -> Rect {
        self.bounding_box()
    }
}

impl Curve for Line {
    fn length(&self) -> f64 {
        self.arclen(ARCLEN_ACCURACY)
    }

    fn point_at_length(&self, s: f64) -> Point {
        let len = self.length();
        let t = if len > 0.0 {
            (s / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.eval(t)
    }

    fn bounds(&self) -> Rect {
        self.bounding_box()
    }
}

/// One sample taken from a curve at a uniform arc-length step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledPoint {
    /// Position of the sample.
    pub point: Point,
    /// Index of the source curve within the caller's curve set.
    pub curve: usize,
    /// Arc length from the start of the curve to this sample.
    pub arclen: f64,
}

/// Sample a curve at `sample_rate + 1` uniform arc-length steps.
///
/// The first sample sits at the start of the curve and the last at its end.
/// A degenerate curve (zero length) yields `sample_rate + 1` coincident
/// samples, which downstream consumers must tolerate.
///
/// `sample_rate` must be at least 1.
pub fn sample_curve<C: Curve + ?Sized>(
    curve: &C,
    curve_index: usize,
    sample_rate: usize,
) -> Vec<SampledPoint> {
    debug_assert!(sample_rate >= 1, "sample_rate must be at least 1");
    let len = curve.length();
    let mut out = Vec::with_capacity(sample_rate + 1);
    for i in 0..=sample_rate {
        let s = len * (i as f64) / (sample_rate as f64);
        out.push(SampledPoint {
            point: curve.point_at_length(s),
            curve: curve_index,
            arclen: s,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_length_and_midpoint() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        assert!((Curve::length(&line) - 10.0).abs() < 1e-9);
        let mid = line.point_at_length(5.0);
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!((mid.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn point_at_length_clamps() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        assert_eq!(line.point_at_length(-3.0), Point::new(0.0, 0.0));
        assert_eq!(line.point_at_length(99.0), Point::new(10.0, 0.0));
    }

    #[test]
    fn bezpath_two_segment_walk() {
        // Two joined unit-length horizontal then vertical lines.
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((1.0, 1.0));
        assert!((Curve::length(&path) - 2.0).abs() < 1e-6);

        let p = path.point_at_length(1.5);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_path_is_degenerate() {
        let path = BezPath::new();
        assert_eq!(Curve::length(&path), 0.0);
        assert_eq!(path.point_at_length(0.0), Point::ZERO);
    }

    #[test]
    fn sampling_covers_endpoints() {
        let line = Line::new((0.0, 0.0), (8.0, 0.0));
        let samples = sample_curve(&line, 3, 4);
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].point, Point::new(0.0, 0.0));
        assert_eq!(samples[4].point, Point::new(8.0, 0.0));
        assert!(samples.iter().all(|s| s.curve == 3));
        assert!((samples[2].arclen - 4.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_curve_samples_coincide() {
        let line = Line::new((2.0, 2.0), (2.0, 2.0));
        let samples = sample_curve(&line, 0, 10);
        assert_eq!(samples.len(), 11);
        assert!(samples.iter().all(|s| s.point == Point::new(2.0, 2.0)));
    }
}
