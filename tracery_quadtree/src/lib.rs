// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-based quadtree index over sampled curve points.
//!
//! This crate accelerates nearest-point queries against a set of curves by
//! indexing their uniform arc-length samples (see
//! [`tracery_curve::sample_curve`]) in a quadtree:
//!
//! - [`QuadTreeIndex`] – the index itself. Built once from a curve set (or a
//!   prepared point list), queried many times; any change to the curves or
//!   the configuration means a full rebuild.
//! - [`TreeConfig`] – sampling rate, per-node point capacity, and maximum
//!   subdivision depth.
//! - [`PointId`] – stable handle of an indexed sample, usable to look the
//!   sample back up and to ask which leaf holds it.
//! - [`RadiusSearch`] – the result of a nearest query: the best candidate
//!   (if any fell inside the search window), plus the work counters needed
//!   to compare against a plain linear scan.
//!
//! Nearest queries are window-based: the index collects candidates in a
//! square around the query point, doubling the window when it comes up
//! empty, up to a fixed ceiling. A query far from every curve therefore
//! returns no candidate rather than scanning the whole point set.
//!
//! Nodes live in a flat arena and are addressed by index; the tree never
//! removes points, so no free list or generation tracking is needed.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod tree;
mod util;

pub use tree::{Nearest, PointId, QuadTreeIndex, RadiusSearch, TreeConfig};
