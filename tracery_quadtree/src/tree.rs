// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core quadtree implementation: arena, build, queries.

use alloc::{vec, vec::Vec};
use core::time::Duration;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::SmallVec;
use tracery_curve::{Curve, SampledPoint, sample_curve};

use crate::util::{contains_closed, contains_half_open, rects_overlap};

/// Padding added on every side of the curve set's bounding box when forming
/// the root bounds, so samples sitting exactly on the box edge still fall in
/// the root's half-open interval.
const ROOT_PADDING: f64 = 10.0;

/// Initial half-extent of the nearest-query window.
const DEFAULT_SEARCH_RADIUS: f64 = 50.0;

/// Ceiling for window doubling. Once the window half-extent reaches this,
/// an empty candidate set is returned as-is instead of widening further.
const MAX_SEARCH_RADIUS: f64 = 200.0;

/// Configuration for building a [`QuadTreeIndex`].
///
/// Changing any of these requires rebuilding the index; there is no
/// incremental update path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeConfig {
    /// Uniform arc-length steps per curve (the curve contributes
    /// `sample_rate + 1` points).
    pub sample_rate: usize,
    /// Point capacity of a node before it subdivides.
    pub max_points: usize,
    /// Maximum subdivision depth; nodes at this depth absorb points beyond
    /// `max_points` rather than splitting.
    pub max_depth: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 100,
            max_points: 20,
            max_depth: 5,
        }
    }
}

/// Stable handle of a sample held by the index (insertion order).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PointId(pub(crate) u32);

impl PointId {
    /// Position of the sample in [`QuadTreeIndex::points`].
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The best candidate found by a nearest query.
#[derive(Clone, Copy, Debug)]
pub struct Nearest {
    /// Handle of the winning sample.
    pub id: PointId,
    /// The sample itself (position, source curve, arc length).
    pub point: SampledPoint,
    /// Euclidean distance from the query to the sample.
    pub distance: f64,
}

/// Result of a window-based nearest query.
///
/// `nearest` is `None` when even the widest window held no candidates; that
/// is an ordinary outcome for queries far from every curve, not an error.
#[derive(Clone, Copy, Debug)]
pub struct RadiusSearch {
    /// The closest candidate, if the window held any.
    pub nearest: Option<Nearest>,
    /// Number of candidates scanned in the final window.
    pub candidates_checked: usize,
    /// Half-extent of the final window actually searched.
    pub search_radius: f64,
    /// Wall-clock time spent in the query. Zero without the `std` feature.
    pub elapsed: Duration,
}

struct Node {
    bounds: Rect,
    depth: u32,
    /// Indices into the point arena. A divided node holds none.
    points: SmallVec<[u32; 16]>,
    /// Child node indices in NW/NE/SW/SE order.
    children: Option<[u32; 4]>,
}

/// Quadtree over sampled curve points.
///
/// Built once from a curve set; all queries take `&self`. The arena is
/// append-only: nodes and points are never removed, so plain `u32` indices
/// are stable for the life of the index.
pub struct QuadTreeIndex {
    nodes: Vec<Node>,
    points: Vec<SampledPoint>,
    /// Owning node per point index, maintained on insert and subdivision.
    leaf_of: HashMap<u32, u32>,
    config: TreeConfig,
    build_time: Duration,
}

impl core::fmt::Debug for QuadTreeIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuadTreeIndex")
            .field("nodes", &self.nodes.len())
            .field("points", &self.points.len())
            .field("config", &self.config)
            .field("build_time", &self.build_time)
            .finish_non_exhaustive()
    }
}

impl QuadTreeIndex {
    /// Build an index over `curves`, sampling each at
    /// [`TreeConfig::sample_rate`] uniform arc-length steps.
    ///
    /// The root bounds are the union of the curves' bounding boxes, padded
    /// by 10 units per side. An empty curve set yields a single root node
    /// covering `(-10, -10)` to `(10, 10)` and queries that find nothing.
    pub fn build<C: Curve>(curves: &[C], config: &TreeConfig) -> Self {
        #[cfg(feature = "std")]
        let start = std::time::Instant::now();

        let mut points = Vec::with_capacity(curves.len() * (config.sample_rate + 1));
        for (i, curve) in curves.iter().enumerate() {
            points.extend(sample_curve(curve, i, config.sample_rate));
        }
        let extent = curves
            .iter()
            .map(Curve::bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);

        #[allow(unused_mut, reason = "mutated only when the `std` feature is on")]
        let mut index = Self::from_points(points, extent, config);
        #[cfg(feature = "std")]
        {
            index.build_time = start.elapsed();
        }
        index
    }

    /// Build an index over prepared samples. `extent` is the unpadded area
    /// the points span; the root bounds pad it by 10 units per side.
    ///
    /// A point falling outside the padded root is silently dropped (it can
    /// never match a query anyway); samples produced by [`Self::build`] are
    /// always inside.
    pub fn from_points(points: Vec<SampledPoint>, extent: Rect, config: &TreeConfig) -> Self {
        debug_assert!(config.sample_rate >= 1, "sample_rate must be at least 1");
        debug_assert!(config.max_points >= 1, "max_points must be at least 1");

        #[cfg(feature = "std")]
        let start = std::time::Instant::now();

        let root = Node {
            bounds: extent.inflate(ROOT_PADDING, ROOT_PADDING),
            depth: 0,
            points: SmallVec::new(),
            children: None,
        };
        let mut index = Self {
            nodes: vec![root],
            points,
            leaf_of: HashMap::new(),
            config: *config,
            build_time: Duration::ZERO,
        };
        for pi in 0..index.points.len() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "point indices are 32-bit by design"
            )]
            index.insert(pi as u32);
        }

        #[cfg(feature = "std")]
        {
            index.build_time = start.elapsed();
        }
        index
    }

    /// Descend to a leaf with spare capacity (subdividing full ones along
    /// the way) and file the point there. Returns `false` if the point lies
    /// outside the root or lands on no child's half-open interval.
    fn insert(&mut self, pi: u32) -> bool {
        let p = self.points[pi as usize].point;
        if !contains_half_open(self.nodes[0].bounds, p) {
            return false;
        }
        let mut ni = 0_u32;
        loop {
            if let Some(children) = self.nodes[ni as usize].children {
                let mut next = None;
                for ci in children {
                    if contains_half_open(self.nodes[ci as usize].bounds, p) {
                        next = Some(ci);
                        break;
                    }
                }
                match next {
                    Some(ci) => ni = ci,
                    None => return false,
                }
            } else {
                let node = &self.nodes[ni as usize];
                if node.points.len() < self.config.max_points
                    || node.depth >= self.config.max_depth
                {
                    self.nodes[ni as usize].points.push(pi);
                    self.leaf_of.insert(pi, ni);
                    return true;
                }
                self.subdivide(ni);
            }
        }
    }

    /// Split a leaf into four quadrant children and redistribute its points.
    /// A child that inherits everything stays a leaf until the next insert
    /// pushes it over capacity in turn.
    fn subdivide(&mut self, ni: u32) {
        let (bounds, depth) = {
            let node = &self.nodes[ni as usize];
            (node.bounds, node.depth)
        };
        let cx = 0.5 * (bounds.x0 + bounds.x1);
        let cy = 0.5 * (bounds.y0 + bounds.y1);
        let quads = [
            Rect::new(bounds.x0, bounds.y0, cx, cy),
            Rect::new(cx, bounds.y0, bounds.x1, cy),
            Rect::new(bounds.x0, cy, cx, bounds.y1),
            Rect::new(cx, cy, bounds.x1, bounds.y1),
        ];
        let mut children = [0_u32; 4];
        for (slot, quad) in children.iter_mut().zip(quads) {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "node indices are 32-bit by design"
            )]
            let ci = self.nodes.len() as u32;
            self.nodes.push(Node {
                bounds: quad,
                depth: depth + 1,
                points: SmallVec::new(),
                children: None,
            });
            *slot = ci;
        }
        let held = core::mem::take(&mut self.nodes[ni as usize].points);
        self.nodes[ni as usize].children = Some(children);
        for pi in held {
            let p = self.points[pi as usize].point;
            for ci in children {
                if contains_half_open(self.nodes[ci as usize].bounds, p) {
                    self.nodes[ci as usize].points.push(pi);
                    self.leaf_of.insert(pi, ci);
                    break;
                }
            }
        }
    }

    /// Collect every indexed point inside `range` (closed containment) into
    /// `out`. `out` is appended to, not cleared.
    pub fn query(&self, range: Rect, out: &mut Vec<PointId>) {
        let mut stack: SmallVec<[u32; 32]> = SmallVec::new();
        stack.push(0);
        while let Some(ni) = stack.pop() {
            let node = &self.nodes[ni as usize];
            if !rects_overlap(node.bounds, range) {
                continue;
            }
            for &pi in &node.points {
                if contains_closed(range, self.points[pi as usize].point) {
                    out.push(PointId(pi));
                }
            }
            if let Some(children) = node.children {
                stack.extend_from_slice(&children);
            }
        }
    }

    /// Find the indexed point nearest to `query`, starting from the default
    /// 50-unit window.
    pub fn find_nearest(&self, query: Point) -> RadiusSearch {
        self.find_nearest_within(query, DEFAULT_SEARCH_RADIUS)
    }

    /// Find the indexed point nearest to `query`, starting from a square
    /// window of half-extent `search_radius`.
    ///
    /// An empty window is doubled and retried until it produces candidates
    /// or the half-extent reaches 200 units, at which point the (possibly
    /// empty) result stands. Candidates from the final window are scanned
    /// linearly for the minimum Euclidean distance.
    pub fn find_nearest_within(&self, query: Point, search_radius: f64) -> RadiusSearch {
        debug_assert!(search_radius > 0.0, "search radius must be positive");

        #[cfg(feature = "std")]
        let start = std::time::Instant::now();

        let mut radius = search_radius;
        let mut candidates = Vec::new();
        loop {
            candidates.clear();
            let window = Rect::new(
                query.x - radius,
                query.y - radius,
                query.x + radius,
                query.y + radius,
            );
            self.query(window, &mut candidates);
            if !candidates.is_empty() || radius >= MAX_SEARCH_RADIUS {
                break;
            }
            radius *= 2.0;
        }

        let mut nearest: Option<Nearest> = None;
        for &id in &candidates {
            let sample = self.points[id.index()];
            let distance = query.distance(sample.point);
            match &nearest {
                Some(n) if n.distance <= distance => {}
                _ => {
                    nearest = Some(Nearest {
                        id,
                        point: sample,
                        distance,
                    });
                }
            }
        }

        #[cfg(feature = "std")]
        let elapsed = start.elapsed();
        #[cfg(not(feature = "std"))]
        let elapsed = Duration::ZERO;

        RadiusSearch {
            nearest,
            candidates_checked: candidates.len(),
            search_radius: radius,
            elapsed,
        }
    }

    /// Bounds of every node, depth-first pre-order with the root first.
    /// Intended for wireframe visualization of the subdivision.
    pub fn all_bounds(&self) -> Vec<Rect> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: SmallVec<[u32; 32]> = SmallVec::new();
        stack.push(0);
        while let Some(ni) = stack.pop() {
            let node = &self.nodes[ni as usize];
            out.push(node.bounds);
            if let Some(children) = node.children {
                for &ci in children.iter().rev() {
                    stack.push(ci);
                }
            }
        }
        out
    }

    /// Bounds of the node currently holding `id`, or `None` for a handle
    /// the index never issued (e.g. a dropped out-of-bounds point).
    pub fn containing_bounds(&self, id: PointId) -> Option<Rect> {
        self.leaf_of
            .get(&id.0)
            .map(|&ni| self.nodes[ni as usize].bounds)
    }

    /// All indexed samples, addressable by [`PointId::index`].
    pub fn points(&self) -> &[SampledPoint] {
        &self.points
    }

    /// Look a sample back up by handle.
    pub fn point(&self, id: PointId) -> Option<SampledPoint> {
        self.points.get(id.index()).copied()
    }

    /// Root bounds (curve extent padded by 10 units per side).
    pub fn root_bounds(&self) -> Rect {
        self.nodes[0].bounds
    }

    /// Number of nodes in the arena, subdivided or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of indexed samples.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Configuration the index was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Wall-clock time spent building. Zero without the `std` feature.
    pub fn build_time(&self) -> Duration {
        self.build_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{BezPath, Line};

    fn wiggle() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((40.0, 120.0), (80.0, -80.0), (120.0, 40.0));
        path.curve_to((160.0, 160.0), (200.0, -40.0), (240.0, 60.0));
        path
    }

    /// Force subdivision with a small capacity so structural invariants are
    /// exercised beyond a root-only tree.
    fn dense_config() -> TreeConfig {
        TreeConfig {
            sample_rate: 100,
            max_points: 4,
            max_depth: 5,
        }
    }

    #[test]
    fn divided_nodes_hold_no_points() {
        let index = QuadTreeIndex::build(&[wiggle()], &dense_config());
        assert!(index.node_count() > 1, "expected at least one subdivision");
        for node in &index.nodes {
            if node.children.is_some() {
                assert!(node.points.is_empty(), "divided node still holds points");
            }
        }
    }

    #[test]
    fn held_points_satisfy_half_open_containment() {
        let index = QuadTreeIndex::build(&[wiggle()], &dense_config());
        let mut held = 0;
        for node in &index.nodes {
            for &pi in &node.points {
                held += 1;
                assert!(
                    contains_half_open(node.bounds, index.points[pi as usize].point),
                    "point escapes its node bounds"
                );
            }
        }
        assert_eq!(held, index.point_count(), "every sample is held somewhere");
    }

    #[test]
    fn children_tile_their_parent() {
        let index = QuadTreeIndex::build(&[wiggle()], &dense_config());
        for node in &index.nodes {
            let Some(children) = node.children else {
                continue;
            };
            let b = node.bounds;
            let cx = 0.5 * (b.x0 + b.x1);
            let cy = 0.5 * (b.y0 + b.y1);
            let [nw, ne, sw, se] = children.map(|ci| index.nodes[ci as usize].bounds);
            assert_eq!(nw, Rect::new(b.x0, b.y0, cx, cy), "NW quadrant");
            assert_eq!(ne, Rect::new(cx, b.y0, b.x1, cy), "NE quadrant");
            assert_eq!(sw, Rect::new(b.x0, cy, cx, b.y1), "SW quadrant");
            assert_eq!(se, Rect::new(cx, cy, b.x1, b.y1), "SE quadrant");
        }
    }

    #[test]
    fn all_bounds_is_preorder_and_complete() {
        let index = QuadTreeIndex::build(&[wiggle()], &dense_config());
        let bounds = index.all_bounds();
        assert_eq!(bounds.len(), index.node_count(), "one rect per node");
        assert_eq!(bounds[0], index.root_bounds(), "root comes first");
    }

    #[test]
    fn containing_bounds_covers_the_point() {
        let index = QuadTreeIndex::build(&[wiggle()], &dense_config());
        for pi in 0..index.point_count() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "point indices are 32-bit by design"
            )]
            let id = PointId(pi as u32);
            let bounds = index
                .containing_bounds(id)
                .expect("every inserted point has an owning node");
            assert!(
                contains_half_open(bounds, index.points[pi].point),
                "owning node does not contain its point"
            );
        }
    }

    #[test]
    fn nearest_matches_brute_force_near_the_curve() {
        let index = QuadTreeIndex::build(&[wiggle()], &TreeConfig::default());
        for query in [
            Point::new(60.0, 10.0),
            Point::new(130.0, 50.0),
            Point::new(0.0, 0.0),
            Point::new(200.0, -10.0),
        ] {
            let brute = index
                .points()
                .iter()
                .map(|s| query.distance(s.point))
                .fold(f64::INFINITY, f64::min);
            let result = index.find_nearest(query);
            let nearest = result.nearest.expect("query near the curve finds a point");
            assert!(
                (nearest.distance - brute).abs() < 1e-12,
                "index answer {} disagrees with brute force {}",
                nearest.distance,
                brute
            );
            assert!(result.candidates_checked >= 1, "scanned the final window");
        }
    }

    #[test]
    fn far_query_stops_doubling_at_the_ceiling() {
        let index = QuadTreeIndex::build(&[wiggle()], &TreeConfig::default());
        let result = index.find_nearest(Point::new(10_000.0, 10_000.0));
        assert!(result.nearest.is_none(), "nothing within any window");
        assert_eq!(result.candidates_checked, 0, "final window is empty");
        assert_eq!(result.search_radius, 200.0, "doubled 50 -> 100 -> 200");
    }

    #[test]
    fn empty_curve_set_builds_a_padded_root() {
        let curves: [Line; 0] = [];
        let index = QuadTreeIndex::build(&curves, &TreeConfig::default());
        assert_eq!(index.point_count(), 0, "no curves, no samples");
        let bounds = index.all_bounds();
        assert_eq!(bounds.len(), 1, "a single root node");
        assert_eq!(bounds[0], Rect::new(-10.0, -10.0, 10.0, 10.0));
        assert!(index.find_nearest(Point::ZERO).nearest.is_none());
    }

    #[test]
    fn query_window_edge_is_inclusive() {
        // Samples land on integer x for this line and rate.
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        let config = TreeConfig {
            sample_rate: 10,
            ..TreeConfig::default()
        };
        let index = QuadTreeIndex::build(&[line], &config);
        let mut hits = Vec::new();
        // Window max edge sits exactly on the last sample.
        index.query(Rect::new(8.5, -1.0, 10.0, 1.0), &mut hits);
        let xs: Vec<f64> = hits
            .iter()
            .map(|&id| index.point(id).unwrap().point.x)
            .collect();
        assert!(
            xs.iter().any(|&x| (x - 9.0).abs() < 1e-9),
            "interior sample matches"
        );
        assert!(
            xs.iter().any(|&x| (x - 10.0).abs() < 1e-9),
            "window max edge matches"
        );
        assert_eq!(hits.len(), 2, "only the last two samples fall inside");
    }

    #[test]
    fn points_from_two_curves_keep_their_source_index() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let b = Line::new((0.0, 100.0), (10.0, 100.0));
        let config = TreeConfig {
            sample_rate: 4,
            ..TreeConfig::default()
        };
        let index = QuadTreeIndex::build(&[a, b], &config);
        assert_eq!(index.point_count(), 10, "five samples per line");
        let near_b = index.find_nearest(Point::new(5.0, 99.0));
        assert_eq!(near_b.nearest.unwrap().point.curve, 1, "matched curve b");
    }
}
