// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-point search two ways: linear scan vs quadtree index.
//!
//! This example shows how to combine:
//! - `tracery_curve` for arc-length sampling and the linear baseline,
//! - `tracery_quadtree` for the window-based indexed query,
//! and compares the answers and the work each one did.
//!
//! Run:
//! - `cargo run -p tracery_demos --example nearest_point`

use kurbo::{BezPath, Point};
use tracery_curve::search::{LinearSearch, nearest_among};
use tracery_quadtree::{QuadTreeIndex, TreeConfig};

fn curves() -> Vec<BezPath> {
    let mut a = BezPath::new();
    a.move_to((0.0, 0.0));
    a.curve_to((40.0, 120.0), (80.0, -80.0), (120.0, 40.0));
    a.curve_to((160.0, 160.0), (200.0, -40.0), (240.0, 60.0));

    let mut b = BezPath::new();
    b.move_to((0.0, 200.0));
    b.curve_to((80.0, 140.0), (160.0, 260.0), (240.0, 180.0));

    vec![a, b]
}

fn main() {
    let curves = curves();

    // Linear baseline: one searcher per curve, aggregated per query.
    let searchers: Vec<LinearSearch<'_, BezPath>> = curves
        .iter()
        .enumerate()
        .map(|(i, c)| LinearSearch::new(c, i))
        .collect();

    // Indexed variant: one build, many queries.
    let config = TreeConfig::default();
    let index = QuadTreeIndex::build(&curves, &config);
    println!(
        "Built index: {} points in {} nodes ({:?})",
        index.point_count(),
        index.node_count(),
        index.build_time(),
    );

    for query in [
        Point::new(60.0, 10.0),
        Point::new(130.0, 130.0),
        Point::new(220.0, 190.0),
        Point::new(-400.0, -400.0),
    ] {
        println!("\n== Query @ ({:.1}, {:.1}) ==", query.x, query.y);

        let linear = nearest_among(&searchers, query).expect("searcher set is non-empty");
        println!(
            "Linear:   curve {} dist {:.3} at ({:.2}, {:.2})  [{} samples, {:?}]",
            linear.curve,
            linear.distance,
            linear.point.x,
            linear.point.y,
            linear.samples_checked,
            linear.elapsed,
        );

        let indexed = index.find_nearest(query);
        match indexed.nearest {
            Some(hit) => {
                println!(
                    "Quadtree: curve {} dist {:.3} at ({:.2}, {:.2})  [{} candidates, window {:.0}, {:?}]",
                    hit.point.curve,
                    hit.distance,
                    hit.point.point.x,
                    hit.point.point.y,
                    indexed.candidates_checked,
                    indexed.search_radius,
                    indexed.elapsed,
                );
                let leaf = index
                    .containing_bounds(hit.id)
                    .expect("winning sample has an owning node");
                println!("          winning sample lives in leaf {leaf:?}");
            }
            None => println!(
                "Quadtree: nothing within the window ceiling (stopped at {:.0})",
                indexed.search_radius,
            ),
        }
    }

    println!(
        "\nSubdivision wireframe: {} rects, root {:?}",
        index.all_bounds().len(),
        index.root_bounds(),
    );
}
