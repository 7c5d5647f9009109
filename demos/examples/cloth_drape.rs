// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A hanging cloth sheet with a sphere obstacle and a drag "poke".
//!
//! The sheet hangs from a few pinned top-row particles above a sphere,
//! settles under gravity, then gets one particle dragged down into the
//! sphere and released, throwing it back out.
//!
//! Run:
//! - `cargo run -p tracery_demos --example cloth_drape`

use tracery_cloth::{Cloth, ClothConfig, Sphere, Vec3};

fn main() {
    let config = ClothConfig::new();
    let mut cloth = Cloth::new(config);
    cloth.attach_sphere(Sphere {
        center: Vec3::new(0.0, -0.5, 0.0),
        radius: 1.0,
    });

    let pinned = cloth.particles().iter().filter(|p| p.pinned).count();
    println!(
        "Cloth: {}x{} particles, {} springs, {} pinned",
        config.cols,
        config.rows,
        cloth.springs().len(),
        pinned,
    );

    // Let the sheet settle: two physics steps per displayed frame.
    for frame in 0..180 {
        cloth.step_n(2);
        if frame % 60 == 0 {
            let center = cloth.position_at(config.cols / 2, config.rows - 1);
            println!(
                "frame {frame:>3}: bottom-center at ({:.3}, {:.3}, {:.3})",
                center.x, center.y, center.z,
            );
        }
    }

    // Poke: drag the bottom-center particle down toward the sphere.
    let bottom_center = cloth.position_at(config.cols / 2, config.rows - 1);
    let picked = cloth
        .nearest_particle(bottom_center, tracery_cloth::DEFAULT_DRAG_THRESHOLD)
        .expect("picking on a particle position always succeeds");
    println!("\nDragging particle {picked} toward the sphere...");

    cloth.begin_drag(picked);
    let sphere = cloth.sphere().expect("sphere was attached above");
    for frame in 0..30 {
        let t = f64::from(frame) / 30.0;
        let target = bottom_center.lerp(sphere.center + Vec3::new(0.0, sphere.radius, 0.0), t);
        cloth.drag_to(target);
        cloth.step_n(2);
    }
    cloth.end_drag();
    println!("Released. Watching the throw:");

    for frame in 0..120 {
        cloth.step_n(2);
        if frame % 30 == 0 {
            let p = cloth.particles()[picked].pos;
            let gap = p.distance(sphere.center) - sphere.radius;
            println!(
                "frame {frame:>3}: particle {picked} at ({:.3}, {:.3}, {:.3}), gap to sphere {gap:.4}",
                p.x, p.y, p.z,
            );
        }
    }

    let min_gap = cloth
        .positions()
        .map(|p| p.distance(sphere.center) - sphere.radius)
        .fold(f64::INFINITY, f64::min);
    println!("\nFinal minimum gap to the sphere surface: {min_gap:.4}");
}
