// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core simulation: particle grid, spring network, contact, integration.

use crate::config::{ClothConfig, StageFlags};
use crate::math::Vec3;

/// Minimum spring length used when normalizing, so coincident particles do
/// not produce a NaN direction.
const MIN_SPRING_LENGTH: f64 = 1e-8;

/// Minimum signed gap fed to the barrier stiffness, so a particle touching
/// the sphere surface does not divide by zero.
const MIN_CONTACT_GAP: f64 = 1e-6;

/// Scale applied to the local spring stiffness inside the barrier stiffness,
/// keeping the inertial term dominant.
const LOCAL_STIFFNESS_SCALE: f64 = 1e-4;

/// Penetration slop: corrections below this are skipped, and resolved
/// particles are pushed this far past the surface.
const PENETRATION_SLOP: f64 = 1e-5;

/// Default radius for pointer picking in [`Cloth::nearest_particle`].
pub const DEFAULT_DRAG_THRESHOLD: f64 = 0.12;

/// One mass point of the cloth.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// Current position.
    pub pos: Vec3,
    /// Position at the previous step; the difference to `pos` is the
    /// implicit Verlet velocity.
    pub prev: Vec3,
    /// Acceleration accumulated during the current step.
    pub acc: Vec3,
    /// Mass.
    pub mass: f64,
    /// Pinned particles ignore forces and integration but can be dragged.
    pub pinned: bool,
}

/// The three spring classes of the grid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpringKind {
    /// Axis-aligned nearest-neighbor springs; carry the sheet.
    Structural,
    /// Diagonal springs; resist in-plane shearing.
    Shear,
    /// Skip-one springs; resist folding.
    Bend,
}

/// An immutable spring between two particles.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    /// Index of the first particle.
    pub a: usize,
    /// Index of the second particle.
    pub b: usize,
    /// Rest length, measured from the freshly built grid.
    pub rest: f64,
    /// Hooke stiffness.
    pub k: f64,
    /// Which class this spring belongs to.
    pub kind: SpringKind,
}

/// A sphere obstacle the cloth collides with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    /// Center position.
    pub center: Vec3,
    /// Radius.
    pub radius: f64,
}

/// A rectangular mass-spring cloth.
///
/// Construction builds the particle grid and spring network; after that the
/// only mutation points are [`Self::step`], the drag methods, pinning, and
/// obstacle attachment. All read access takes `&self`.
#[derive(Debug)]
pub struct Cloth {
    config: ClothConfig,
    particles: Vec<Particle>,
    springs: Vec<Spring>,
    /// Mean stiffness of the springs attached to each particle, used by the
    /// contact barrier. Fixed topology, so computed once at build.
    local_stiffness: Vec<f64>,
    sphere: Option<Sphere>,
    dragged: Option<usize>,
}

impl Cloth {
    /// Build a cloth grid from `config`.
    ///
    /// Particles are laid out row-major, columns along x, with row 0 at the
    /// top; every `pin_stride`-th particle of the top row starts pinned.
    /// Rest lengths are measured from the built grid, so an undisturbed
    /// sheet is exactly at rest.
    pub fn new(config: ClothConfig) -> Self {
        debug_assert!(config.cols >= 1, "cols must be at least 1");
        debug_assert!(config.rows >= 1, "rows must be at least 1");
        debug_assert!(config.particle_mass > 0.0, "particles need positive mass");
        debug_assert!(config.dt > 0.0, "timestep must be positive");

        let (cols, rows) = (config.cols, config.rows);
        let mut particles = Vec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                let px = (x as f64 - (cols - 1) as f64 / 2.0) * config.spacing;
                let py = config.base_height + (rows - 1 - y) as f64 * config.spacing;
                let pos = Vec3::new(px, py, 0.0);
                particles.push(Particle {
                    pos,
                    prev: pos,
                    acc: Vec3::ZERO,
                    mass: config.particle_mass,
                    pinned: y == 0 && config.pin_stride != 0 && x % config.pin_stride == 0,
                });
            }
        }

        let index = |x: usize, y: usize| y * cols + x;
        let mut springs = Vec::new();
        let mut link = |a: usize, b: usize, k: f64, kind: SpringKind| {
            springs.push(Spring {
                a,
                b,
                rest: particles[a].pos.distance(particles[b].pos),
                k,
                kind,
            });
        };
        let k = config.stiffness;
        for y in 0..rows {
            for x in 0..cols {
                if x + 1 < cols {
                    link(index(x, y), index(x + 1, y), k, SpringKind::Structural);
                }
                if y + 1 < rows {
                    link(index(x, y), index(x, y + 1), k, SpringKind::Structural);
                }
                if x + 1 < cols && y + 1 < rows {
                    link(index(x, y), index(x + 1, y + 1), k * 0.8, SpringKind::Shear);
                }
                if x > 0 && y + 1 < rows {
                    link(index(x, y), index(x - 1, y + 1), k * 0.8, SpringKind::Shear);
                }
                if x + 2 < cols {
                    link(index(x, y), index(x + 2, y), k * 0.25, SpringKind::Bend);
                }
                if y + 2 < rows {
                    link(index(x, y), index(x, y + 2), k * 0.25, SpringKind::Bend);
                }
            }
        }

        let mut stiffness_sum = vec![0.0; particles.len()];
        let mut spring_count = vec![0_usize; particles.len()];
        for s in &springs {
            stiffness_sum[s.a] += s.k;
            stiffness_sum[s.b] += s.k;
            spring_count[s.a] += 1;
            spring_count[s.b] += 1;
        }
        let local_stiffness = stiffness_sum
            .iter()
            .zip(&spring_count)
            .map(|(&sum, &n)| if n > 0 { sum / n as f64 } else { 0.0 })
            .collect();

        Self {
            config,
            particles,
            springs,
            local_stiffness,
            sphere: None,
            dragged: None,
        }
    }

    /// Attach (or replace) the sphere obstacle.
    pub fn attach_sphere(&mut self, sphere: Sphere) {
        debug_assert!(sphere.radius > 0.0, "sphere radius must be positive");
        self.sphere = Some(sphere);
    }

    /// Remove the sphere obstacle, returning it if one was attached.
    pub fn detach_sphere(&mut self) -> Option<Sphere> {
        self.sphere.take()
    }

    /// The attached sphere obstacle, if any.
    pub fn sphere(&self) -> Option<Sphere> {
        self.sphere
    }

    /// Advance the simulation one fixed timestep.
    ///
    /// Stage order: zero accelerations, gravity, spring forces, sphere
    /// contact (barrier force plus positional correction), then position
    /// Verlet integration with damping folded into the velocity estimate.
    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.acc = Vec3::ZERO;
        }

        if self.config.flags.contains(StageFlags::GRAVITY) {
            for p in &mut self.particles {
                if !p.pinned {
                    p.acc += self.config.gravity;
                }
            }
        }

        for si in 0..self.springs.len() {
            let s = self.springs[si];
            let delta = self.particles[s.b].pos - self.particles[s.a].pos;
            let len = delta.length().max(MIN_SPRING_LENGTH);
            let dir = delta.scale(1.0 / len);
            let force = s.k * (len - s.rest);
            if !self.particles[s.a].pinned {
                let accel = force / self.particles[s.a].mass;
                self.particles[s.a].acc += dir.scale(accel);
            }
            if !self.particles[s.b].pinned {
                let accel = force / self.particles[s.b].mass;
                self.particles[s.b].acc -= dir.scale(accel);
            }
        }

        if self.config.flags.contains(StageFlags::SPHERE_CONTACT)
            && let Some(sphere) = self.sphere
        {
            let gap_max = self.config.contact_gap_max;
            for (i, p) in self.particles.iter_mut().enumerate() {
                if p.pinned {
                    continue;
                }
                let to_particle = p.pos - sphere.center;
                let dist = to_particle.length();
                let gap = dist - sphere.radius;
                if gap > gap_max {
                    continue;
                }
                // A particle sitting on the exact center has no meaningful
                // normal; eject it upward.
                let normal = if dist > MIN_SPRING_LENGTH {
                    to_particle.scale(1.0 / dist)
                } else {
                    Vec3::new(0.0, 1.0, 0.0)
                };

                // Cubic barrier: stiffness blends an inertial term with the
                // local spring stiffness, and the force ramps quadratically
                // as the gap closes.
                let gap_safe = gap.max(MIN_CONTACT_GAP);
                let kappa = p.mass / (gap_safe * gap_safe)
                    + self.local_stiffness[i] * LOCAL_STIFFNESS_SCALE;
                let overlap = (gap_max - gap).max(0.0);
                let magnitude = (2.0 * kappa / gap_max) * overlap * overlap;
                p.acc += normal.scale(magnitude / p.mass);

                // Hard correction for whatever the barrier did not stop.
                let penetration = (sphere.radius - dist + MIN_CONTACT_GAP).max(0.0);
                if penetration > PENETRATION_SLOP {
                    p.pos += normal.scale(penetration + PENETRATION_SLOP);
                }
            }
        }

        let (dt, damping) = (self.config.dt, self.config.damping);
        for p in &mut self.particles {
            if p.pinned {
                p.prev = p.pos;
                continue;
            }
            let mut velocity = (p.pos - p.prev).scale(damping);
            velocity += p.acc.scale(dt);
            p.prev = p.pos;
            p.pos += velocity.scale(dt);
        }
    }

    /// Advance the simulation `n` steps; the usual frame shape is
    /// `step_n(2)` followed by one [`Self::positions`] read-out.
    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Index of the particle closest to `target`, if any lies strictly
    /// within `threshold` (see [`DEFAULT_DRAG_THRESHOLD`]).
    pub fn nearest_particle(&self, target: Vec3, threshold: f64) -> Option<usize> {
        let mut best = None;
        let mut best_distance = threshold;
        for (i, p) in self.particles.iter().enumerate() {
            let distance = p.pos.distance(target);
            if distance < best_distance {
                best = Some(i);
                best_distance = distance;
            }
        }
        best
    }

    /// Start dragging particle `i`. Pinned particles are draggable too.
    pub fn begin_drag(&mut self, i: usize) {
        debug_assert!(i < self.particles.len(), "particle index out of range");
        self.dragged = Some(i);
    }

    /// Move the dragged particle to `target`.
    ///
    /// Only the position is overwritten; `prev` keeps accumulating, so
    /// releasing after a fast move throws the cloth.
    pub fn drag_to(&mut self, target: Vec3) {
        if let Some(i) = self.dragged {
            self.particles[i].pos = target;
        }
    }

    /// Stop dragging.
    pub fn end_drag(&mut self) {
        self.dragged = None;
    }

    /// Index of the particle currently being dragged, if any.
    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    /// Pin or unpin a particle in place.
    pub fn set_pinned(&mut self, i: usize, pinned: bool) {
        self.particles[i].pinned = pinned;
    }

    /// Particle index for grid coordinates (column `x`, row `y`).
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.config.cols && y < self.config.rows,
            "grid coordinates out of range"
        );
        y * self.config.cols + x
    }

    /// Position of the particle at grid coordinates.
    pub fn position_at(&self, x: usize, y: usize) -> Vec3 {
        self.particles[self.index(x, y)].pos
    }

    /// Current positions, row-major, for mesh upload.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.pos)
    }

    /// All particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The spring network (fixed after construction).
    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Configuration the cloth was built with.
    pub fn config(&self) -> &ClothConfig {
        &self.config
    }

    /// Replace the stage gates, e.g. to toggle gravity from a control
    /// surface. Grid shape and spring constants are fixed at construction;
    /// changing those means building a new cloth.
    pub fn set_flags(&mut self, flags: StageFlags) {
        self.config.flags = flags;
    }
}
