// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulation configuration.

use crate::math::Vec3;

bitflags::bitflags! {
    /// Per-step stage gates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StageFlags: u8 {
        /// Apply gravity to unpinned particles.
        const GRAVITY        = 0b0000_0001;
        /// Apply the sphere barrier force and penetration correction
        /// (only meaningful when a sphere obstacle is attached).
        const SPHERE_CONTACT = 0b0000_0010;
    }
}

impl Default for StageFlags {
    fn default() -> Self {
        Self::GRAVITY | Self::SPHERE_CONTACT
    }
}

/// Configuration for building a [`Cloth`](crate::Cloth).
///
/// Defaults describe a hanging 24×16 sheet tuned for 60 Hz stepping with
/// two substeps per frame.
///
/// # Builder Pattern
/// ```
/// use tracery_cloth::{ClothConfig, Vec3};
///
/// let config = ClothConfig::new()
///     .with_grid(10, 8)
///     .with_gravity(Vec3::new(0.0, -9.81, 0.0))
///     .with_pin_stride(2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClothConfig {
    /// Particles per row. Default: 24.
    pub cols: usize,
    /// Particle rows. Default: 16.
    pub rows: usize,
    /// Grid spacing between neighboring particles. Default: 0.14.
    pub spacing: f64,
    /// Mass of every particle. Default: 0.08.
    pub particle_mass: f64,
    /// Structural spring stiffness; shear springs use 0.8 of this and bend
    /// springs 0.25. Default: 60.
    ///
    /// The integrator is explicit, so `stiffness * dt^2 / particle_mass`
    /// must stay small or the lattice diverges; with the default mass and
    /// timestep the usable range tops out near 100.
    pub stiffness: f64,
    /// Multiplicative velocity damping per step, in `(0, 1]`. Default: 0.995.
    pub damping: f64,
    /// Fixed timestep per [`step`](crate::Cloth::step). Default: 1/60.
    pub dt: f64,
    /// Gravity acceleration. Default: `(0, -9.81, 0)`.
    pub gravity: Vec3,
    /// Gap below which the sphere barrier force activates. Default: 0.02.
    pub contact_gap_max: f64,
    /// Height of the bottom particle row; rows stack upward from it.
    /// Default: 2.
    pub base_height: f64,
    /// Pin every n-th particle of the top row; 0 pins none. Default: 4.
    pub pin_stride: usize,
    /// Which simulation stages run. Default: all.
    pub flags: StageFlags,
}

impl ClothConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            cols: 24,
            rows: 16,
            spacing: 0.14,
            particle_mass: 0.08,
            stiffness: 60.0,
            damping: 0.995,
            dt: 1.0 / 60.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            contact_gap_max: 0.02,
            base_height: 2.0,
            pin_stride: 4,
            flags: StageFlags::default(),
        }
    }

    /// Set the grid dimensions (both must be at least 1).
    pub fn with_grid(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the structural stiffness (shear and bend scale from it).
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Set the damping factor.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the top-row pin stride (0 pins nothing).
    pub fn with_pin_stride(mut self, pin_stride: usize) -> Self {
        self.pin_stride = pin_stride;
        self
    }

    /// Set the stage gates.
    pub fn with_flags(mut self, flags: StageFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_enable_everything() {
        let flags = StageFlags::default();
        assert!(flags.contains(StageFlags::GRAVITY));
        assert!(flags.contains(StageFlags::SPHERE_CONTACT));
    }

    #[test]
    fn builder_clamps_degenerate_grid() {
        let config = ClothConfig::new().with_grid(0, 0);
        assert_eq!(config.cols, 1);
        assert_eq!(config.rows, 1);
    }
}
