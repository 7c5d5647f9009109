// Copyright 2025 the Tracery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mass-spring cloth simulation with sphere contact.
//!
//! A rectangular particle grid connected by three classes of springs
//! (structural, shear, bend), integrated with position Verlet and damped
//! multiplicatively. An optional sphere obstacle repels nearby particles
//! with a smooth barrier force and hard-corrects any residual penetration,
//! so the cloth drapes over it without tunnelling at interactive timesteps.
//!
//! The crate owns simulation state only. Rendering is up to the caller:
//! read [`Cloth::positions`] each frame and re-upload your mesh. The
//! expected frame shape is a fixed small number of [`Cloth::step`] calls
//! (see [`Cloth::step_n`]) followed by one read-out.
//!
//! Pointer interaction is supported through
//! [`Cloth::nearest_particle`] / [`Cloth::begin_drag`] /
//! [`Cloth::drag_to`] / [`Cloth::end_drag`]: dragging overwrites one
//! particle's position each frame while the rest of the cloth keeps
//! simulating, and releasing inherits the accumulated Verlet velocity, so a
//! fast release throws the cloth.

mod config;
mod math;
mod sim;

pub use config::{ClothConfig, StageFlags};
pub use math::Vec3;
pub use sim::{Cloth, DEFAULT_DRAG_THRESHOLD, Particle, Sphere, Spring, SpringKind};
