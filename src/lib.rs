//! # HoloForge - Holographic Wireframe Display
//!
//! Glowing wireframe shapes surrounded by a flowing particle aura, cycling
//! through a catalogue of mathematical forms with dissolve and reform
//! transitions.
//!
//! HoloForge keeps the animation itself free of windows and GPUs: a
//! [`HoloScene`] is advanced with a frame delta and turned into a
//! [`glow::Frame`] of colored line strips and points. The [`window`] module
//! puts that on screen with wgpu.
//!
//! ## Quick Start
//!
//! ```ignore
//! use holoforge::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = HoloConfig::default();
//!     let scene = HoloScene::new(&config, 0);
//!     holoforge::window::run(config, scene)
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Shapes
//!
//! Every entry of the catalogue is a [`Shape`]: polylines drawn as the
//! wireframe, the vertex set, and a subset of polylines the particles flow
//! along. [`ShapeLibrary`] generates each one on first use and caches it.
//!
//! | Key | Shape |
//! |-----|-------|
//! | 1 | DNA Double Helix |
//! | 2 | Torus Knot |
//! | 3 | Lorenz Attractor |
//! | 4 | Wireframe Cube |
//! | 5 | Icosphere |
//! | 6 | Möbius Strip |
//! | 7 | Double Helix Torus |
//!
//! ### Transitions
//!
//! A shape is held, then dissolves (its wireframe bursts into points and the
//! particles scatter), then the next shape reforms (points converge and the
//! wireframe fades in):
//!
//! ```text
//! Holding --hold_time--> Dissolving --dissolve_time--> Reforming --reform_time--> Holding
//! ```
//!
//! Only `Holding` accepts a request for a new shape.
//!
//! ### Particles
//!
//! Each particle walks one flow path, orbits around it and leaves a short
//! trail. A [`HandForce`] pushes particles away (scatter) or pulls them in
//! (attract) within a radius.
//!
//! ### Glow
//!
//! Lines are drawn several times, widest and faintest first, so additive
//! blending builds a bright core with a soft halo. Colors follow depth from
//! the far color through the mid color to the near color.
//!
//! ## Controls
//!
//! | Input | Action |
//! |-------|--------|
//! | Space | Next shape |
//! | 1-7 | Jump to shape |
//! | R | Freeze or resume rotation and cycling |
//! | F | Toggle the status line |
//! | Left mouse | Scatter particles |
//! | Right mouse | Attract particles |
//! | Q / Esc | Quit |
//!
//! ## Logging
//!
//! HoloForge logs through the `log` crate. The binary installs
//! `env_logger`; set `RUST_LOG=holoforge=debug` for transition details.

pub mod config;
pub mod error;
pub mod geometry;
pub mod glow;
pub mod gpu;
pub mod input;
pub mod library;
pub mod particles;
pub mod random;
pub mod scene;
pub mod time;
pub mod transition;
pub mod window;

pub use config::HoloConfig;
pub use error::{AppError, ConfigError, GpuError};
pub use geometry::{Polyline, Shape};
pub use glam::{Vec2, Vec3};
pub use glow::{Frame, GlowRenderer};
pub use library::{ShapeKind, ShapeLibrary};
pub use particles::{ForceKind, HandForce, Particle, ParticleFlowSystem};
pub use scene::{Command, HoloScene};
pub use transition::{TransitionManager, TransitionPhase, TransitionState, TransitionStatus};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use holoforge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::HoloConfig;
    pub use crate::error::{AppError, ConfigError, GpuError};
    pub use crate::geometry::Shape;
    pub use crate::glow::{Frame, GlowRenderer};
    pub use crate::input::{Input, KeyCode, MouseButton};
    pub use crate::library::{ShapeKind, ShapeLibrary};
    pub use crate::particles::{ForceKind, HandForce};
    pub use crate::scene::{Command, HoloScene};
    pub use crate::time::FrameClock;
    pub use crate::transition::{TransitionPhase, TransitionStatus};
    pub use crate::{Vec2, Vec3};
}
