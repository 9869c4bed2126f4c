//! # alphadesk-plexus
//!
//! The "plexus" background: boundary nodes joined to a convergence point by
//! curved edges, particles flowing inward, and a ripple on demand.
//!
//! Drawing goes through the [`Surface`] trait, so any 2D backend can host it.
//!
//! ## Example
//!
//! ```rust
//! use alphadesk_plexus::{PlexusView, Scene, Surface, Rgba, Vec2, GradientStop};
//! use std::time::Duration;
//!
//! struct Nothing;
//!
//! impl Surface for Nothing {
//!     fn clear(&mut self, _: f32, _: f32) {}
//!     fn stroke_line(&mut self, _: Vec2, _: Vec2, _: Rgba, _: f32) {}
//!     fn fill_circle(&mut self, _: Vec2, _: f32, _: Rgba) {}
//!     fn fill_radial(&mut self, _: Vec2, _: f32, _: &[GradientStop]) {}
//!     fn stroke_circle(&mut self, _: Vec2, _: f32, _: Rgba, _: f32) {}
//! }
//!
//! let mut view = PlexusView::with_surface(Scene::with_seed(1280.0, 720.0, 1), Nothing);
//! view.scene_mut().trigger_ripple(1);
//! assert!(view.frame(Duration::from_millis(16)));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod frame_loop;
pub mod render;
pub mod scene;

pub use frame_loop::{FrameLoop, DEFAULT_FPS};
pub use render::{render, GradientStop, PlexusView, Rgba, Surface};
pub use scene::{edge_alpha, quadratic_bezier, Edge, Particle, Ripple, Scene, Vec2};
