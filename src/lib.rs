#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal zoom animation renderer
//!
//! A zoom into a fractal is a sequence of still frames, each one a
//! rasterization of a slightly smaller rectangle of the complex plane
//! than the one before it.  This crate produces those frames.  A
//! zoom path interpolates the camera between two keyframes, shrinking
//! the viewport geometrically (zooming is multiplicative: every frame
//! scales the view by a roughly constant ratio, it does not subtract a
//! constant amount) while panning the center linearly.  Each viewport
//! is handed to a renderer along with a fractal function, the
//! capability that turns a grid of complex coordinates and an
//! iteration budget into three color channels.  Rendered frames are
//! written to disk under names that encode the frame index and the
//! exact viewport bounds, so a rerun of the same animation skips every
//! frame that already exists, and the chunked orchestrator can fan the
//! frame range out across worker threads that share nothing but the
//! target directory.
//!
//! Assembling the finished frame directory into a video, and picking
//! coordinates off a rendered frame, are jobs for external tools; both
//! rely only on the frame filenames this crate writes.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;
extern crate serde;
extern crate tracing;

pub mod animate;
pub mod cache;
pub mod fractal;
pub mod render;
pub mod viewport;

pub use animate::{default_workers, render_animation, render_range, AnimationConfig};
pub use fractal::{escape_depth, ColorChannel, EvalError, ExpMap, FractalFn, Mandelbrot, PixelGrid};
pub use render::{render_bulk, render_frame, render_per_pixel, RenderMode};
pub use viewport::{Viewport, ZoomEndpoint, ZoomPath};
