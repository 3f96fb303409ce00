// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rasterizing one viewport into one image.
//!
//! Two interchangeable strategies.  Bulk mode lays the whole coordinate
//! grid out first and hands it to the evaluator in a single call; this
//! is the fast path, and the one to use for any evaluator that cannot
//! fail.  Per-pixel mode walks the same coordinates one at a time, so
//! an evaluator that fails on a single pathological point costs one
//! black pixel instead of the whole frame.  For an evaluator that never
//! fails, the two modes produce pixel-identical images.

use failure::{err_msg, Error};
use image::RgbImage;
use num::{clamp, Complex};
use serde::{Deserialize, Serialize};
use tracing::warn;

use fractal::{FractalFn, PixelGrid};
use viewport::{linspace, Viewport};

/// Which rasterization strategy to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// One evaluator call over the whole coordinate grid.
    Bulk,
    /// One evaluator call per coordinate, with per-pixel recovery.
    PerPixel,
}

fn to_byte(channel: f64) -> u8 {
    clamp(channel, 0.0, 255.0) as u8
}

/// Renders a frame by evaluating the whole coordinate grid in one
/// call, then interleaving the three returned channel buffers into an
/// 8-bit RGB image.  An evaluator failure on any point fails the
/// frame.
pub fn render_bulk(
    viewport: &Viewport,
    width: u32,
    height: u32,
    max_iter: u32,
    func: &dyn FractalFn,
) -> Result<RgbImage, Error> {
    let grid = PixelGrid::from_viewport(viewport, width, height);
    let [reds, greens, blues] = func.eval_grid(&grid, max_iter)?;
    let mut raw = Vec::with_capacity(grid.len() * 3);
    for i in 0..grid.len() {
        raw.push(to_byte(reds[i]));
        raw.push(to_byte(greens[i]));
        raw.push(to_byte(blues[i]));
    }
    RgbImage::from_raw(width, height, raw)
        .ok_or_else(|| err_msg("channel buffers did not fill the image"))
}

/// Renders a frame one coordinate at a time.  Strictly slower than
/// `render_bulk`, but an evaluator failure costs only the failing
/// pixel, which is painted black and logged.
pub fn render_per_pixel(
    viewport: &Viewport,
    width: u32,
    height: u32,
    max_iter: u32,
    func: &dyn FractalFn,
) -> RgbImage {
    let xs = linspace(viewport.xmin, viewport.xmax, width as usize);
    let ys = linspace(viewport.ymax, viewport.ymin, height as usize);
    let mut raw = Vec::with_capacity(xs.len() * ys.len() * 3);
    for &im in &ys {
        for &re in &xs {
            let rgb = match func.eval_point(Complex::new(re, im), max_iter) {
                Ok(rgb) => rgb,
                Err(e) => {
                    warn!("painting one pixel black: {}", e);
                    [0.0; 3]
                }
            };
            raw.push(to_byte(rgb[0]));
            raw.push(to_byte(rgb[1]));
            raw.push(to_byte(rgb[2]));
        }
    }
    // the scan above visits exactly width * height points
    RgbImage::from_raw(width, height, raw).expect("pixel scan filled the image")
}

/// Renders a frame with the chosen strategy.
pub fn render_frame(
    viewport: &Viewport,
    width: u32,
    height: u32,
    max_iter: u32,
    func: &dyn FractalFn,
    mode: RenderMode,
) -> Result<RgbImage, Error> {
    match mode {
        RenderMode::Bulk => render_bulk(viewport, width, height, max_iter, func),
        RenderMode::PerPixel => Ok(render_per_pixel(viewport, width, height, max_iter, func)),
    }
}
