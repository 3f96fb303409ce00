// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fractal evaluation capability and its reference implementations.
//!
//! A fractal function is anything that can turn complex coordinates
//! plus an iteration budget into three color channels.  The renderer
//! calls it in one of two shapes: a whole grid of coordinates at once
//! (the fast path), or one coordinate at a time (the slow path that can
//! recover from a failure on a single pathological point).  The two
//! shapes must agree: evaluating a grid must produce exactly the values
//! that evaluating its points one by one would, and the default grid
//! implementation guarantees that by construction.
//!
//! Two reference implementations live here.  `Mandelbrot` runs the
//! classic escape-time iteration `z = z*z + c` and derives its colors
//! from how fast each point runs away; `ExpMap` iterates `n = exp(n)`
//! instead, with the same escape scaffolding, as a demonstration that
//! the capability is generic over the iterated map.

use failure::Fail;
use itertools::iproduct;
use num::Complex;

use viewport::{linspace, Viewport};

/// Magnitude past which a point is considered to have escaped.  The
/// iteration keeps running to the full budget after the threshold is
/// crossed; the channel formulas read the final (overflowed) iterate.
pub const ESCAPE_THRESHOLD: f64 = 9e23;

/// An evaluator failed on a point.  Only the per-pixel render mode can
/// recover from this; in bulk mode one bad point fails the whole frame.
#[derive(Debug, Fail)]
#[fail(display = "evaluation failed at {}: {}", point, reason)]
pub struct EvalError {
    /// The coordinate the evaluator could not handle.
    pub point: Complex<f64>,
    /// What went wrong, in the evaluator's own words.
    pub reason: String,
}

impl EvalError {
    /// Constructor.
    pub fn new(point: Complex<f64>, reason: &str) -> EvalError {
        EvalError {
            point,
            reason: reason.to_string(),
        }
    }
}

/// A grid of complex coordinates covering a viewport, one per pixel,
/// row-major.  Row 0 sits at the viewport's `ymax` (the top of the
/// image), the last row at `ymin`; column 0 at `xmin`, the last column
/// at `xmax`.  Built fresh per frame, consumed by the evaluator, and
/// dropped once the image exists.
pub struct PixelGrid {
    width: usize,
    height: usize,
    points: Vec<Complex<f64>>,
}

impl PixelGrid {
    /// Lays a `width` x `height` grid of coordinates over the viewport,
    /// endpoints inclusive on both axes.
    pub fn from_viewport(viewport: &Viewport, width: u32, height: u32) -> PixelGrid {
        let xs = linspace(viewport.xmin, viewport.xmax, width as usize);
        let ys = linspace(viewport.ymax, viewport.ymin, height as usize);
        let points = iproduct!(ys.iter(), xs.iter())
            .map(|(&im, &re)| Complex::new(re, im))
            .collect();
        PixelGrid {
            width: width as usize,
            height: height as usize,
            points,
        }
    }

    /// Columns in the grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows in the grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of points.  Used to size channel buffers.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in row-major order.
    pub fn points(&self) -> &[Complex<f64>] {
        &self.points
    }

    /// The coordinate at one pixel.  Panics past the grid edge.
    pub fn point(&self, row: usize, column: usize) -> Complex<f64> {
        self.points[row * self.width + column]
    }
}

/// The fractal evaluation capability.  Implementations map coordinates
/// and an iteration budget to three color channels in [0, 255] (values
/// outside that range are clamped at rasterization, not rejected), and
/// must give the same answer whether called point-by-point or over a
/// whole grid.
pub trait FractalFn: Sync {
    /// Names the function; the frame cache keeps each function's frames
    /// in a subdirectory of this name.
    fn name(&self) -> &str;

    /// Evaluates one coordinate to an (R, G, B) triple.  May fail on a
    /// pathological input; the per-pixel render mode recovers from that
    /// one pixel, bulk mode does not.
    fn eval_point(&self, c: Complex<f64>, max_iter: u32) -> Result<[f64; 3], EvalError>;

    /// Evaluates a whole grid to three channel buffers, each in the
    /// grid's row-major order.  The default walks `eval_point` over
    /// every point, which keeps the two shapes consistent by
    /// construction; any failure fails the whole call.
    fn eval_grid(&self, grid: &PixelGrid, max_iter: u32) -> Result<[Vec<f64>; 3], EvalError> {
        let mut reds = Vec::with_capacity(grid.len());
        let mut greens = Vec::with_capacity(grid.len());
        let mut blues = Vec::with_capacity(grid.len());
        for &c in grid.points() {
            let rgb = self.eval_point(c, max_iter)?;
            reds.push(rgb[0]);
            greens.push(rgb[1]);
            blues.push(rgb[2]);
        }
        Ok([reds, greens, blues])
    }
}

/// Everything one escape-time iteration of a point leaves behind: the
/// final iterate, the one before it, and the first iteration at which
/// the point crossed the escape threshold (the full budget if it never
/// did).
struct Orbit {
    z: Complex<f64>,
    oldz: Complex<f64>,
    depth: u32,
}

/// Runs `z = z*z + c` from `z = c` for the whole budget, recording the
/// escape depth on the way.  The magnitude check happens before each
/// update, so `depth` is the index of the first iterate already past
/// the threshold.
fn iterate_quadratic(c: Complex<f64>, max_iter: u32) -> Orbit {
    let mut z = c;
    let mut oldz = z;
    let mut depth = max_iter;
    for n in 0..max_iter {
        oldz = z;
        if depth == max_iter && z.norm() > ESCAPE_THRESHOLD {
            depth = n;
        }
        z = z * z + c;
    }
    Orbit { z, oldz, depth }
}

/// The escape depth of a single point under the quadratic map: the
/// first iteration at which its magnitude exceeds the escape threshold,
/// or `max_iter` if it stays bounded (an interior point).  Handy when
/// choosing an iteration budget for a region.
pub fn escape_depth(c: Complex<f64>, max_iter: u32) -> u32 {
    iterate_quadratic(c, max_iter).depth
}

/// The logistic-like squashing `255 - 255/(e^(v/50) + 1)` that maps an
/// unbounded value into [0, 255).
fn squash(v: f64) -> f64 {
    255.0 - 255.0 / ((v / 50.0).exp() + 1.0)
}

/// One of the six color channels an escape-time orbit can be rendered
/// through.  Any three of them, in any order, make an (R, G, B)
/// selection; different selections give visually distinct renderings of
/// the same set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorChannel {
    /// Squashed real part of the final iterate: inside/outside contrast.
    RealSigmoid,
    /// Squashed imaginary part of the final iterate.
    ImagSigmoid,
    /// Escape depth modulo 2, scaled: solid bands around the set.
    DepthParity,
    /// Log of the escape depth normalized by `ln(max_iter + 2)`:
    /// gradient bands around the set.
    DepthGradient,
    /// Magnitude of the last iteration step, modulo 2: distance shading
    /// inside the set.
    StepDistance,
    /// Squashed escape depth: distance from the set.
    DepthSigmoid,
}

impl ColorChannel {
    fn sample(self, orbit: &Orbit, max_iter: u32) -> f64 {
        match self {
            ColorChannel::RealSigmoid => squash(orbit.z.re).abs(),
            ColorChannel::ImagSigmoid => squash(orbit.z.im).abs(),
            ColorChannel::DepthParity => f64::from(orbit.depth % 2) * 54.0,
            ColorChannel::DepthGradient => {
                (f64::from(orbit.depth).ln() * 255.0 / (f64::from(max_iter) + 2.0).ln()).abs()
            }
            ColorChannel::StepDistance => ((orbit.z - orbit.oldz).norm() % 2.0) * 54.0,
            ColorChannel::DepthSigmoid => squash(f64::from(orbit.depth)).abs(),
        }
    }
}

/// The classic escape-time evaluator over `z = z*z + c`, with a
/// configurable choice of three color channels.  Every formula is total
/// over f64 (overflow runs to infinity and gets clamped at the cast),
/// so it is safe in bulk mode and `eval_point` never fails.
pub struct Mandelbrot {
    channels: [ColorChannel; 3],
}

impl Mandelbrot {
    /// An evaluator rendering the given channels as (R, G, B).
    pub fn new(channels: [ColorChannel; 3]) -> Mandelbrot {
        Mandelbrot { channels }
    }

    /// The banded look: solid bands, gradient bands, and distance from
    /// the set.  Frames land under the same `mandelbrot` cache
    /// directory as any other channel selection, so point a recolored
    /// run at a fresh animations directory.
    pub fn banded() -> Mandelbrot {
        Mandelbrot::new([
            ColorChannel::DepthParity,
            ColorChannel::DepthGradient,
            ColorChannel::DepthSigmoid,
        ])
    }
}

impl Default for Mandelbrot {
    /// Grayscale inside/outside contrast on all three channels.
    fn default() -> Mandelbrot {
        Mandelbrot::new([ColorChannel::RealSigmoid; 3])
    }
}

impl FractalFn for Mandelbrot {
    fn name(&self) -> &str {
        "mandelbrot"
    }

    fn eval_point(&self, c: Complex<f64>, max_iter: u32) -> Result<[f64; 3], EvalError> {
        let orbit = iterate_quadratic(c, max_iter);
        Ok([
            self.channels[0].sample(&orbit, max_iter),
            self.channels[1].sample(&orbit, max_iter),
            self.channels[2].sample(&orbit, max_iter),
        ])
    }
}

/// Iterated exponentiation, `n = exp(n)` from `n = c`.  Same squashing
/// as the escape-time channels, applied to the final iterate and the
/// last step; mostly here to show the capability is not married to the
/// quadratic map.
pub struct ExpMap;

impl FractalFn for ExpMap {
    fn name(&self) -> &str {
        "exp_map"
    }

    fn eval_point(&self, c: Complex<f64>, max_iter: u32) -> Result<[f64; 3], EvalError> {
        let mut n = c;
        let mut oldn = n;
        for _ in 0..max_iter {
            oldn = n;
            n = n.exp();
        }
        Ok([squash(n.re), squash(n.im), squash((n - oldn).norm())])
    }
}
