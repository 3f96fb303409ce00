//! Viewports and the interpolated camera path of a zoom animation.
//!
//! A viewport is a rectangle of the complex plane destined to become
//! one frame.  A zoom path is the ordered sequence of viewports for a
//! whole animation, produced by interpolating between two camera
//! keyframes: the extents shrink geometrically while the center pans
//! linearly.

use num::Complex;
use serde::{Deserialize, Serialize};

/// A rectangle of the complex plane, destined to be rasterized into a
/// single frame.  The x axis is the real dimension, the y axis the
/// imaginary one.  Callers are expected to keep `xmin < xmax` and
/// `ymin < ymax`; nothing here enforces it, and a degenerate viewport
/// renders a degenerate image.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge (real axis).
    pub xmin: f64,
    /// Right edge (real axis).
    pub xmax: f64,
    /// Bottom edge (imaginary axis).
    pub ymin: f64,
    /// Top edge (imaginary axis).
    pub ymax: f64,
}

impl Viewport {
    /// Constructor in edge order.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Viewport {
        Viewport {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Builds the viewport of the given width and height centered on
    /// the point (x, y).
    pub fn centered(x: f64, y: f64, width: f64, height: f64) -> Viewport {
        Viewport {
            xmin: x - width / 2.0,
            xmax: x + width / 2.0,
            ymin: y - height / 2.0,
            ymax: y + height / 2.0,
        }
    }

    /// The center of the viewport as a point on the complex plane.
    pub fn center(&self) -> Complex<f64> {
        Complex::new((self.xmax + self.xmin) / 2.0, (self.ymax + self.ymin) / 2.0)
    }

    /// Extent along the real axis.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Extent along the imaginary axis.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// One end of a zoom animation: where the camera is centered and how
/// much of the plane it sees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomEndpoint {
    /// Real coordinate of the camera center.
    pub x: f64,
    /// Imaginary coordinate of the camera center.
    pub y: f64,
    /// Viewport extent along the real axis.
    pub width: f64,
    /// Viewport extent along the imaginary axis.
    pub height: f64,
}

impl ZoomEndpoint {
    /// Constructor, center first.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> ZoomEndpoint {
        ZoomEndpoint {
            x,
            y,
            width,
            height,
        }
    }
}

/// `count` points from `a` to `b` inclusive, evenly spaced.  The
/// endpoints are the inputs themselves, not recomputed, so they compare
/// exactly equal.
pub(crate) fn linspace(a: f64, b: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return vec![];
    }
    if count == 1 {
        return vec![a];
    }
    let step = (b - a) / ((count - 1) as f64);
    (0..count)
        .map(|i| {
            if i == count - 1 {
                b
            } else {
                a + step * (i as f64)
            }
        })
        .collect()
}

/// `count` points from `a` to `b` inclusive, each a constant ratio
/// apart.  Endpoints are exact, like `linspace`.
pub(crate) fn geomspace(a: f64, b: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return vec![];
    }
    if count == 1 {
        return vec![a];
    }
    let ratio = (b / a).powf(1.0 / ((count - 1) as f64));
    (0..count)
        .map(|i| {
            if i == count - 1 {
                b
            } else {
                a * ratio.powi(i as i32)
            }
        })
        .collect()
}

/// The full camera path of a zoom animation: four equal-length bounds
/// sequences, one viewport per frame.  Built once per animation and
/// read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomPath {
    xmins: Vec<f64>,
    xmaxs: Vec<f64>,
    ymins: Vec<f64>,
    ymaxs: Vec<f64>,
}

impl ZoomPath {
    /// Interpolates a camera path of `steps` viewports between two
    /// keyframes.  Widths and heights move geometrically, centers
    /// linearly; each frame's bounds are `center ± extent/2`.  With
    /// `steps == 1` the path is exactly the first keyframe.
    /// Non-positive extents are not rejected and will propagate all the
    /// way to degenerate frames.
    pub fn from_endpoints(first: ZoomEndpoint, last: ZoomEndpoint, steps: usize) -> ZoomPath {
        let widths = geomspace(first.width, last.width, steps);
        let heights = geomspace(first.height, last.height, steps);
        let centerxs = linspace(first.x, last.x, steps);
        let centerys = linspace(first.y, last.y, steps);

        let mut path = ZoomPath {
            xmins: Vec::with_capacity(steps),
            xmaxs: Vec::with_capacity(steps),
            ymins: Vec::with_capacity(steps),
            ymaxs: Vec::with_capacity(steps),
        };
        for i in 0..steps {
            path.xmins.push(centerxs[i] - widths[i] / 2.0);
            path.xmaxs.push(centerxs[i] + widths[i] / 2.0);
            path.ymins.push(centerys[i] - heights[i] / 2.0);
            path.ymaxs.push(centerys[i] + heights[i] / 2.0);
        }
        path
    }

    /// Interpolates a camera path between two boundary viewports by
    /// deriving each one's center and extents and delegating to
    /// `from_endpoints`.
    pub fn from_viewports(first: Viewport, last: Viewport, steps: usize) -> ZoomPath {
        ZoomPath::from_endpoints(
            ZoomEndpoint::new(first.center().re, first.center().im, first.width(), first.height()),
            ZoomEndpoint::new(last.center().re, last.center().im, last.width(), last.height()),
            steps,
        )
    }

    /// The number of frames on the path.
    pub fn len(&self) -> usize {
        self.xmins.len()
    }

    /// True when the path holds no frames at all.
    pub fn is_empty(&self) -> bool {
        self.xmins.is_empty()
    }

    /// The viewport for one frame.  Panics if `index` is past the end
    /// of the path.
    pub fn viewport(&self, index: usize) -> Viewport {
        Viewport {
            xmin: self.xmins[index],
            xmax: self.xmaxs[index],
            ymin: self.ymins[index],
            ymax: self.ymaxs[index],
        }
    }

    /// Walks the path in frame order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = Viewport> + 'a {
        (0..self.len()).map(move |i| self.viewport(i))
    }

    /// The four raw bounds sequences as (xmins, xmaxs, ymins, ymaxs).
    /// The orchestrator takes the whole path up front; this is the
    /// same data without the per-frame repackaging.
    pub fn bounds(&self) -> (&[f64], &[f64], &[f64], &[f64]) {
        (&self.xmins, &self.xmaxs, &self.ymins, &self.ymaxs)
    }
}
