//! The filesystem-backed frame cache.
//!
//! A rendered frame's filename encodes its index and the exact
//! viewport bounds it was rendered from, so whether a frame already
//! exists can be decided from the name alone, with no decoding and no
//! content comparison.  Existence is the whole check: a frame file is
//! written once and never refreshed.  The bounds use a fixed 18
//! significant digit exponential format, which round-trips every f64
//! exactly and never changes between runs; the older scheme of default
//! float formatting could orphan a whole directory of frames the
//! moment the formatting changed.
//!
//! The downstream tools hold the other end of this contract: the video
//! assembler orders frames by the index token, and the coordinate
//! picker re-derives the viewport from the trailing bounds token.
//! `parse_frame_filename` is that derivation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use failure::Error;

use viewport::Viewport;

/// Formats one viewport bound for embedding in a filename.  Fixed
/// precision: 18 significant digits is enough to reproduce any f64
/// bit-for-bit on parse.
pub fn fmt_bound(value: f64) -> String {
    format!("{:.17e}", value)
}

/// The filename for one frame: `animation_{index}_{xmin}to{xmax}x{ymin}to{ymax}.png`.
pub fn frame_filename(index: usize, viewport: &Viewport) -> String {
    format!(
        "animation_{}_{}to{}x{}to{}.png",
        index,
        fmt_bound(viewport.xmin),
        fmt_bound(viewport.xmax),
        fmt_bound(viewport.ymin),
        fmt_bound(viewport.ymax),
    )
}

/// The full path for one frame: the animations directory, then a
/// subdirectory named after the fractal function, then the encoded
/// filename.
pub fn frame_path(
    animations_dir: &Path,
    func_name: &str,
    index: usize,
    viewport: &Viewport,
) -> PathBuf {
    animations_dir
        .join(func_name)
        .join(frame_filename(index, viewport))
}

/// Recovers the frame index and viewport from an encoded filename.
/// Returns `None` for any name this crate would not have written.
pub fn parse_frame_filename(name: &str) -> Option<(usize, Viewport)> {
    let stem = name.strip_suffix(".png")?;
    let rest = stem.strip_prefix("animation_")?;
    let mut parts = rest.splitn(2, '_');
    let index = parts.next()?.parse::<usize>().ok()?;
    let bounds = parts.next()?;

    let mut axes = bounds.split('x');
    let xs = axes.next()?;
    let ys = axes.next()?;
    if axes.next().is_some() {
        return None;
    }

    let parse_axis = |axis: &str| -> Option<(f64, f64)> {
        let mut ends = axis.splitn(2, "to");
        let min = ends.next()?.parse::<f64>().ok()?;
        let max = ends.next()?.parse::<f64>().ok()?;
        Some((min, max))
    };
    let (xmin, xmax) = parse_axis(xs)?;
    let (ymin, ymax) = parse_axis(ys)?;
    Some((index, Viewport::new(xmin, xmax, ymin, ymax)))
}

/// Whether a frame file already exists.  A missing file is the one
/// expected answer and means "render it"; any other filesystem error
/// (permissions, I/O fault) is fatal and propagates.
pub fn frame_exists(path: &Path) -> Result<bool, Error> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
