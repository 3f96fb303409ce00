// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Orchestrating a whole animation.
//!
//! The single-process path walks a contiguous range of frame indices,
//! skipping every frame whose file already exists and rendering the
//! rest.  The parallel path slices the full frame range into contiguous
//! equal chunks, hands each chunk to its own worker, and joins the
//! workers in submission order, so the concatenated result is in frame
//! order no matter which worker finished first.  Workers share nothing
//! but the output directory, and their index ranges are disjoint, so
//! the check-then-write against the frame cache needs no locking.
//!
//! A worker failure surfaces when its chunk's result is collected;
//! frames that other workers already wrote stay on disk, and rerunning
//! the same animation skips them.

extern crate crossbeam;
extern crate num_cpus;

use std::fs;
use std::path::PathBuf;

use failure::{Error, Fail};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cache;
use fractal::FractalFn;
use render::{render_frame, RenderMode};
use viewport::ZoomPath;

/// The ways an animation run can be mis-assembled.
#[derive(Debug, Fail, PartialEq)]
pub enum AnimationError {
    /// The worker count does not evenly divide the frame count.  The
    /// chunking is strict about this: silently truncating the range
    /// would drop the remainder frames off the end of the animation.
    #[fail(display = "{} workers cannot evenly chunk {} frames", workers, steps)]
    UnevenChunks {
        /// Requested worker count.
        workers: usize,
        /// Frames on the zoom path.
        steps: usize,
    },
    /// The requested frame range runs past the end of the zoom path.
    #[fail(display = "frames {}..{} fall outside the {}-frame zoom path", start, end, len)]
    FrameOutOfRange {
        /// First requested index.
        start: usize,
        /// One past the last requested index.
        end: usize,
        /// Frames on the zoom path.
        len: usize,
    },
}

/// Everything about an animation that is shared across its frames:
/// canvas size, iteration budget, render strategy, and where the
/// frames land on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Iteration budget per point.
    pub max_iter: u32,
    /// Bulk or per-pixel rasterization.
    pub mode: RenderMode,
    /// Directory the per-function frame subdirectories live under.
    pub animations_dir: PathBuf,
}

impl Default for AnimationConfig {
    /// The canvas the downstream video assembler expects (1920x1080),
    /// a 255-iteration budget, bulk rendering, and an `anims`
    /// directory.
    fn default() -> AnimationConfig {
        AnimationConfig {
            width: 1920,
            height: 1080,
            max_iter: 255,
            mode: RenderMode::Bulk,
            animations_dir: PathBuf::from("anims"),
        }
    }
}

/// Renders frames `start .. start + count` of the zoom path in one
/// process, creating `{animations_dir}/{func name}/` if it is absent.
/// Frames whose file already exists are skipped entirely; only the
/// freshly rendered images come back, in increasing index order, so a
/// fully cached range returns an empty list.
pub fn render_range(
    path: &ZoomPath,
    config: &AnimationConfig,
    start: usize,
    count: usize,
    func: &dyn FractalFn,
) -> Result<Vec<RgbImage>, Error> {
    let end = start + count;
    if end > path.len() {
        return Err(AnimationError::FrameOutOfRange {
            start,
            end,
            len: path.len(),
        }
        .into());
    }

    fs::create_dir_all(config.animations_dir.join(func.name()))?;

    let mut images = Vec::new();
    for index in start..end {
        let viewport = path.viewport(index);
        let file = cache::frame_path(&config.animations_dir, func.name(), index, &viewport);
        if cache::frame_exists(&file)? {
            debug!("frame {} already on disk, skipping", index);
            continue;
        }
        let image = render_frame(
            &viewport,
            config.width,
            config.height,
            config.max_iter,
            func,
            config.mode,
        )?;
        image.save(&file)?;
        images.push(image);
    }
    Ok(images)
}

/// Renders the whole zoom path across `workers` parallel workers, each
/// owning one contiguous chunk of `len / workers` frames.  `workers`
/// must evenly divide the path length.  Joining the workers in
/// submission order keeps the concatenated images in frame order;
/// like `render_range`, only freshly rendered frames come back.
pub fn render_animation(
    path: &ZoomPath,
    config: &AnimationConfig,
    func: &dyn FractalFn,
    workers: usize,
) -> Result<Vec<RgbImage>, Error> {
    let steps = path.len();
    if workers == 0 || steps % workers != 0 {
        return Err(AnimationError::UnevenChunks { workers, steps }.into());
    }
    let chunk_size = steps / workers;
    info!(
        "dispatching {} frames as {} chunks of {}",
        steps, workers, chunk_size
    );

    let chunks: Vec<Result<Vec<RgbImage>, Error>> = crossbeam::scope(|spawner| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let start = worker * chunk_size;
                spawner.spawn(move |_| render_range(path, config, start, chunk_size, func))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    })
    .unwrap();

    let mut images = Vec::new();
    for chunk in chunks {
        images.extend(chunk?);
    }
    Ok(images)
}

/// The largest worker count that both fits the machine and evenly
/// divides `steps`.  Feeding this to `render_animation` satisfies its
/// divisibility requirement without dropping cores on the floor.
pub fn default_workers(steps: usize) -> usize {
    let cores = num_cpus::get();
    (1..=cores.min(steps))
        .rev()
        .find(|workers| steps % workers == 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractal::Mandelbrot;
    use viewport::ZoomEndpoint;

    fn ten_frame_path() -> ZoomPath {
        ZoomPath::from_endpoints(
            ZoomEndpoint::new(0.36, 0.1, 2.0, 1.6),
            ZoomEndpoint::new(0.36, 0.1, 0.02, 0.016),
            10,
        )
    }

    #[test]
    fn uneven_worker_counts_are_rejected() {
        let path = ten_frame_path();
        let config = AnimationConfig::default();
        let func = Mandelbrot::default();
        for &workers in &[0usize, 3, 4, 7, 11] {
            let err = render_animation(&path, &config, &func, workers).unwrap_err();
            assert_eq!(
                err.downcast_ref::<AnimationError>(),
                Some(&AnimationError::UnevenChunks { workers, steps: 10 })
            );
        }
    }

    #[test]
    fn out_of_range_frames_are_rejected() {
        let path = ten_frame_path();
        let config = AnimationConfig::default();
        let func = Mandelbrot::default();
        let err = render_range(&path, &config, 8, 5, &func).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AnimationError>(),
            Some(&AnimationError::FrameOutOfRange {
                start: 8,
                end: 13,
                len: 10
            })
        );
    }

    #[test]
    fn default_workers_always_divides() {
        for &steps in &[1usize, 10, 24, 60, 97, 360] {
            let workers = default_workers(steps);
            assert!(workers >= 1);
            assert_eq!(steps % workers, 0);
        }
    }

    #[test]
    fn default_config_matches_the_assembler_canvas() {
        let config = AnimationConfig::default();
        assert_eq!((config.width, config.height), (1920, 1080));
        assert_eq!(config.max_iter, 255);
        assert_eq!(config.mode, RenderMode::Bulk);
    }
}
