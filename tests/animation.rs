// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end animation runs against a real temporary directory: cache
//! behavior, parallel/serial equivalence, and the filename contract.

extern crate serde_json;
extern crate tempfile;
extern crate zoombrot;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use zoombrot::cache;
use zoombrot::{
    render_animation, render_range, AnimationConfig, ExpMap, FractalFn, Mandelbrot, RenderMode,
    ZoomEndpoint, ZoomPath,
};

/// The demo zoom: dive toward 0.36 + 0.1i.
fn demo_path(steps: usize) -> ZoomPath {
    ZoomPath::from_endpoints(
        ZoomEndpoint::new(0.36, 0.1, 2.0, 1.6),
        ZoomEndpoint::new(0.36, 0.1, 0.02, 0.016),
        steps,
    )
}

/// A canvas small enough to render a whole animation in a test.
fn small_config(animations_dir: &Path) -> AnimationConfig {
    AnimationConfig {
        width: 48,
        height: 27,
        max_iter: 30,
        mode: RenderMode::Bulk,
        animations_dir: animations_dir.to_path_buf(),
    }
}

/// Every frame file under one function's subdirectory, name -> bytes.
fn frame_bytes(animations_dir: &Path, func_name: &str) -> BTreeMap<String, Vec<u8>> {
    let mut frames = BTreeMap::new();
    for entry in fs::read_dir(animations_dir.join(func_name)).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().into_string().unwrap();
        frames.insert(name, fs::read(entry.path()).unwrap());
    }
    frames
}

#[test]
fn parallel_matches_the_single_process_path() {
    let steps = 10;
    let path = demo_path(steps);
    let func = Mandelbrot::banded();

    let serial_dir = tempfile::tempdir().unwrap();
    let serial = render_range(&path, &small_config(serial_dir.path()), 0, steps, &func).unwrap();

    // one worker per frame: chunk_size comes out at 1
    let parallel_dir = tempfile::tempdir().unwrap();
    let parallel =
        render_animation(&path, &small_config(parallel_dir.path()), &func, steps).unwrap();

    assert_eq!(serial.len(), steps);
    assert_eq!(parallel.len(), steps);
    for (frame, (a, b)) in serial.iter().zip(parallel.iter()).enumerate() {
        assert_eq!(a.as_raw(), b.as_raw(), "frame {} differs", frame);
    }
}

#[test]
fn second_run_renders_nothing_and_rewrites_nothing() {
    let path = demo_path(6);
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let func = Mandelbrot::default();

    let first = render_range(&path, &config, 0, 6, &func).unwrap();
    assert_eq!(first.len(), 6);
    let before = frame_bytes(dir.path(), func.name());
    assert_eq!(before.len(), 6);

    let second = render_range(&path, &config, 0, 6, &func).unwrap();
    assert!(second.is_empty());
    assert_eq!(frame_bytes(dir.path(), func.name()), before);
}

#[test]
fn partially_cached_range_returns_only_the_new_frames() {
    let path = demo_path(10);
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let func = Mandelbrot::default();

    let head = render_range(&path, &config, 0, 4, &func).unwrap();
    assert_eq!(head.len(), 4);
    let rest = render_range(&path, &config, 0, 10, &func).unwrap();
    assert_eq!(rest.len(), 6);

    // the frames that came back are exactly the uncached tail
    let fresh_dir = tempfile::tempdir().unwrap();
    let tail = render_range(&path, &small_config(fresh_dir.path()), 4, 6, &func).unwrap();
    for (a, b) in rest.iter().zip(tail.iter()) {
        assert_eq!(a.as_raw(), b.as_raw());
    }
}

#[test]
fn parallel_rerun_is_fully_cached() {
    let path = demo_path(8);
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let func = Mandelbrot::default();

    let first = render_animation(&path, &config, &func, 4).unwrap();
    assert_eq!(first.len(), 8);
    let second = render_animation(&path, &config, &func, 4).unwrap();
    assert!(second.is_empty());
}

#[test]
fn render_modes_agree_through_the_orchestrator() {
    let path = demo_path(4);
    let func = Mandelbrot::banded();

    let bulk_dir = tempfile::tempdir().unwrap();
    let bulk_config = small_config(bulk_dir.path());
    let bulk = render_range(&path, &bulk_config, 0, 4, &func).unwrap();

    let pixel_dir = tempfile::tempdir().unwrap();
    let pixel_config = AnimationConfig {
        mode: RenderMode::PerPixel,
        ..small_config(pixel_dir.path())
    };
    let pixelwise = render_range(&path, &pixel_config, 0, 4, &func).unwrap();

    for (a, b) in bulk.iter().zip(pixelwise.iter()) {
        assert_eq!(a.as_raw(), b.as_raw());
    }
}

#[test]
fn frame_filenames_round_trip_from_disk() {
    let path = demo_path(5);
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let func = Mandelbrot::default();
    render_range(&path, &config, 0, 5, &func).unwrap();

    let mut seen = 0;
    for entry in fs::read_dir(dir.path().join(func.name())).unwrap() {
        let name = entry.unwrap().file_name().into_string().unwrap();
        let (index, viewport) = cache::parse_frame_filename(&name).unwrap();
        assert!(index < 5);
        assert_eq!(viewport, path.viewport(index));
        seen += 1;
    }
    assert_eq!(seen, 5);
}

#[test]
fn each_function_gets_its_own_subdirectory() {
    let path = demo_path(2);
    let dir = tempfile::tempdir().unwrap();
    let config = AnimationConfig {
        max_iter: 8,
        ..small_config(dir.path())
    };

    render_range(&path, &config, 0, 2, &Mandelbrot::default()).unwrap();
    render_range(&path, &config, 0, 2, &ExpMap).unwrap();

    assert_eq!(frame_bytes(dir.path(), "mandelbrot").len(), 2);
    assert_eq!(frame_bytes(dir.path(), "exp_map").len(), 2);
}

#[test]
fn config_survives_a_json_round_trip() {
    let config = AnimationConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: AnimationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
