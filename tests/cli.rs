// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::Command;
use image::{ColorType, ImageBuffer, Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn picture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let image: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x * 20) as u8, (y * 30) as u8, ((x + y) * 10) as u8, 255])
    });
    image.save(&path).unwrap();
    path
}

fn liquidseam() -> Command {
    Command::cargo_bin("liquidseam").unwrap()
}

#[test]
fn resizes_a_png() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 12, 8);
    let output = dir.path().join("out.png");
    liquidseam()
        .arg(&input)
        .arg(&output)
        .args(["--width", "9", "--height", "10", "--energy", "norm", "--step", "2"])
        .assert()
        .success();
    let result = image::open(&output).unwrap();
    assert_eq!((result.width(), result.height()), (9, 10));
}

#[test]
fn writes_sixteen_bit_pngs() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 8, 8);
    let output = dir.path().join("out.png");
    liquidseam()
        .arg(&input)
        .arg(&output)
        .args(["--width", "6", "--height", "8", "--sixteen-bit", "--incremental"])
        .assert()
        .success();
    assert_eq!(image::open(&output).unwrap().color(), ColorType::Rgba16);
}

#[test]
fn writes_jpegs_without_alpha() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 10, 10);
    let output = dir.path().join("out.jpg");
    liquidseam()
        .arg(&input)
        .arg(&output)
        .args(["--width", "8", "--height", "8", "--reader", "luma", "--order", "vertical"])
        .assert()
        .success();
    let result = image::open(&output).unwrap();
    assert_eq!((result.width(), result.height()), (8, 8));
}

#[test]
fn accepts_a_weight_mask() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 10, 6);
    let mask = picture(dir.path(), "mask.png", 10, 6);
    let output = dir.path().join("out.png");
    liquidseam()
        .arg(&input)
        .arg(&output)
        .args(["--width", "7", "--height", "6", "--skin-tones"])
        .arg("--mask")
        .arg(&mask)
        .assert()
        .success();
    assert!(output.exists());
}

#[test]
fn reports_bad_configuration() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 6, 6);
    let output = dir.path().join("out.png");
    liquidseam()
        .arg(&input)
        .arg(&output)
        .args(["--width", "4", "--height", "4", "--step", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("seam step must be at least 1"));
    assert!(!output.exists());
}

#[test]
fn reports_a_mask_of_the_wrong_size() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 6, 6);
    let mask = picture(dir.path(), "mask.png", 5, 6);
    let output = dir.path().join("out.png");
    liquidseam()
        .arg(&input)
        .arg(&output)
        .args(["--width", "4", "--height", "6"])
        .arg("--mask")
        .arg(&mask)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bias field is 5x6"));
}

#[test]
fn reports_a_missing_input() {
    let dir = TempDir::new().unwrap();
    liquidseam()
        .arg(dir.path().join("nothing.png"))
        .arg(dir.path().join("out.png"))
        .args(["--width", "4", "--height", "4"])
        .assert()
        .failure();
}

#[test]
fn needs_a_target_size() {
    let dir = TempDir::new().unwrap();
    let input = picture(dir.path(), "in.png", 6, 6);
    liquidseam()
        .arg(&input)
        .arg(dir.path().join("out.png"))
        .arg("--width")
        .arg("4")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--height"));
}
