//! Solid-color stand-in images, for demos and smoke tests.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::ComposeResult;

pub const PLACEHOLDER_WIDTH: u32 = 640;
pub const PLACEHOLDER_HEIGHT: u32 = 480;

pub const RED: [u8; 3] = [255, 0, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];

/// Write a `width`x`height` image filled with `rgb`. Format follows the extension.
pub fn write_solid_image(path: &Path, width: u32, height: u32, rgb: [u8; 3]) -> ComposeResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create image directory '{}'", parent.display()))?;
    }
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    img.save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

/// Create a 640x480 placeholder at `path` unless something already exists there.
///
/// Returns `true` when a new file was written.
pub fn ensure_placeholder(path: &Path, rgb: [u8; 3]) -> ComposeResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    tracing::info!(path = %path.display(), "creating placeholder image");
    write_solid_image(path, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, rgb)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn writes_png_with_requested_color_and_size() {
        let path = PathBuf::from("target")
            .join("placeholder_tests")
            .join("red.png");
        let _ = std::fs::remove_file(&path);

        write_solid_image(&path, 8, 6, RED).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (8, 6));
        assert_eq!(img.get_pixel(3, 3).0, RED);
    }

    #[test]
    fn ensure_does_not_overwrite_existing_file() {
        let dir = PathBuf::from("target").join("placeholder_tests");
        let path = dir.join("keep.png");
        let _ = std::fs::remove_file(&path);

        assert!(ensure_placeholder(&path, BLUE).unwrap());
        assert!(!ensure_placeholder(&path, RED).unwrap());

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
        assert_eq!(img.get_pixel(0, 0).0, BLUE);
    }
}
