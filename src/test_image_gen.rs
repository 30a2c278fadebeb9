use image::{ImageError, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// File names of the demo set; the time blocks follow one satellite pass.
pub const DEMO_FILE_NAMES: [&str; 4] = [
    "meteor_2024-03-01_143059.png",
    "meteor_2024-03-01_143259.png",
    "meteor_2024-03-01 143459.png",
    "meteor_2024-03-01_143659.png",
];

const DEMO_TINTS: [Rgb<u8>; 4] = [
    Rgb([40, 90, 160]),
    Rgb([160, 60, 40]),
    Rgb([50, 140, 70]),
    Rgb([120, 60, 150]),
];

pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Horizontal and vertical ramps over `tint`, so every pixel position has a
/// distinct value.
pub fn gradient_image(width: u32, height: u32, tint: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let fx = (x * 255 / width.max(1)) as u8;
        let fy = (y * 255 / height.max(1)) as u8;
        Rgb([fx, fy, tint[2]])
    })
}

/// Generates a synthetic "earth disc" image:
/// - dark background tinted with `tint`
/// - orange border around the edges
/// - large bright disc in the center
pub fn disc_image(width: u32, height: u32, tint: Rgb<u8>) -> RgbImage {
    let border = 5;
    let orange = Rgb([255, 165, 0]);
    let background = Rgb([tint[0] / 4, tint[1] / 4, tint[2] / 4]);

    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = width.min(height) as f32 / 2.0 - border as f32;

    RgbImage::from_fn(width, height, |x, y| {
        if x < border || x + border >= width || y < border || y + border >= height {
            return orange;
        }
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        if dx * dx + dy * dy <= radius * radius {
            tint
        } else {
            background
        }
    })
}

/// Writes the four demo images into `dir` and returns their paths in
/// collage order.
pub fn generate_demo_set(dir: &Path, width: u32, height: u32) -> Result<Vec<PathBuf>, ImageError> {
    fs::create_dir_all(dir).map_err(ImageError::IoError)?;
    DEMO_FILE_NAMES
        .iter()
        .zip(DEMO_TINTS)
        .map(|(name, tint)| -> Result<PathBuf, ImageError> {
            let path = dir.join(name);
            disc_image(width, height, tint).save(&path)?;
            Ok(path)
        })
        .collect()
}
