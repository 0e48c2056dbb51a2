//! Raster helpers - dimension checks, block partitioning, region statistics.

use image::{GrayImage, RgbImage};

use crate::{Result, SemitonosError};

/// A rectangular sub-region of a raster, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Reject zero-sized rasters before any pixel work begins.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SemitonosError::EmptyImage { width, height });
    }
    Ok(())
}

/// Iterate block origins on a `tile_size` grid, left-to-right, top-to-bottom.
///
/// Blocks never overlap; the last block in a row/column is cropped to the
/// remaining width/height when the image is not evenly divisible.
pub fn blocks(width: u32, height: u32, tile_size: u32) -> impl Iterator<Item = Rect> {
    let ts = tile_size.max(1);
    (0..height).step_by(ts as usize).flat_map(move |y| {
        (0..width).step_by(ts as usize).map(move |x| Rect {
            x,
            y,
            w: ts.min(width - x),
            h: ts.min(height - y),
        })
    })
}

/// Mean intensity of all pixels inside `rect`, via a 256-bin histogram.
pub fn region_mean(gray: &GrayImage, rect: Rect) -> f64 {
    let mut hist = [0u64; 256];
    for y in rect.y..rect.y + rect.h {
        for x in rect.x..rect.x + rect.w {
            hist[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    let total = u64::from(rect.w) * u64::from(rect.h);
    let sum: u64 = hist
        .iter()
        .enumerate()
        .map(|(value, &count)| value as u64 * count)
        .sum();
    sum as f64 / total as f64
}

/// Expand a single-channel grid to three equal channels for storage uniformity.
pub fn expand_to_rgb(gray: &GrayImage) -> RgbImage {
    let (w, h) = gray.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        image::Rgb([v, v, v])
    })
}
