//! Grayscale reduction using the standard perceptual luma weighting.

use image::{GrayImage, RgbImage};

/// BT.601 luma of one RGB sample, rounded to the nearest integer.
#[inline(always)]
pub fn luma8(r: u8, g: u8, b: u8) -> u8 {
    let l = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    l.round().clamp(0.0, 255.0) as u8
}

/// Convert a color raster to an intensity grid of the same dimensions.
pub fn intensity(image: &RgbImage) -> GrayImage {
    let (w, h) = image.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        image::Luma([luma8(r, g, b)])
    })
}
