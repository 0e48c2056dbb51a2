//! Tile-mosaic rendering - each block's mean intensity picks a graduated tile.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;

use crate::atlas::TileAtlas;
use crate::raster::{self, Rect};
use crate::{luma, Result};

/// Map a block's mean intensity to an atlas index.
///
/// `invert` flips the mapping so light regions pick from the dark end. The
/// result is always within [0, num_tiles−1].
pub fn tile_index(mean: f64, num_tiles: usize, invert: bool) -> usize {
    let val = if invert { 255.0 - mean } else { mean };
    let index = (val / 255.0 * num_tiles.saturating_sub(1) as f64) as usize;
    index.min(num_tiles.saturating_sub(1))
}

/// Render `input` as a mosaic of atlas tiles on a `tile_size` grid.
///
/// The output has the input's exact dimensions; edge blocks crop the pasted
/// tile rather than growing or padding the canvas. Blocks are classified in
/// parallel (read-only grid and atlas), then composited serially into
/// disjoint output regions.
pub fn render(
    input: &RgbImage,
    atlas: &TileAtlas,
    tile_size: u32,
    invert: bool,
) -> Result<RgbImage> {
    let (w, h) = input.dimensions();
    raster::check_dimensions(w, h)?;
    let gray = luma::intensity(input);

    log::debug!(
        "mosaic render: {w}x{h}, set '{}' ({} tiles), tile_size {tile_size}, invert {invert}",
        atlas.name(),
        atlas.len()
    );

    // Each tile is resized once per render call; blocks share the results.
    let resized: Vec<RgbImage> = atlas
        .tiles()
        .iter()
        .map(|t| imageops::resize(t, tile_size, tile_size, FilterType::Lanczos3))
        .collect();

    let blocks: Vec<Rect> = raster::blocks(w, h, tile_size).collect();
    let picks: Vec<(Rect, usize)> = blocks
        .par_iter()
        .map(|&rect| {
            let mean = raster::region_mean(&gray, rect);
            (rect, tile_index(mean, atlas.len(), invert))
        })
        .collect();

    let mut out = RgbImage::new(w, h);
    for (rect, index) in picks {
        let tile = &resized[index];
        for dy in 0..rect.h {
            for dx in 0..rect.w {
                out.put_pixel(rect.x + dx, rect.y + dy, *tile.get_pixel(dx, dy));
            }
        }
    }
    Ok(out)
}
