//! Halftone and dithering filters for raster images.
//!
//! Reduces a full-color raster to a bilevel or tile-mosaic representation
//! while preserving perceived tone through spatial patterning: random
//! thresholding, ordered (Bayer) dithering, error diffusion, and a mosaic
//! renderer that substitutes image blocks with graduated-tone tiles.

pub mod atlas;
pub mod dither;
pub mod luma;
pub mod mosaic;
pub mod raster;

pub use atlas::{AtlasStore, SetEntry, TileAtlas};
pub use dither::{BayerMatrix, Kernel};

use std::path::PathBuf;

use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SemitonosError {
    /// Bad tile_size, unsupported matrix size or kernel, unknown set id.
    /// Raised before any pixel work begins.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A tile file could not be located or decoded. Fatal to the current
    /// render; never retried.
    #[error("missing tile asset {path}: {source}")]
    MissingAsset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Zero-sized input raster.
    #[error("empty input image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SemitonosError>;

/// Filter selection and parameters, supplied per call by the host layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Per-pixel random threshold. Fresh draws each run; output is
    /// intentionally non-deterministic.
    Random,
    /// Ordered dithering with an N×N Bayer matrix (N a power of two ≥ 2).
    Ordered { matrix: u32 },
    /// Error diffusion with one of the built-in kernels.
    Diffusion { kernel: Kernel },
    /// Tile mosaic over the named set with the given block size.
    Mosaic { set: String, tile_size: u32, invert: bool },
}

/// Single entry point: validates parameters and dispatches one filter
/// invocation over an input raster. Holds the atlas store used to resolve
/// mosaic tile sets; no other state crosses invocations.
pub struct Pipeline {
    assets: AtlasStore,
}

impl Pipeline {
    pub fn new(assets: AtlasStore) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &AtlasStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AtlasStore {
        &mut self.assets
    }

    /// Apply `filter` to `input` and return the finished raster.
    ///
    /// Bilevel strategies run on the luminance reduction of the input and are
    /// expanded back to three equal channels for storage uniformity. The
    /// output always has the input's dimensions; on failure no partial output
    /// is returned.
    pub fn apply(&self, input: &RgbImage, filter: &Filter) -> Result<RgbImage> {
        raster::check_dimensions(input.width(), input.height())?;
        match filter {
            Filter::Random => {
                let gray = luma::intensity(input);
                Ok(raster::expand_to_rgb(&dither::random(&gray)))
            }
            Filter::Ordered { matrix } => {
                let matrix = BayerMatrix::new(*matrix)?;
                let gray = luma::intensity(input);
                Ok(raster::expand_to_rgb(&dither::ordered(&gray, &matrix)))
            }
            Filter::Diffusion { kernel } => {
                let gray = luma::intensity(input);
                Ok(raster::expand_to_rgb(&dither::diffuse(&gray, *kernel)))
            }
            Filter::Mosaic { set, tile_size, invert } => {
                if *tile_size == 0 {
                    return Err(SemitonosError::InvalidParameter(
                        "tile_size must be positive".to_string(),
                    ));
                }
                // Atlas lives only for this render call.
                let atlas = self.assets.load(set)?;
                mosaic::render(input, &atlas, *tile_size, *invert)
            }
        }
    }
}
