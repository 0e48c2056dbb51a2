//! Threshold strategies: random, ordered (Bayer) and error diffusion.
//!
//! All strategies consume an intensity grid and produce a bilevel grid where
//! every sample is exactly 0 or 255.

use image::GrayImage;
use rand::Rng;
use rayon::prelude::*;

use crate::{Result, SemitonosError};

/// An N×N ordered-dither threshold matrix whose cells form a bijection onto
/// [0, N²−1], tiled periodically across the image.
pub struct BayerMatrix {
    n: u32,
    cells: Vec<u32>,
}

impl BayerMatrix {
    /// Classical Bayer matrix of size `n` (power of two, ≥ 2), built by the
    /// recursive doubling rule B(2n) = [[4B, 4B+2], [4B+3, 4B+1]].
    pub fn new(n: u32) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(SemitonosError::InvalidParameter(format!(
                "unsupported ordered matrix size {n} (power of two >= 2 required)"
            )));
        }
        let mut cells: Vec<u32> = vec![0, 2, 3, 1];
        let mut size = 2;
        while size < n {
            let next = size * 2;
            let mut grown = vec![0u32; (next * next) as usize];
            for y in 0..size {
                for x in 0..size {
                    let v = 4 * cells[(y * size + x) as usize];
                    grown[(y * next + x) as usize] = v;
                    grown[(y * next + x + size) as usize] = v + 2;
                    grown[((y + size) * next + x) as usize] = v + 3;
                    grown[((y + size) * next + x + size) as usize] = v + 1;
                }
            }
            cells = grown;
            size = next;
        }
        Ok(Self { n, cells })
    }

    pub fn size(&self) -> u32 {
        self.n
    }

    /// Matrix cell for image position (x, y), indexed modulo N.
    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> u32 {
        self.cells[((y % self.n) * self.n + (x % self.n)) as usize]
    }

    /// Luminance-domain threshold for position (x, y): (cell / N²) · 255.
    #[inline]
    pub fn threshold(&self, x: u32, y: u32) -> f32 {
        self.cell(x, y) as f32 / (self.n * self.n) as f32 * 255.0
    }
}

/// Random threshold dithering: each pixel is compared against a fresh uniform
/// draw in [0, 255]. Unseeded, so output differs across runs; see
/// [`random_with`] for a reproducible variant.
pub fn random(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let row = (w as usize).max(1);
    let mut out = vec![0u8; gray.as_raw().len()];
    // Per-pixel decisions are independent; rows run in parallel, each with
    // its own thread-local generator.
    out.par_chunks_mut(row)
        .zip(gray.as_raw().par_chunks(row))
        .for_each(|(dst, row)| {
            let mut rng = rand::thread_rng();
            for (&lum, o) in row.iter().zip(dst.iter_mut()) {
                let r: u8 = rng.gen_range(0..=255);
                *o = if lum > r { 255 } else { 0 };
            }
        });
    GrayImage::from_raw(w, h, out).expect("buffer sized to dimensions")
}

/// Random threshold dithering with a caller-supplied generator. The unseeded
/// [`random`] entry point is the reference behavior; this variant exists so
/// the statistical contract can be exercised reproducibly.
pub fn random_with<R: Rng>(gray: &GrayImage, rng: &mut R) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    for (src, dst) in gray.pixels().zip(out.pixels_mut()) {
        let r: u8 = rng.gen_range(0..=255);
        dst.0[0] = if src.0[0] > r { 255 } else { 0 };
    }
    out
}

/// Ordered dithering against a periodically tiled Bayer matrix. Deterministic:
/// local dot density encodes local tone.
pub fn ordered(gray: &GrayImage, matrix: &BayerMatrix) -> GrayImage {
    let (w, h) = gray.dimensions();
    let row = (w as usize).max(1);
    let mut out = vec![0u8; gray.as_raw().len()];
    out.par_chunks_mut(row)
        .zip(gray.as_raw().par_chunks(row))
        .enumerate()
        .for_each(|(y, (dst, row))| {
            for (x, (&lum, o)) in row.iter().zip(dst.iter_mut()).enumerate() {
                let t = matrix.threshold(x as u32, y as u32);
                *o = if f32::from(lum) > t { 255 } else { 0 };
            }
        });
    GrayImage::from_raw(w, h, out).expect("buffer sized to dimensions")
}

/// Error-diffusion kernel selection. The kernel is a data table; one control
/// structure in [`diffuse`] serves all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// 4 taps, weights /16. The classic.
    FloydSteinberg,
    /// 2 taps at ½ each: coarser, more correlated patterning.
    FakeFloydSteinberg,
    /// 12 taps over two rows below, weights /48: finer, smoother patterning.
    JarvisJudiceNinke,
}

impl Kernel {
    /// Diffusion taps as (dx, dy, weight). Weights sum to 1.0 and every tap
    /// targets a pixel visited later in raster order.
    pub fn taps(self) -> &'static [(i32, i32, f32)] {
        match self {
            Kernel::FloydSteinberg => &[
                (1, 0, 7.0 / 16.0),
                (-1, 1, 3.0 / 16.0),
                (0, 1, 5.0 / 16.0),
                (1, 1, 1.0 / 16.0),
            ],
            Kernel::FakeFloydSteinberg => &[(1, 0, 0.5), (0, 1, 0.5)],
            Kernel::JarvisJudiceNinke => &[
                (1, 0, 7.0 / 48.0),
                (2, 0, 5.0 / 48.0),
                (-2, 1, 3.0 / 48.0),
                (-1, 1, 5.0 / 48.0),
                (0, 1, 7.0 / 48.0),
                (1, 1, 5.0 / 48.0),
                (2, 1, 3.0 / 48.0),
                (-2, 2, 1.0 / 48.0),
                (-1, 2, 3.0 / 48.0),
                (0, 2, 5.0 / 48.0),
                (1, 2, 3.0 / 48.0),
                (2, 2, 1.0 / 48.0),
            ],
        }
    }
}

/// Error diffusion in strict raster order (row-major, left-to-right).
///
/// The working buffer is a mutable copy of the input; diffusion writes back
/// into not-yet-visited pixels of that buffer, so later pixels observe the
/// corrections from earlier ones. Neighbor updates are clamped to [0, 255];
/// error aimed outside the image bounds is dropped.
pub fn diffuse(gray: &GrayImage, kernel: Kernel) -> GrayImage {
    let (w, h) = gray.dimensions();
    let (wi, hi) = (i64::from(w), i64::from(h));
    let mut work: Vec<f32> = gray.as_raw().iter().map(|&v| f32::from(v)).collect();
    let mut out = vec![0u8; work.len()];
    for y in 0..hi {
        for x in 0..wi {
            let idx = (y * wi + x) as usize;
            let old = work[idx];
            let new = if old >= 128.0 { 255.0 } else { 0.0 };
            out[idx] = new as u8;
            let err = old - new;
            for &(dx, dy, weight) in kernel.taps() {
                let (nx, ny) = (x + i64::from(dx), y + i64::from(dy));
                if nx < 0 || nx >= wi || ny >= hi {
                    continue;
                }
                let n = (ny * wi + nx) as usize;
                work[n] = (work[n] + err * weight).clamp(0.0, 255.0);
            }
        }
    }
    GrayImage::from_raw(w, h, out).expect("buffer sized to dimensions")
}
