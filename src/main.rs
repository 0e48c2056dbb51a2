//! semitonos CLI - apply halftone and dithering filters to an image

use clap::{Parser, ValueEnum};
use semitonos::{AtlasStore, Filter, Kernel, Pipeline, SemitonosError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "semitonos", about = "Apply halftone and dithering filters to an image")]
struct Args {
    /// Input image file
    input: PathBuf,
    /// Output image file (PNG)
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,
    /// Filter to apply
    #[arg(short, long, value_enum, default_value_t = FilterKind::Ordered)]
    filter: FilterKind,
    /// Ordered matrix size (power of two, e.g. 2 or 4)
    #[arg(long, default_value = "4")]
    matrix: u32,
    /// Error-diffusion kernel
    #[arg(long, value_enum, default_value_t = KernelKind::FloydSteinberg)]
    kernel: KernelKind,
    /// Tile set identifier for the mosaic filter (A/B/C, m/g/c)
    #[arg(long, default_value = "A")]
    set: String,
    /// Mosaic block size in pixels (recommended 5-50)
    #[arg(long, default_value = "20")]
    tile_size: u32,
    /// Invert the intensity-to-tile mapping
    #[arg(long)]
    invert: bool,
    /// Asset root containing the tile set directories
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// JSON manifest with extra tile sets
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterKind {
    Random,
    Ordered,
    Diffusion,
    Mosaic,
}

#[derive(Clone, Copy, ValueEnum)]
enum KernelKind {
    FloydSteinberg,
    FakeFloydSteinberg,
    JarvisJudiceNinke,
}

impl From<KernelKind> for Kernel {
    fn from(kind: KernelKind) -> Self {
        match kind {
            KernelKind::FloydSteinberg => Kernel::FloydSteinberg,
            KernelKind::FakeFloydSteinberg => Kernel::FakeFloydSteinberg,
            KernelKind::JarvisJudiceNinke => Kernel::JarvisJudiceNinke,
        }
    }
}

fn main() -> Result<(), SemitonosError> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let mut store = AtlasStore::builtin(&args.assets);
    if let Some(manifest) = &args.manifest {
        store.load_manifest(manifest)?;
    }
    let pipeline = Pipeline::new(store);

    let filter = match args.filter {
        FilterKind::Random => Filter::Random,
        FilterKind::Ordered => Filter::Ordered { matrix: args.matrix },
        FilterKind::Diffusion => Filter::Diffusion { kernel: args.kernel.into() },
        FilterKind::Mosaic => Filter::Mosaic {
            set: args.set.clone(),
            tile_size: args.tile_size,
            invert: args.invert,
        },
    };

    log::info!("decoding {}", args.input.display());
    // Flatten any alpha channel to opaque RGB before filtering.
    let input = image::open(&args.input)?.to_rgb8();
    log::info!("applying {filter:?} to {}x{}", input.width(), input.height());
    let output = pipeline.apply(&input, &filter)?;
    log::info!("writing {}", args.output.display());
    output.save(&args.output)?;
    Ok(())
}
