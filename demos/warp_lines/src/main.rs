use argh::FromArgs;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use linemorph::{
    image::ImageSize,
    imgproc::{
        parallel::ExecutionStrategy,
        warp::{warp_correspondences, FieldWarpOptions, FieldWarpParams},
    },
    io::functional as F,
    lines::io::read_correspondences_txt,
};

#[derive(FromArgs)]
/// Warp an image onto the geometry given by pairs of feature lines
struct Args {
    /// path to the source image
    #[argh(option, short = 's')]
    source: PathBuf,

    /// path to the target image, only its size is used
    #[argh(option, short = 't')]
    target: Option<PathBuf>,

    /// width of the output when no target image is given
    #[argh(option)]
    width: Option<usize>,

    /// height of the output when no target image is given
    #[argh(option)]
    height: Option<usize>,

    /// path to the lines drawn on the source image
    #[argh(option, default = "PathBuf::from(\"source.edges\")")]
    source_lines: PathBuf,

    /// path to the lines drawn on the target image
    #[argh(option, default = "PathBuf::from(\"target.edges\")")]
    target_lines: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o', default = "PathBuf::from(\"morph.png\")")]
    output: PathBuf,

    /// number of worker threads, all cores when omitted
    #[argh(option)]
    threads: Option<usize>,

    /// sampling margin in pixels kept away from the source border
    #[argh(option, default = "2")]
    margin: usize,
}

/// The output size given on the command line, both dimensions or none.
fn requested_size(
    width: Option<usize>,
    height: Option<usize>,
) -> Result<Option<ImageSize>, Box<dyn std::error::Error>> {
    match (width, height) {
        (Some(width), Some(height)) => Ok(Some(ImageSize { width, height })),
        (None, None) => Ok(None),
        _ => Err("--width and --height must be given together".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    let correspondences = read_correspondences_txt(&args.source_lines, &args.target_lines)?;
    log::info!("loaded {} feature line pairs", correspondences.len());

    let src = F::read_image_rgb8(&args.source)?;

    let cli_size = requested_size(args.width, args.height)?;
    let dst_size = match (&args.target, cli_size) {
        (Some(target), _) => F::read_image_rgb8(target)?.size(),
        (None, Some(size)) => size,
        (None, None) => src.size(),
    };

    // allow the user to stop a long warp with ctrl-c
    let cancel_token = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            println!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    let strategy = match args.threads {
        Some(1) => ExecutionStrategy::Serial,
        Some(n) => ExecutionStrategy::Fixed(n),
        None => ExecutionStrategy::ParallelRows,
    };

    let params = FieldWarpParams {
        margin: args.margin,
        ..Default::default()
    };
    let options = FieldWarpOptions::default()
        .with_strategy(strategy)
        .with_cancel_token(cancel_token);

    let result = warp_correspondences(&src, dst_size, &correspondences, &params, &options)?;

    F::write_image_rgb8(&args.output, &result.image)?;

    let stats = &result.stats;
    println!("Wrote {} image to {}", result.image.size(), args.output.display());
    println!("  degenerate pairs: {:?}", stats.degenerate_pairs);
    println!("  identity fallbacks: {}", stats.identity_fallback_pixels());
    println!("  clamped pixels: {}", stats.clamped_pixels);

    Ok(())
}
