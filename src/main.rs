//! Command-line front-end: drives one `ThumbnailView` for a single request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};

use vthumb::{logging, Config, FfmpegSource, FitMode, ThumbnailGenerator, ThumbnailView};

#[derive(Debug, Parser)]
#[command(name = "vthumb", version, about = "Extract a thumbnail from a video at a given time")]
struct Args {
    /// Video file path or URL
    source: String,

    /// Seek time in seconds
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Thumbnail width in pixels (defaults to the configured width)
    #[arg(long)]
    width: Option<f32>,

    /// Thumbnail height in pixels (defaults to the configured height)
    #[arg(long)]
    height: Option<f32>,

    /// fill (crop to aspect) or stretch
    #[arg(long)]
    fit: Option<FitMode>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the raw RGBA8 pixels here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    logging::init(&config.log_level);

    let source = FfmpegSource::new()?;
    let generator = ThumbnailGenerator::new(Arc::new(source), &config.generator)
        .context("failed to start thumbnail workers")?;

    let mut view = ThumbnailView::with_config(Arc::new(generator), &config.view);
    view.set_video_source(args.source.as_str());
    if let Some(width) = args.width {
        view.set_thumbnail_width(width);
    }
    if let Some(height) = args.height {
        view.set_thumbnail_height(height);
    }
    if let Some(fit) = args.fit {
        view.set_fit(fit);
    }
    view.set_on_thumbnail_ready(|event| match &event.result {
        Ok(image) => info!(
            id = %event.request_id,
            width = image.width(),
            height = image.height(),
            at = %image.label(),
            "thumbnail ready"
        ),
        Err(e) => error!(id = %event.request_id, error = %e, "thumbnail failed"),
    });

    view.generate_thumbnail(args.at);

    let Some(event) = view.wait(Duration::from_secs(args.timeout)) else {
        bail!("timed out after {}s waiting for {}", args.timeout, args.source);
    };

    match event.result {
        Ok(image) => {
            if let Some(path) = &args.output {
                std::fs::write(path, image.data())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), bytes = image.len(), "wrote RGBA8 pixels");
            }
            Ok(())
        }
        Err(_) => {
            // Already logged by the callback
            drop(view);
            std::process::exit(1);
        }
    }
}
