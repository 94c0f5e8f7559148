use bmpfit::config::{self, BmpfitConfig};
use bmpfit::imaging::{
    self, BoundsPolicy, ImageBackend, NormalizeConfig, ResampleFilter, RustBackend, bmp,
};
use bmpfit::stego::{self, Retouch};
use bmpfit::{interactive, output};
use clap::{Parser, Subcommand};
use image::ImageFormat;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Geometry flags shared by commands that normalize images. Each one
/// overrides the matching config file value.
#[derive(clap::Args, Clone)]
struct GeometryArgs {
    /// Output width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Bounding box used before the center crop
    #[arg(long, value_enum)]
    bounds: Option<BoundsPolicy>,

    /// Resampling kernel used when shrinking
    #[arg(long, value_enum)]
    filter: Option<ResampleFilter>,

    /// Rewrite the source without EXIF, ICC or text metadata first
    #[arg(long)]
    strip_metadata: bool,
}

impl GeometryArgs {
    fn apply(&self, mut config: BmpfitConfig) -> Result<NormalizeConfig, config::ConfigError> {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(bounds) = self.bounds {
            config.bounds = bounds;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        config.strip_metadata |= self.strip_metadata;
        config.normalize_config()
    }
}

#[derive(Parser)]
#[command(name = "bmpfit")]
#[command(about = "Shrink and center-crop images into fixed-size 24-bit BMP files")]
#[command(long_about = "\
Shrink and center-crop images into fixed-size 24-bit BMP files

Every output is exactly WIDTHxHEIGHT (900x900 unless configured). The source
is shrunk to fit a bounding box without ever being enlarged, then a centered
window of the target size is cut out. Where the window extends past the image
it is padded with the fill colour. The BMP is written next to the source:

  photos/goat.jpg      →  photos/goat.bmp
  scans/archive.tar.png →  scans/archive.tar.bmp

Settings are read from bmpfit.toml in the working directory when present.
Run 'bmpfit gen-config' to generate a documented bmpfit.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./bmpfit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize one image into a sibling BMP
    Normalize {
        /// Image to normalize
        path: PathBuf,
        #[command(flatten)]
        geometry: GeometryArgs,
    },
    /// Prompt for images to normalize until told to stop
    Interactive {
        #[command(flatten)]
        geometry: GeometryArgs,
    },
    /// Print format, size and pixel layout; BMPs also get a header dump
    Inspect {
        /// Image file
        path: PathBuf,
    },
    /// Reveal an image hidden in the low nibbles of a 24-bit BMP
    Reveal {
        /// BMP file
        path: PathBuf,
        /// Write here instead of replacing the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Hide one 24-bit BMP inside another of the same size
    Hide {
        /// Carrier BMP whose high nibbles stay visible
        target: PathBuf,
        /// BMP to hide
        hidden: PathBuf,
        /// Write here instead of replacing the carrier
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Invert, grayscale or mirror a 24-bit BMP
    Retouch {
        /// Operation to apply
        #[arg(value_enum)]
        op: Retouch,
        /// BMP file
        path: PathBuf,
        /// Write here instead of replacing the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock bmpfit.toml with all options documented
    GenConfig,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        output::print_error(e.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Normalize { path, geometry } => {
            let config = geometry.apply(load_config(cli.config.as_deref())?)?;
            let report = imaging::normalize(&RustBackend::new(), &path, &config)?;
            output::print_normalize_report(&report);
        }
        Command::Interactive { geometry } => {
            let config = geometry.apply(load_config(cli.config.as_deref())?)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            interactive::run_session(
                &mut stdin.lock(),
                &mut stdout.lock(),
                &RustBackend::new(),
                &config,
            )?;
        }
        Command::Inspect { path } => {
            let info = RustBackend::new().identify(&path)?;
            output::print_lines(&output::format_image_info(&path, &info));
            if info.format == ImageFormat::Bmp {
                output::print_bmp_header(&bmp::read_header(&path)?);
            }
        }
        Command::Reveal {
            path,
            output: destination,
        } => {
            let destination = destination.unwrap_or_else(|| path.clone());
            stego::reveal(&path, &destination)?;
            output::print_lines(&output::format_reveal_result(&path, &destination));
        }
        Command::Hide {
            target,
            hidden,
            output: destination,
        } => {
            let destination = destination.unwrap_or_else(|| target.clone());
            stego::hide(&target, &hidden, &destination)?;
            output::print_lines(&output::format_hide_result(&target, &hidden, &destination));
        }
        Command::Retouch {
            op,
            path,
            output: destination,
        } => {
            let destination = destination.unwrap_or_else(|| path.clone());
            stego::retouch(op, &path, &destination)?;
            output::print_lines(&output::format_retouch_result(op, &path, &destination));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<BmpfitConfig, config::ConfigError> {
    config::discover_config(explicit, Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_command_reports_display_chain() {
        let cli = Cli::try_parse_from(["bmpfit", "inspect", "/nonexistent/bmpfit/a.jpg"]).unwrap();
        let err = run(cli).unwrap_err();
        let lines = output::format_error(err.as_ref());
        assert_eq!(lines[0], "Error: Filesystem error on /nonexistent/bmpfit/a.jpg");
        assert!(lines[1].starts_with("    Caused by: "));
    }

    #[test]
    fn retouch_op_parses() {
        let cli = Cli::try_parse_from(["bmpfit", "retouch", "hflip", "a.bmp"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Retouch {
                op: Retouch::Hflip,
                output: None,
                ..
            }
        ));
    }
}
