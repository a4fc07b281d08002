use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use laser_gcode::{
    ConvertOptions, CurveSource, LaserSettings, Point, RasterOptions, RasterSource, SvgSource,
    ThresholdMethod, VectorOptions, convert,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "laser-gcode",
    version,
    about = "Convert images and SVG files to G-code for laser engraving"
)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace the outlines of a PNG/JPEG image
    Image {
        #[command(flatten)]
        common: CommonArgs,

        /// Threshold level (0-255), 'otsu', or 'adaptive' (default)
        #[arg(long)]
        threshold: Option<ThresholdMethod>,
    },
    /// Trace the paths of an SVG document
    Svg {
        #[command(flatten)]
        common: CommonArgs,

        /// Largest gap between a curve and the lines replacing it, in the
        /// document's user units
        #[arg(long, default_value_t = 0.1)]
        curve_resolution: f64,

        /// Do not load system fonts; `<text>` elements are then skipped
        #[arg(long)]
        no_system_fonts: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// The input file to convert
    input: PathBuf,

    /// Where to save the generated G-code
    output: PathBuf,

    /// The power setting for the laser engraver
    #[arg(long, default_value_t = 1000)]
    power: u32,

    /// The feed rate for engraving
    #[arg(long, alias = "feed_rate", default_value_t = 1000)]
    feed_rate: u32,

    /// Length of the longest side of the engraving in millimeters
    #[arg(long, alias = "longest_side")]
    longest_side: Option<f64>,

    /// Machine position (X Y) in millimeters for the center of the engraving
    #[arg(
        long,
        alias = "center_offset",
        num_args = 2,
        value_names = ["X", "Y"],
        allow_negative_numbers = true
    )]
    center_offset: Option<Vec<f64>>,
}

impl CommonArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            laser: LaserSettings {
                power: self.power,
                feed_rate: self.feed_rate,
            },
            longest_side: self.longest_side,
            placement: self
                .center_offset
                .as_deref()
                .and_then(|xy| match xy {
                    [x, y] => Some(Point::new(*x, *y)),
                    _ => None,
                }),
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (source, common): (Box<dyn CurveSource>, &CommonArgs) = match &cli.command {
        Command::Image { common, threshold } => {
            let options = RasterOptions {
                threshold: threshold.unwrap_or_default(),
                ..Default::default()
            };
            let source =
                Box::new(RasterSource::new(&common.input, options)) as Box<dyn CurveSource>;
            (source, common)
        }
        Command::Svg {
            common,
            curve_resolution,
            no_system_fonts,
        } => {
            let options = VectorOptions {
                curve_resolution: *curve_resolution,
                system_fonts: !no_system_fonts,
            };
            let source = Box::new(SvgSource::new(&common.input, options)) as Box<dyn CurveSource>;
            (source, common)
        }
    };

    convert(source.as_ref(), &common.options(), &common.output)?;
    println!("G-code generated and saved to {}", common.output.display());
    Ok(())
}
