// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{value_t, App, Arg, ArgMatches};
use image::{DynamicImage, ImageBuffer, ImageFormat, Pixel};
use liquidseam::{
    resize, BiasField, CancellationToken, Channel, Context, DenseBias, EnergyFunction,
    EnergyReader, EnergyUpdate, Outcome, PixelBuffer, ResizeConfiguration, ResizeOrder, Rgba,
};
use log::info;
use std::error::Error;
use std::path::Path;
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

// The conventional status of a process stopped by SIGINT.
const CANCELLED: i32 = 130;

fn main() {
    env_logger::init();

    let matches = App::new("liquidseam")
        .version("0.1.0")
        .about("Content-aware image resizing by seam carving")
        .arg(Arg::with_name("input").help("The image to resize").required(true).index(1))
        .arg(Arg::with_name("output").help("Where to write the result").required(true).index(2))
        .arg(
            Arg::with_name("width")
                .long("width")
                .value_name("W")
                .help("Target width in pixels")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .value_name("H")
                .help("Target height in pixels")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("step")
                .long("step")
                .value_name("N")
                .help("Furthest a seam may move sideways per row [default: 1]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("rigidity")
                .long("rigidity")
                .value_name("R")
                .help("Penalty on sideways seam moves [default: 0]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("side-switch")
                .long("side-switch")
                .value_name("N")
                .help("Seams carved on one axis before switching [default: 4]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("energy")
                .long("energy")
                .help("Gradient function [default: xabs]")
                .takes_value(true)
                .possible_values(&["norm", "sumabs", "xabs"]),
        )
        .arg(
            Arg::with_name("reader")
                .long("reader")
                .help("What the gradient is taken of [default: rgb]")
                .takes_value(true)
                .possible_values(&["rgb", "brightness", "luma"]),
        )
        .arg(
            Arg::with_name("order")
                .long("order")
                .help("Which dimension to resize first [default: horizontal]")
                .takes_value(true)
                .possible_values(&["horizontal", "vertical"]),
        )
        .arg(
            Arg::with_name("enlargement-step")
                .long("enlargement-step")
                .value_name("F")
                .help("Largest growth factor of one enlargement pass [default: 1.5]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mask")
                .long("mask")
                .value_name("MASK")
                .help("Weight mask: green protects, red removes")
                .takes_value(true),
        )
        .arg(Arg::with_name("skin-tones").long("skin-tones").help("Protect skin tones"))
        .arg(
            Arg::with_name("incremental")
                .long("incremental")
                .help("Patch the energy map along each seam instead of recomputing it"),
        )
        .arg(
            Arg::with_name("sixteen-bit")
                .long("sixteen-bit")
                .help("Carve with 16 bits per channel"),
        )
        .get_matches();

    match run(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(CANCELLED),
        Err(err) => {
            eprintln!("liquidseam: {}", err);
            process::exit(1);
        }
    }
}

fn number<T: FromStr>(matches: &ArgMatches, name: &str, default: T) -> T {
    if matches.is_present(name) {
        value_t!(matches, name, T).unwrap_or_else(|e| e.exit())
    } else {
        default
    }
}

fn configuration(matches: &ArgMatches) -> ResizeConfiguration {
    let defaults = ResizeConfiguration::default();
    ResizeConfiguration {
        step: number(matches, "step", defaults.step),
        rigidity: number(matches, "rigidity", defaults.rigidity),
        side_switch_frequency: number(matches, "side-switch", defaults.side_switch_frequency),
        energy_function: match matches.value_of("energy") {
            Some("norm") => EnergyFunction::GradientNorm,
            Some("sumabs") => EnergyFunction::SumAbsolute,
            _ => EnergyFunction::Absolute,
        },
        reader: match matches.value_of("reader") {
            Some("brightness") => EnergyReader::Brightness,
            Some("luma") => EnergyReader::Luma,
            _ => EnergyReader::Rgb,
        },
        resize_order: match matches.value_of("order") {
            Some("vertical") => ResizeOrder::VerticalFirst,
            _ => ResizeOrder::HorizontalFirst,
        },
        preserve_skin_tones: matches.is_present("skin-tones"),
        enlargement_step: number(matches, "enlargement-step", defaults.enlargement_step),
        energy_update: if matches.is_present("incremental") {
            EnergyUpdate::Incremental
        } else {
            EnergyUpdate::Full
        },
    }
}

// Ok(false) when the resize was cancelled and nothing was written.
fn run(matches: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let input = matches.value_of("input").unwrap_or_default();
    let output = Path::new(matches.value_of("output").unwrap_or_default());
    let width = value_t!(matches, "width", u32).unwrap_or_else(|e| e.exit());
    let height = value_t!(matches, "height", u32).unwrap_or_else(|e| e.exit());
    let config = configuration(matches);

    let token = CancellationToken::new();
    ctrlc::set_handler({
        let token = token.clone();
        move || {
            info!("interrupted, cancelling the resize");
            token.cancel();
        }
    })?;

    let reported = AtomicU8::new(0);
    let context = Context::new().with_cancellation(token).with_progress(|p| {
        if reported.swap(p.percent, Ordering::Relaxed) != p.percent {
            info!(
                "{:>3}% ({:?}: {} of {} seams)",
                p.percent, p.axis, p.seams_done, p.seams_total
            );
        }
    });

    let image = image::open(input)?;
    let mask = match matches.value_of("mask") {
        Some(path) => Some(DenseBias::from_mask(&PixelBuffer::from(
            image::open(path)?.to_rgba8(),
        ))),
        None => None,
    };
    let bias = mask.as_ref().map(|m| m as &dyn BiasField);
    info!(
        "resizing {} from {}x{} to {}x{}",
        input,
        image.width(),
        image.height(),
        width,
        height
    );

    if matches.is_present("sixteen-bit") {
        let source = PixelBuffer::from(image.to_rgba16());
        write(resize(&source, width, height, &config, bias, &context)?, output)
    } else {
        let source = PixelBuffer::from(image.to_rgba8());
        write(resize(&source, width, height, &config, bias, &context)?, output)
    }
}

fn write<S>(outcome: Outcome<S>, output: &Path) -> Result<bool, Box<dyn Error>>
where
    S: Channel,
    Rgba<S>: Pixel<Subpixel = S>,
    DynamicImage: From<ImageBuffer<Rgba<S>, Vec<S>>>,
{
    match outcome {
        Outcome::Cancelled(_) => {
            info!("cancelled; {} was not written", output.display());
            Ok(false)
        }
        Outcome::Complete(buffer) => {
            let image = DynamicImage::from(buffer.to_image());
            // JPEG has no alpha channel.
            match ImageFormat::from_path(output) {
                Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(image.to_rgb8()).save(output)?,
                _ => image.save(output)?,
            }
            Ok(true)
        }
    }
}
