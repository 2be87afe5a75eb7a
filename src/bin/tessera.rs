// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! tessera CLI - encrypt images into block rasters and back.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tessera_core::codec::config::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_DIMENSION};
use tessera_core::raster::io::{recompress_jpeg, RasterIo};
use tessera_core::{CodecConfig, DecodeReport, ErasureCoding, ImageFileIo, Pipeline, Stage};

/// Encrypt an image into a raster of colored blocks and recover it
#[derive(Parser)]
#[command(name = "tessera")]
#[command(version)]
#[command(about = "Block-raster visual codec for encrypted images", long_about = None)]
#[command(after_help = "EXAMPLES:
    tessera encode -i photo.jpg -o raster.jpg -p secret
    tessera decode -i raster.jpg -o photo-out.jpg -p secret
    tessera selftest -i photo.jpg -p secret --ecc --recompress 90")]
struct Cli {
    /// Print pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CodecArgs {
    /// Password for encryption and decryption
    #[arg(short, long)]
    password: String,

    /// Block edge in pixels (must match between encode and decode)
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    /// Protect the payload with RS(255, 239) erasure coding
    #[arg(long)]
    ecc: bool,
}

#[derive(Args)]
struct FitArgs {
    /// Downscale the cleartext image by this factor, in (0, 1]
    #[arg(short, long, default_value_t = 1.0)]
    scale: f32,

    /// JPEG quality of the cleartext image before encryption
    #[arg(short, long, default_value_t = 95)]
    quality: u8,

    /// Maximum raster width/height in pixels
    #[arg(short, long, default_value_t = DEFAULT_MAX_DIMENSION)]
    max_dimension: u32,

    /// JPEG quality of a saved .jpg raster
    #[arg(long, default_value_t = 100)]
    raster_quality: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt an image and write it as a block raster
    #[command(visible_alias = "e")]
    Encode {
        /// Cleartext image
        #[arg(short, long)]
        input: PathBuf,

        /// Raster output (.png is lossless, .jpg uses --raster-quality)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,

        #[command(flatten)]
        fit: FitArgs,
    },

    /// Read a block raster and write the decrypted image
    #[command(visible_alias = "d")]
    Decode {
        /// Raster image
        #[arg(short, long)]
        input: PathBuf,

        /// Decrypted output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,

        /// Fail on sentinel blocks inside the payload
        #[arg(long)]
        strict: bool,
    },

    /// Encode and decode in-process and report digit mismatches
    #[command(visible_alias = "t")]
    Selftest {
        /// Cleartext image
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,

        #[command(flatten)]
        fit: FitArgs,

        /// Recompress the raster as JPEG at this quality before decoding
        #[arg(short, long)]
        recompress: Option<u8>,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { input, output, codec, fit } => {
            encode(&input, &output, &codec, &fit, cli.verbose)
        }
        Commands::Decode { input, output, codec, strict } => {
            decode(&input, &output, &codec, strict, cli.verbose)
        }
        Commands::Selftest { input, codec, fit, recompress } => {
            selftest(&input, &codec, &fit, recompress, cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn config_from(codec: &CodecArgs) -> CodecConfig {
    let erasure = if codec.ecc { ErasureCoding::Enabled } else { ErasureCoding::Disabled };
    CodecConfig::new(codec.password.clone())
        .with_block_size(codec.block_size)
        .with_erasure_coding(erasure)
}

fn apply_fit(config: CodecConfig, fit: &FitArgs) -> CodecConfig {
    config
        .with_rescale_factor(fit.scale)
        .with_cleartext_quality(fit.quality)
        .with_max_dimension(fit.max_dimension)
        .with_encoded_image_quality(fit.raster_quality)
}

fn pipeline(config: CodecConfig, verbose: bool) -> Result<Pipeline, tessera_core::Error> {
    let p = Pipeline::new(config)?;
    if verbose {
        p.progress().set_observer(Some(Box::new(|stage: Stage, step: u32, total: u32| {
            eprintln!("[{step}/{total}] {stage}");
        })));
    }
    Ok(p)
}

fn encode(input: &Path, output: &Path, codec: &CodecArgs, fit: &FitArgs, verbose: bool) -> CliResult {
    let image = ImageFileIo.open(input)?;
    let mut p = pipeline(apply_fit(config_from(codec), fit), verbose)?;

    let result = p.encode_image(&image)?;
    if verbose {
        for attempt in &result.attempts {
            eprintln!(
                "fit {:?}: cleartext {}x{} ({} bytes) -> raster {}x{}",
                attempt.strategy,
                attempt.image_width,
                attempt.image_height,
                attempt.cleartext_len,
                attempt.raster_width,
                attempt.raster_height,
            );
        }
    }
    p.save_raster(&ImageFileIo, &result.encoded.raster, output)?;

    let layout = result.encoded.layout;
    println!(
        "Encoded {} digits into {}x{} raster ({} pairs per row, {} rows) at {:?}",
        layout.digits(),
        layout.pixel_width(),
        layout.pixel_height(),
        layout.pairs_per_row(),
        layout.rows(),
        output
    );
    Ok(())
}

fn decode(input: &Path, output: &Path, codec: &CodecArgs, strict: bool, verbose: bool) -> CliResult {
    let config = config_from(codec).with_strict_classification(strict);
    let mut p = pipeline(config, verbose)?;

    let raster = p.open_raster(&ImageFileIo, input)?;
    let decoded = p.decode(&raster, None)?;
    fs::write(output, &decoded.payload)?;

    println!("Decoded {} bytes to {:?}", decoded.payload.len(), output);
    print_report(&decoded.report);
    Ok(())
}

fn selftest(
    input: &Path,
    codec: &CodecArgs,
    fit: &FitArgs,
    recompress: Option<u8>,
    verbose: bool,
) -> CliResult {
    let image = ImageFileIo.open(input)?;
    let mut p = pipeline(apply_fit(config_from(codec), fit), verbose)?;

    let fitted = p.encode_image(&image)?;
    let encoded = fitted.encoded;
    let raster = match recompress {
        Some(quality) => recompress_jpeg(&encoded.raster, quality)?,
        None => encoded.raster.clone(),
    };
    let decoded = p.decode(&raster, Some(&encoded.digits))?;

    println!(
        "Raster {}x{}, {} digits, cleartext reference width {}",
        encoded.layout.pixel_width(),
        encoded.layout.pixel_height(),
        encoded.digits.len(),
        fitted.reference_width,
    );
    print_report(&decoded.report);
    if decoded.payload != fitted.cleartext {
        return Err(format!(
            "recovered {} bytes that differ from the {} encoded bytes",
            decoded.payload.len(),
            fitted.cleartext.len()
        )
        .into());
    }
    println!("Payload recovered: {} bytes", decoded.payload.len());
    Ok(())
}

fn print_report(report: &DecodeReport) {
    println!("  digits read:      {}", report.digits_read);
    println!("  pairs scanned:    {}", report.pairs_scanned);
    println!("  ambiguous pairs:  {}", report.ambiguous_pairs.len());
    if let Some(mismatches) = report.mismatches {
        println!("  digit mismatches: {}", mismatches);
    }
    if let Some(stats) = &report.erasure {
        println!(
            "  rs corrected:     {} / {} (max {} in one chunk)",
            stats.corrected_symbols, stats.capacity, stats.max_chunk_errors
        );
    }
    println!("  integrity:        {}%", report.integrity_percent());
}
