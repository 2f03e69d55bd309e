//! trs-tools: create TRS containers from PNG images and extract them again.

mod args;
mod png_io;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use args::{Args, Command};
use clap::Parser;
use log::{error, info};
use zentrs::{DecodeRequest, EncodeRequest, TrsError, Unstoppable};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unable to open '{path}': {err}", path = .0.display(), err = .1)]
    Open(PathBuf, #[source] std::io::Error),

    #[error("unable to create '{path}': {err}", path = .0.display(), err = .1)]
    Create(PathBuf, #[source] std::io::Error),

    #[error("failed to load '{path}': {err}", path = .0.display(), err = .1)]
    PngDecode(PathBuf, #[source] png::DecodingError),

    #[error("failed to write '{path}': {err}", path = .0.display(), err = .1)]
    PngEncode(PathBuf, #[source] png::EncodingError),

    #[error("'{path}': {err}", path = .0.display(), err = .1)]
    Trs(PathBuf, #[source] TrsError),
}

fn create(trs: &Path, images: &[PathBuf]) -> Result<(), CliError> {
    let rasters = images
        .iter()
        .map(|path| png_io::load_png(path))
        .collect::<Result<Vec<_>, _>>()?;

    let request = rasters.iter().fold(EncodeRequest::new(), |req, r| {
        req.add_image(&r.pixels, r.width, r.height, r.layout)
    });
    let count = request.image_count();
    let bytes = request.encode(Unstoppable).map_err(|e| {
        // name the offending input when the error points at one
        let path = match &e {
            TrsError::ChannelMismatch { index, .. }
            | TrsError::InvalidDimensions { index, .. }
            | TrsError::OffsetOverflow { index, .. }
            | TrsError::BufferTooSmall { index, .. } => images[*index].clone(),
            _ => trs.to_path_buf(),
        };
        CliError::Trs(path, e)
    })?;

    zentrs::fs::write_container_atomic(trs, &bytes)
        .map_err(|e| CliError::Trs(trs.to_path_buf(), e))?;
    info!(
        "created '{}' with {} images ({} bytes)",
        trs.display(),
        count,
        bytes.len()
    );
    Ok(())
}

fn extract(trs: &Path, output: &Path) -> Result<(), CliError> {
    let data =
        zentrs::fs::read_container(trs).map_err(|e| CliError::Trs(trs.to_path_buf(), e))?;
    let images = DecodeRequest::new(&data)
        .decode(Unstoppable)
        .map_err(|e| CliError::Trs(trs.to_path_buf(), e))?;

    for image in &images {
        let path = output.join(format!("{:04}.png", image.index));
        png_io::save_png_rgb(&path, image.pixels(), image.width, image.height)?;
        info!(
            "extracted image #{} ({}x{}) to '{}'",
            image.index,
            image.width,
            image.height,
            path.display()
        );
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), CliError> {
    match &args.command {
        Command::Create { trs, images } => create(trs, images),
        Command::Extract { trs, output } => extract(trs, output),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = simple_logger::init_with_level(args.log_level()) {
        eprintln!("failed to initialize logger: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
