//! PNG collaborator: 8-bit rasters in, RGB8 rasters out.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use zentrs::PixelLayout;

use crate::CliError;

pub struct Raster {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

/// Load a PNG, expanding palettes and low bit depths and stripping 16-bit
/// samples to 8 bits. The channel count is left as stored.
pub fn load_png(path: &Path) -> Result<Raster, CliError> {
    let file = File::open(path).map_err(|e| CliError::Open(path.to_path_buf(), e))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| CliError::PngDecode(path.to_path_buf(), e))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| CliError::PngDecode(path.to_path_buf(), e))?;
    buf.truncate(frame.buffer_size());

    let layout = match frame.color_type {
        png::ColorType::Grayscale => PixelLayout::Gray8,
        png::ColorType::GrayscaleAlpha => PixelLayout::GrayAlpha8,
        png::ColorType::Rgba => PixelLayout::Rgba8,
        // Indexed is expanded to Rgb by the transformations above
        png::ColorType::Rgb | png::ColorType::Indexed => PixelLayout::Rgb8,
    };

    Ok(Raster {
        pixels: buf,
        width: frame.width,
        height: frame.height,
        layout,
    })
}

/// Write an RGB8 raster as PNG.
pub fn save_png_rgb(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<(), CliError> {
    let file = File::create(path).map_err(|e| CliError::Create(path.to_path_buf(), e))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| CliError::PngEncode(path.to_path_buf(), e))?;
    writer
        .write_image_data(pixels)
        .map_err(|e| CliError::PngEncode(path.to_path_buf(), e))?;
    writer
        .finish()
        .map_err(|e| CliError::PngEncode(path.to_path_buf(), e))?;
    Ok(())
}
