// Shared fixtures for unit tests
use ab_glyph::FontArc;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;

use crate::compositor::DEFAULT_FONT_PATH;

/// The first usable DejaVu Sans found on this machine, bold preferred.
pub fn test_font() -> Option<FontArc> {
    let candidates = [
        DEFAULT_FONT_PATH,
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "static/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ];
    candidates
        .iter()
        .filter_map(|path| std::fs::read(path).ok())
        .find_map(|data| FontArc::try_from_vec(data).ok())
}

/// A solid-color PNG, encoded.
pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb(color));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
