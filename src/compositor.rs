use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{RgbaImage, imageops, imageops::FilterType};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::placement::{Dimensions, Placement, compute_placement};
use crate::registry::ImageEntry;
use crate::settings::WatermarkSettings;

pub const DEFAULT_FONT_PATH: &str = "static/DejaVuSans-Bold.ttf";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse font: {0}")]
    InvalidFont(String),
}

/// The raster the watermarked preview is drawn into.
///
/// The container is the space the host makes available; the raster itself
/// is sized by the compositor to fit inside it.
#[derive(Debug, Clone)]
pub struct Surface {
    container: Dimensions,
    raster: Option<RgbaImage>,
}

impl Surface {
    pub fn new(container: Dimensions) -> Self {
        Self {
            container,
            raster: None,
        }
    }

    pub fn container(&self) -> Dimensions {
        self.container
    }

    pub fn set_container(&mut self, container: Dimensions) {
        self.container = container;
    }

    pub fn raster(&self) -> Option<&RgbaImage> {
        self.raster.as_ref()
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.raster
            .as_ref()
            .map(|raster| Dimensions::new(raster.width(), raster.height()))
    }

    pub fn is_drawn(&self) -> bool {
        self.raster.is_some()
    }

    pub fn clear(&mut self) {
        self.raster = None;
    }
}

/// Largest size with the image's aspect ratio that fits in the container.
pub fn fit_to_container(image: Dimensions, container: Dimensions) -> Option<Dimensions> {
    if image.is_empty() || container.is_empty() {
        return None;
    }

    let image_ratio = image.aspect_ratio();
    let (width, height) = if image_ratio > container.aspect_ratio() {
        let width = container.width as f32;
        (width, width / image_ratio)
    } else {
        let height = container.height as f32;
        (height * image_ratio, height)
    };

    Some(Dimensions::new(
        (width.round() as u32).max(1),
        (height.round() as u32).max(1),
    ))
}

/// Draws an image and its text watermark into a [`Surface`].
#[derive(Clone, Default)]
pub struct Compositor {
    font: Option<FontArc>,
}

impl Compositor {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    /// Load the watermark font from a TrueType/OpenType file.
    pub fn load(font_path: &Path) -> Result<Self, RenderError> {
        let font_data = std::fs::read(font_path)?;
        let font = FontArc::try_from_vec(font_data)
            .map_err(|e| RenderError::InvalidFont(e.to_string()))?;
        debug!("Loaded watermark font from {:?}", font_path);
        Ok(Self::new(Some(font)))
    }

    /// Like [`Compositor::load`], but falls back to drawing images without
    /// text when the font is missing or unreadable.
    pub fn load_or_fallback(font_path: &Path) -> Self {
        match Self::load(font_path) {
            Ok(compositor) => compositor,
            Err(e) => {
                warn!(
                    "Watermark font unavailable at {:?} ({}), text will not be drawn",
                    font_path, e
                );
                Self::new(None)
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Redraw `surface` with `entry` fitted to the container and the
    /// watermark on top. Returns the placement that was used.
    ///
    /// Leaves the surface undrawn when the entry has no decoded pixels or
    /// the container has no area.
    pub fn render(
        &self,
        surface: &mut Surface,
        entry: &ImageEntry,
        settings: &WatermarkSettings,
    ) -> Option<Placement> {
        let (Some(image), Some(natural)) = (entry.image(), entry.dimensions()) else {
            debug!("Image {} is not decoded, nothing to draw", entry.name());
            surface.clear();
            return None;
        };

        let Some(fitted) = fit_to_container(natural, surface.container()) else {
            debug!("Container has no area, nothing to draw");
            surface.clear();
            return None;
        };

        let mut canvas = if fitted == natural {
            image.to_rgba8()
        } else {
            imageops::resize(
                &image.to_rgba8(),
                fitted.width,
                fitted.height,
                FilterType::Lanczos3,
            )
        };

        let placement = compute_placement(fitted, natural, settings)?;
        self.draw_text(&mut canvas, settings, &placement);

        surface.raster = Some(canvas);
        Some(placement)
    }

    fn draw_text(&self, canvas: &mut RgbaImage, settings: &WatermarkSettings, placement: &Placement) {
        let Some(font) = &self.font else {
            debug!("No font loaded, skipping watermark text");
            return;
        };
        if settings.text.is_empty() || settings.opacity <= 0.0 {
            return;
        }

        let scale = PxScale::from(placement.font_size);
        let (text_width, _) = text_size(scale, font, &settings.text);
        let (x, y) = placement.text_origin(text_width as f32, line_height(font, scale));

        // Text goes onto a transparent layer in the final color so that glyph
        // coverage ends up in the alpha channel only
        let mut layer = RgbaImage::from_pixel(
            canvas.width(),
            canvas.height(),
            settings.color.with_alpha(0),
        );
        draw_text_mut(
            &mut layer,
            settings.color.with_alpha(255),
            x.round() as i32,
            y.round() as i32,
            scale,
            font,
            &settings.text,
        );

        if settings.opacity < 1.0 {
            for pixel in layer.pixels_mut() {
                pixel[3] = (pixel[3] as f32 * settings.opacity).round() as u8;
            }
        }

        imageops::overlay(canvas, &layer, 0, 0);
    }
}

/// Height of the line box from the descent line to the ascent line.
/// `draw_text_mut` puts the ascent line at the `y` it is given, so the top
/// of this box is the draw origin.
fn line_height(font: &FontArc, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    scaled.ascent() - scaled.descent()
}
