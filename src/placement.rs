use serde::Serialize;

use crate::settings::{AutoPosition, WatermarkSettings};

/// Inset used by every preset anchor, as a fraction of the canvas width.
pub const MARGIN_RATIO: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Where and how to draw the watermark text on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
    pub font_size: f32,
}

impl Placement {
    /// Top-left corner of a `width` x `height` text box anchored at `(x, y)`.
    pub fn text_origin(&self, width: f32, height: f32) -> (f32, f32) {
        let x = match self.h_align {
            HorizontalAlign::Left => self.x,
            HorizontalAlign::Center => self.x - width / 2.0,
            HorizontalAlign::Right => self.x - width,
        };
        let y = match self.v_align {
            VerticalAlign::Top => self.y,
            VerticalAlign::Middle => self.y - height / 2.0,
            VerticalAlign::Bottom => self.y - height,
        };
        (x, y)
    }
}

/// Compute the watermark placement for a canvas showing an image with the
/// given natural size. Returns `None` while the image has no pixels.
pub fn compute_placement(
    canvas: Dimensions,
    image: Dimensions,
    settings: &WatermarkSettings,
) -> Option<Placement> {
    if image.is_empty() {
        return None;
    }

    let cw = canvas.width as f32;
    let ch = canvas.height as f32;

    // Font size is relative to the natural resolution so the watermark keeps
    // its proportions at any preview scale
    let font_size = settings.font_size * (cw / image.width as f32);
    let margin = MARGIN_RATIO * cw;

    use HorizontalAlign::{Center as HCenter, Left, Right};
    use VerticalAlign::{Bottom, Middle, Top};

    let (x, y, h_align, v_align) = match settings.anchor {
        AutoPosition::TopLeft => (margin, margin, Left, Top),
        AutoPosition::TopCenter => (cw / 2.0, margin, HCenter, Top),
        AutoPosition::TopRight => (cw - margin, margin, Right, Top),
        AutoPosition::CenterLeft => (margin, ch / 2.0, Left, Middle),
        AutoPosition::Center => (cw / 2.0, ch / 2.0, HCenter, Middle),
        AutoPosition::CenterRight => (cw - margin, ch / 2.0, Right, Middle),
        AutoPosition::BottomLeft => (margin, ch - margin, Left, Bottom),
        AutoPosition::BottomCenter => (cw / 2.0, ch - margin, HCenter, Bottom),
        AutoPosition::BottomRight => (cw - margin, ch - margin, Right, Bottom),
        AutoPosition::Free => (
            settings.position.x,
            settings.position.y,
            HCenter,
            Middle,
        ),
    };

    Some(Placement {
        x,
        y,
        h_align,
        v_align,
        font_size,
    })
}
