use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const FONT_SIZE_MIN: f32 = 10.0;
pub const FONT_SIZE_MAX: f32 = 200.0;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown anchor: {0}")]
    UnknownAnchor(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

/// Where the watermark is placed: one of the nine presets, or `Free` to use
/// the explicit position from the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Free,
}

impl AutoPosition {
    /// The nine presets in grid order, row by row.
    pub const PRESETS: [AutoPosition; 9] = [
        AutoPosition::TopLeft,
        AutoPosition::TopCenter,
        AutoPosition::TopRight,
        AutoPosition::CenterLeft,
        AutoPosition::Center,
        AutoPosition::CenterRight,
        AutoPosition::BottomLeft,
        AutoPosition::BottomCenter,
        AutoPosition::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoPosition::TopLeft => "top-left",
            AutoPosition::TopCenter => "top-center",
            AutoPosition::TopRight => "top-right",
            AutoPosition::CenterLeft => "center-left",
            AutoPosition::Center => "center",
            AutoPosition::CenterRight => "center-right",
            AutoPosition::BottomLeft => "bottom-left",
            AutoPosition::BottomCenter => "bottom-center",
            AutoPosition::BottomRight => "bottom-right",
            AutoPosition::Free => "free",
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, AutoPosition::Free)
    }
}

impl fmt::Display for AutoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoPosition {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        if normalized == "manual" {
            return Ok(AutoPosition::Free);
        }
        AutoPosition::PRESETS
            .iter()
            .chain(std::iter::once(&AutoPosition::Free))
            .find(|anchor| anchor.as_str() == normalized)
            .copied()
            .ok_or_else(|| SettingsError::UnknownAnchor(s.to_string()))
    }
}

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl FromStr for Position {
    type Err = SettingsError;

    /// Parses `X,Y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| SettingsError::InvalidPosition(s.to_string()))?;
        let x = x
            .trim()
            .parse::<f32>()
            .map_err(|_| SettingsError::InvalidPosition(s.to_string()))?;
        let y = y
            .trim()
            .parse::<f32>()
            .map_err(|_| SettingsError::InvalidPosition(s.to_string()))?;
        Ok(Position::new(x, y))
    }
}

/// An opaque RGB color, written as `#rrggbb` (or the short `#rgb` form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255]);

    pub fn with_alpha(&self, alpha: u8) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, alpha])
    }
}

impl FromStr for Color {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || SettingsError::InvalidColor(s.to_string());

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    rgb[i] = v * 16 + v;
                }
                Ok(Color(rgb))
            }
            6 => Ok(Color([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// The watermark configuration. Treated as a value: every edit produces a new
/// one through [`WatermarkSettings::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    pub text: String,
    pub color: Color,
    /// Size in pixels of the image's natural resolution.
    pub font_size: f32,
    pub opacity: f32,
    /// Only used when `anchor` is [`AutoPosition::Free`].
    pub position: Position,
    pub anchor: AutoPosition,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            text: "Your Watermark".to_string(),
            color: Color::WHITE,
            font_size: 48.0,
            opacity: 0.5,
            position: Position::new(100.0, 100.0),
            anchor: AutoPosition::BottomRight,
        }
    }
}

impl WatermarkSettings {
    /// Returns a copy with `patch` applied and the numeric ranges enforced.
    pub fn apply(&self, patch: SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(text) = patch.text {
            next.text = text;
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        if let Some(font_size) = patch.font_size {
            next.font_size = font_size;
        }
        if let Some(opacity) = patch.opacity {
            next.opacity = opacity;
        }
        if let Some(position) = patch.position {
            next.position = position;
        }
        if let Some(anchor) = patch.anchor {
            next.anchor = anchor;
        }
        next.clamped()
    }

    pub fn clamped(mut self) -> Self {
        self.font_size = if self.font_size.is_finite() {
            self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
        } else {
            FONT_SIZE_MIN
        };
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }
}

/// A partial settings update. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub text: Option<String>,
    pub color: Option<Color>,
    pub font_size: Option<f32>,
    pub opacity: Option<f32>,
    pub position: Option<Position>,
    pub anchor: Option<AutoPosition>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    /// Selecting a preset from the anchor grid.
    pub fn anchor(anchor: AutoPosition) -> Self {
        Self {
            anchor: Some(anchor),
            ..Default::default()
        }
    }

    /// Moving the watermark by hand always switches to free placement.
    pub fn moved_to(position: Position) -> Self {
        Self {
            position: Some(position),
            anchor: Some(AutoPosition::Free),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = WatermarkSettings::default();
        assert_eq!(settings.text, "Your Watermark");
        assert_eq!(settings.color, Color::WHITE);
        assert_eq!(settings.font_size, 48.0);
        assert_eq!(settings.opacity, 0.5);
        assert_eq!(settings.position, Position::new(100.0, 100.0));
        assert_eq!(settings.anchor, AutoPosition::BottomRight);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("#ffffff".parse::<Color>().unwrap(), Color([255, 255, 255]));
        assert_eq!("#1a2B3c".parse::<Color>().unwrap(), Color([0x1a, 0x2b, 0x3c]));
        assert_eq!("f00".parse::<Color>().unwrap(), Color([255, 0, 0]));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color([255, 0, 16]).to_string(), "#ff0010");
        assert_eq!(Color([1, 2, 3]).with_alpha(4), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_anchor_parsing() {
        assert_eq!(
            "bottom-right".parse::<AutoPosition>().unwrap(),
            AutoPosition::BottomRight
        );
        assert_eq!(
            "Top_Left".parse::<AutoPosition>().unwrap(),
            AutoPosition::TopLeft
        );
        assert_eq!("manual".parse::<AutoPosition>().unwrap(), AutoPosition::Free);
        assert!(matches!(
            "middle".parse::<AutoPosition>(),
            Err(SettingsError::UnknownAnchor(_))
        ));
        for anchor in AutoPosition::PRESETS {
            assert_eq!(anchor.as_str().parse::<AutoPosition>().unwrap(), anchor);
        }
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!(
            "12.5, 40".parse::<Position>().unwrap(),
            Position::new(12.5, 40.0)
        );
        assert!("12".parse::<Position>().is_err());
        assert!("a,b".parse::<Position>().is_err());
    }

    #[test]
    fn test_apply_patch_replaces_only_given_fields() {
        let settings = WatermarkSettings::default();
        let next = settings.apply(SettingsPatch {
            text: Some("© Studio".to_string()),
            ..Default::default()
        });
        assert_eq!(next.text, "© Studio");
        assert_eq!(next.font_size, settings.font_size);
        assert_eq!(next.anchor, settings.anchor);
        // The original value is untouched
        assert_eq!(settings.text, "Your Watermark");
    }

    #[test]
    fn test_apply_patch_clamps_ranges() {
        let settings = WatermarkSettings::default();
        let next = settings.apply(SettingsPatch {
            font_size: Some(500.0),
            opacity: Some(-0.2),
            ..Default::default()
        });
        assert_eq!(next.font_size, FONT_SIZE_MAX);
        assert_eq!(next.opacity, 0.0);

        let next = settings.apply(SettingsPatch {
            font_size: Some(1.0),
            opacity: Some(3.0),
            ..Default::default()
        });
        assert_eq!(next.font_size, FONT_SIZE_MIN);
        assert_eq!(next.opacity, 1.0);
    }

    #[test]
    fn test_moved_to_forces_free_anchor() {
        let patch = SettingsPatch::moved_to(Position::new(5.0, 6.0));
        let next = WatermarkSettings::default().apply(patch);
        assert_eq!(next.anchor, AutoPosition::Free);
        assert_eq!(next.position, Position::new(5.0, 6.0));
        assert!(SettingsPatch::default().is_empty());
    }

    #[test]
    fn test_settings_toml_round_trip() {
        let toml = r##"
text = "Sample"
color = "#00ff00"
font_size = 32
anchor = "top-center"
"##;
        let settings: WatermarkSettings = toml_edit::de::from_str(toml).unwrap();
        assert_eq!(settings.text, "Sample");
        assert_eq!(settings.color, Color([0, 255, 0]));
        assert_eq!(settings.font_size, 32.0);
        assert_eq!(settings.anchor, AutoPosition::TopCenter);
        // Unspecified fields fall back to defaults
        assert_eq!(settings.opacity, 0.5);
    }
}
