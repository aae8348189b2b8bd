//! RGBA colours written as HTML colour strings.

use std::str::FromStr;

use serde::Serialize;

/// A colour with channels in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Creates an opaque colour from 8-bit channels.
    #[must_use]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, u8::MAX)
    }

    /// Creates a colour from 8-bit channels.
    #[must_use]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let channel = |value: u8| f32::from(value) / 255.0;
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: channel(a),
        }
    }

    fn named(name: &str) -> Option<Self> {
        let (r, g, b) = match name {
            "red" => (255, 0, 0),
            "cyan" | "aqua" => (0, 255, 255),
            "blue" => (0, 0, 255),
            "darkblue" => (0, 0, 160),
            "lightblue" => (173, 216, 230),
            "purple" => (128, 0, 128),
            "yellow" => (255, 255, 0),
            "lime" => (0, 255, 0),
            "fuchsia" | "magenta" => (255, 0, 255),
            "white" => (255, 255, 255),
            "silver" => (192, 192, 192),
            "grey" | "gray" => (128, 128, 128),
            "black" => (0, 0, 0),
            "orange" => (255, 165, 0),
            "brown" => (165, 42, 42),
            "maroon" => (128, 0, 0),
            "green" => (0, 128, 0),
            "olive" => (128, 128, 0),
            "navy" => (0, 0, 128),
            "teal" => (0, 128, 128),
            _ => return None,
        };
        Some(Self::from_rgb8(r, g, b))
    }
}

/// The text is not an HTML colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor(pub String);

impl FromStr for Color {
    type Err = InvalidColor;

    /// Parses `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` or a colour name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidColor(s.to_string());
        let text = s.trim();
        let Some(hex) = text.strip_prefix('#') else {
            return Self::named(&text.to_ascii_lowercase()).ok_or_else(invalid);
        };
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let digit = |index: usize, width: usize| -> Result<u8, InvalidColor> {
            let digits = &hex[index * width..(index + 1) * width];
            let value = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
            // A single digit stands for the doubled digit, `f` for `ff`.
            Ok(if width == 1 { value * 17 } else { value })
        };
        match hex.len() {
            3 => Ok(Self::from_rgb8(digit(0, 1)?, digit(1, 1)?, digit(2, 1)?)),
            4 => Ok(Self::from_rgba8(
                digit(0, 1)?,
                digit(1, 1)?,
                digit(2, 1)?,
                digit(3, 1)?,
            )),
            6 => Ok(Self::from_rgb8(digit(0, 2)?, digit(1, 2)?, digit(2, 2)?)),
            8 => Ok(Self::from_rgba8(
                digit(0, 2)?,
                digit(1, 2)?,
                digit(2, 2)?,
                digit(3, 2)?,
            )),
            _ => Err(invalid()),
        }
    }
}
