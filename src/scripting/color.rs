//! Color parsing and the graph palette

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color as used by graph outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Hex form with a leading `#`. Alpha is included only when not fully
    /// opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// The color string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError {
    pub input: String,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            rust_i18n::t!("errors.color_format", value = self.input)
        )
    }
}

impl std::error::Error for ParseColorError {}

/// Parse `RRGGBB` or `RRGGBBAA` hex, with an optional leading `#`. Six
/// digits imply full opacity.
pub fn parse_color(input: &str) -> Result<Color, ParseColorError> {
    let err = || ParseColorError {
        input: input.to_string(),
    };
    let hex = input.strip_prefix('#').unwrap_or(input);
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(err());
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
    Ok(Color {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
        a: if hex.len() == 8 { byte(6)? } else { 0xFF },
    })
}

/// Fixed palette used to assign stable colors to graph lines and pie
/// segments. Indexed via [`palette_index`](crate::scripting::palette_index)
/// so the same key always maps to the same color.
pub const GRAPH_PALETTE: [Color; 12] = [
    Color::rgb(0x1F, 0x77, 0xB4),
    Color::rgb(0xFF, 0x7F, 0x0E),
    Color::rgb(0x2C, 0xA0, 0x2C),
    Color::rgb(0xD6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xBD),
    Color::rgb(0x8C, 0x56, 0x4B),
    Color::rgb(0xE3, 0x77, 0xC2),
    Color::rgb(0x7F, 0x7F, 0x7F),
    Color::rgb(0xBC, 0xBD, 0x22),
    Color::rgb(0x17, 0xBE, 0xCF),
    Color::rgb(0xAE, 0xC7, 0xE8),
    Color::rgb(0xFF, 0xBB, 0x78),
];
