//! Immutable theme values.
//!
//! A [`Theme`] is a user-selected accent pair plus a light/dark scheme.
//! Changing either produces a new value; nothing is shared or mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

/// An sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(value.to_string());
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// UI colors for one scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
}

/// Chessboard colors. Squares follow the accent pair, never the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardColors {
    pub dark_square: Color,
    pub light_square: Color,
    pub frame: Color,
    pub border: Color,
    pub piece_white: Color,
    pub piece_black: Color,
    pub highlight: Color,
    pub move_dot: Color,
}

const CLASSIC_PRIMARY: Color = Color::rgb(0x73, 0x95, 0x52);
const CLASSIC_SECONDARY: Color = Color::rgb(0xeb, 0xec, 0xd0);
const SUCCESS: Color = Color::rgb(0x22, 0xc5, 0x5e);
const WARNING: Color = Color::rgb(0xf5, 0x9e, 0x0b);
const ERROR: Color = Color::rgb(0xef, 0x44, 0x44);
const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
const HIGHLIGHT: Color = Color::rgb(0x57, 0x92, 0xeb);

/// Accent pair plus color scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    key: String,
    scheme: ColorScheme,
    primary: Color,
    secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Green and cream board, light scheme
    pub fn classic() -> Self {
        Self {
            key: "classic".to_string(),
            scheme: ColorScheme::Light,
            primary: CLASSIC_PRIMARY,
            secondary: CLASSIC_SECONDARY,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// Same accents under another scheme
    pub fn with_scheme(&self, scheme: ColorScheme) -> Self {
        Self {
            scheme,
            ..self.clone()
        }
    }

    /// New theme with the given accent pair; unnamed themes are keyed `custom`
    pub fn with_accent(&self, key: Option<&str>, primary: Color, secondary: Color) -> Self {
        Self {
            key: key.unwrap_or("custom").to_string(),
            scheme: self.scheme,
            primary,
            secondary,
        }
    }

    pub fn colors(&self) -> Colors {
        let (background, surface, text, muted, border) = match self.scheme {
            ColorScheme::Light => (
                WHITE,
                Color::rgb(0xdd, 0xdd, 0xdd),
                Color::rgb(0x0f, 0x17, 0x2a),
                Color::rgb(0x64, 0x74, 0x8b),
                Color::rgb(0xe5, 0xe7, 0xeb),
            ),
            ColorScheme::Dark => (
                Color::rgb(0x00, 0x00, 0x00),
                Color::rgb(0x38, 0x38, 0x38),
                Color::rgb(0xe5, 0xe7, 0xeb),
                Color::rgb(0x9c, 0xa3, 0xaf),
                Color::rgb(0x1f, 0x29, 0x37),
            ),
        };

        Colors {
            primary: self.primary,
            secondary: self.secondary,
            background,
            surface,
            text,
            muted,
            success: SUCCESS,
            warning: WARNING,
            error: ERROR,
            border,
        }
    }

    pub fn board_colors(&self) -> BoardColors {
        BoardColors {
            dark_square: self.primary,
            light_square: self.secondary,
            frame: Color::rgb(0x38, 0x38, 0x38),
            border: WHITE,
            piece_white: Color::rgb(0xf0, 0xf0, 0xf0),
            piece_black: Color::rgb(0x10, 0x10, 0x10),
            highlight: HIGHLIGHT,
            move_dot: HIGHLIGHT,
        }
    }
}
