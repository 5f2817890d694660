//! RGBA colors used by palette entries, rooms and markers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Linear RGBA color with `f32` components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    ///
    /// Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        let channel = |shift: u32| ((value >> shift) & 0xFF) as f32 / 255.0;
        match digits.len() {
            6 => Some(Self::rgb(channel(16), channel(8), channel(0))),
            8 => Some(Self::rgba(channel(24), channel(16), channel(8), channel(0))),
            _ => None,
        }
    }

    /// Formats as lowercase `#rrggbbaa` (or `#rrggbb` without alpha).
    pub fn to_hex(&self, include_alpha: bool) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if include_alpha {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}")
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Packs into `0xAABBGGRR`, the layout immediate-mode UIs expect.
    pub fn to_u32(&self) -> u32 {
        let [r, g, b, a] = self.to_rgba8();
        u32::from_le_bytes([r, g, b, a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(true))
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| format!("invalid hex color: {s:?}"))
    }
}
