//! Deterministic project colors.
//!
//! A project name is hashed, the hash is stepped around the hue wheel by the
//! golden angle, and the hue is turned into RGB at fixed saturation and
//! lightness. The hash walks UTF-16 code units, not bytes.

use crate::debug_if_enabled;
use std::collections::HashMap;

pub const DEFAULT_SATURATION: f64 = 75.0;
pub const DEFAULT_LIGHTNESS: f64 = 50.0;
pub const GOLDEN_ANGLE: f64 = 137.508;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectColor {
    pub hex: String,
    pub rgba: [f64; 4],
}

impl ProjectColor {
    /// Same color with a different alpha channel.
    pub fn with_alpha(&self, alpha: f64) -> [f64; 4] {
        [self.rgba[0], self.rgba[1], self.rgba[2], alpha.clamp(0.0, 1.0)]
    }
}

/// djb2: `hash * 33 + unit`, wrapping at 32 bits.
pub fn hash_string(name: &str) -> u32 {
    name.encode_utf16()
        .fold(5381u32, |hash, unit| hash.wrapping_mul(33).wrapping_add(u32::from(unit)))
}

pub fn hue_from_project_name(name: &str) -> f64 {
    (f64::from(hash_string(name)) * GOLDEN_ANGLE) % 360.0
}

fn hsl_channels(h: f64, s: f64, l: f64) -> [f64; 3] {
    let s = s / 100.0;
    let l = l / 100.0;
    let a = s * l.min(1.0 - l);
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        (l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)).clamp(0.0, 1.0)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round() as u8
}

pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let [r, g, b] = hsl_channels(h, s, l);
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

pub fn hsl_to_rgba(h: f64, s: f64, l: f64, alpha: f64) -> [f64; 4] {
    let [r, g, b] = hsl_channels(h, s, l);
    [r, g, b, alpha]
}

/// Parses `#rrggbb`. Anything else is `None`.
pub fn hex_to_rgba(hex: &str) -> Option<[f64; 4]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map(|v| f64::from(v) / 255.0)
    };
    Some([channel(0..2).ok()?, channel(2..4).ok()?, channel(4..6).ok()?, 1.0])
}

/// Resolves the color for a project, honoring a valid user override.
pub fn resolve(project_name: &str, overrides: &HashMap<String, String>) -> ProjectColor {
    if let Some(raw) = overrides.get(project_name) {
        let hex = raw.trim();
        match hex_to_rgba(hex) {
            Some(rgba) => {
                return ProjectColor { hex: hex.to_string(), rgba };
            }
            None => {
                debug_if_enabled!("Ignoring malformed color override {:?} for {}", raw, project_name);
            }
        }
    }

    let hue = hue_from_project_name(project_name);
    ProjectColor {
        hex: hsl_to_hex(hue, DEFAULT_SATURATION, DEFAULT_LIGHTNESS),
        rgba: hsl_to_rgba(hue, DEFAULT_SATURATION, DEFAULT_LIGHTNESS, 1.0),
    }
}
