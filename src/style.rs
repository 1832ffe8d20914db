use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

pub const DEFAULT_PADDING: f64 = 4.0;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("'{value}' is not a valid hex color (expected #rgb, #rrggbb or #rrggbbaa)")]
pub struct ColorParseError {
	value: String,
}

/// A straight-alpha color with all channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
	pub red: f32,
	pub green: f32,
	pub blue: f32,
	pub alpha: f32,
}

impl Rgba {
	pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
		Self {
			red,
			green,
			blue,
			alpha,
		}
	}

	pub fn with_alpha(self, alpha: f32) -> Self {
		Self { alpha, ..self }
	}

	fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self::new(
			r as f32 / 255.0,
			g as f32 / 255.0,
			b as f32 / 255.0,
			a as f32 / 255.0,
		)
	}
}

impl FromStr for Rgba {
	type Err = ColorParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let error = || ColorParseError {
			value: s.to_owned(),
		};

		let hex = s.trim();
		let hex = hex.strip_prefix('#').unwrap_or(hex);
		if !hex.is_ascii() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(error());
		}

		let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| error());
		let nibble = |i: usize| {
			u8::from_str_radix(&hex[i..i + 1], 16)
				.map(|v| v * 17)
				.map_err(|_| error())
		};

		match hex.len() {
			3 => Ok(Self::from_bytes(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
			6 => Ok(Self::from_bytes(byte(0)?, byte(2)?, byte(4)?, 255)),
			8 => Ok(Self::from_bytes(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
			_ => Err(error()),
		}
	}
}

impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
		write!(
			f,
			"#{:02x}{:02x}{:02x}{:02x}",
			channel(self.red),
			channel(self.green),
			channel(self.blue),
			channel(self.alpha)
		)
	}
}

impl<'de> Deserialize<'de> for Rgba {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = String::deserialize(deserializer)?;
		value.parse().map_err(de::Error::custom)
	}
}

/// Colors and spacing shared by every segment of a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
	/// Color of the filled part of a segment
	pub fill_color: Rgba,
	/// Color of the segment background
	pub track_color: Rgba,
	/// Horizontal gap between two segments
	pub padding: f64,
}

impl Default for BarStyle {
	fn default() -> Self {
		Self {
			fill_color: Rgba::new(0.5, 0.5, 0.5, 1.0),
			track_color: Rgba::new(1.0, 1.0, 1.0, 1.0).with_alpha(0.1),
			padding: DEFAULT_PADDING,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_long_and_short_forms() {
		assert_eq!("#ffffff".parse(), Ok(Rgba::new(1.0, 1.0, 1.0, 1.0)));
		assert_eq!("000".parse(), Ok(Rgba::new(0.0, 0.0, 0.0, 1.0)));
		assert_eq!("#f00".parse(), Ok(Rgba::new(1.0, 0.0, 0.0, 1.0)));

		let color: Rgba = "#00ff0080".parse().unwrap();
		assert_eq!(color.green, 1.0);
		assert!((color.alpha - 128.0 / 255.0).abs() < f32::EPSILON);
	}

	#[test]
	fn rejects_malformed_colors() {
		for value in ["", "#", "#12", "#12345", "#gggggg", "#ffffff0", "#ffé"] {
			assert!(value.parse::<Rgba>().is_err(), "{value} parsed");
		}
	}

	#[test]
	fn displays_as_hex() {
		assert_eq!(Rgba::new(1.0, 0.0, 0.0, 1.0).to_string(), "#ff0000ff");
		assert_eq!(BarStyle::default().track_color.to_string(), "#ffffff1a");
	}

	#[test]
	fn default_style() {
		let style = BarStyle::default();
		assert_eq!(style.padding, 4.0);
		assert_eq!(style.fill_color.to_string(), "#808080ff");
	}
}
