use serde_derive::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::animation::Easing;
use crate::style::{BarStyle, Rgba};

pub const CONFIG_DIR_NAME: &str = "segmented-progress";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_SEGMENTS: usize = 5;
pub const DEFAULT_DURATION_SECS: f64 = 5.0;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Could not read config file {path:?}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Could not parse config file")]
	Parse(#[from] toml::de::Error),
	#[error("Invalid config value: {0}")]
	Invalid(String),
}

#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BarConfig {
	pub segments: Option<usize>,
	/// Fill duration of a single segment, in seconds
	pub duration: Option<f64>,
	pub padding: Option<f64>,
	pub easing: Option<Easing>,
	pub fill_color: Option<Rgba>,
	pub track_color: Option<Rgba>,
}

impl BarConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.segments == Some(0) {
			return Err(ConfigError::Invalid(
				"segments must be at least 1".to_owned(),
			));
		}
		if let Some(duration) = self.duration {
			if duration <= 0.0 || Duration::try_from_secs_f64(duration).is_err() {
				return Err(ConfigError::Invalid(format!(
					"duration must be a positive number of seconds, got {}",
					duration
				)));
			}
		}
		if let Some(padding) = self.padding {
			if !padding.is_finite() || padding < 0.0 {
				return Err(ConfigError::Invalid(format!(
					"padding must not be negative, got {}",
					padding
				)));
			}
		}
		Ok(())
	}

	pub fn n_segments(&self) -> usize {
		self.segments.unwrap_or(DEFAULT_SEGMENTS).max(1)
	}

	pub fn duration(&self) -> Duration {
		match self.duration {
			Some(secs) => duration_from_secs(secs),
			None => Duration::from_secs_f64(DEFAULT_DURATION_SECS),
		}
	}

	pub fn easing(&self) -> Easing {
		self.easing.unwrap_or_default()
	}

	pub fn style(&self) -> BarStyle {
		let default = BarStyle::default();
		BarStyle {
			fill_color: self.fill_color.unwrap_or(default.fill_color),
			track_color: self.track_color.unwrap_or(default.track_color),
			padding: self.padding.unwrap_or(default.padding),
		}
	}
}

/// Converts a number of seconds coming from outside into a `Duration`.
/// Values too large to represent saturate, negative values and NaN are zero.
pub fn duration_from_secs(secs: f64) -> Duration {
	if secs.is_nan() || secs <= 0.0 {
		return Duration::ZERO;
	}
	Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	#[serde(default)]
	pub bar: BarConfig,
}

impl Config {
	pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(contents)?;
		config.bar.validate()?;
		Ok(config)
	}
}

fn find_config() -> Option<PathBuf> {
	let dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR_NAME).ok()?;
	dirs.find_config_file(CONFIG_FILE_NAME)
}

/// Reads the config at `path`, or from the first config file found in the
/// user and system config dirs. No config file at all yields the defaults.
pub fn read_config(path: Option<&Path>) -> Result<Config, ConfigError> {
	let path = match path.map(Path::to_owned).or_else(find_config) {
		Some(path) => path,
		None => return Ok(Default::default()),
	};

	tracing::debug!(?path, "reading config");
	let config_file =
		std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
	Config::from_toml(&config_file)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_config_uses_defaults() {
		let config = Config::from_toml("").unwrap();
		assert_eq!(config, Config::default());
		assert_eq!(config.bar.n_segments(), 5);
		assert_eq!(config.bar.duration(), Duration::from_secs(5));
		assert_eq!(config.bar.easing(), Easing::EaseInOut);
		assert_eq!(config.bar.style(), BarStyle::default());
	}

	#[test]
	fn parses_every_field() {
		let config = Config::from_toml(
			r##"
			[bar]
			segments = 3
			duration = 1.5
			padding = 2.0
			easing = "linear"
			fill_color = "#ff0000"
			track_color = "#00000080"
			"##,
		)
		.unwrap();

		let bar = config.bar;
		assert_eq!(bar.n_segments(), 3);
		assert_eq!(bar.duration(), Duration::from_millis(1500));
		assert_eq!(bar.easing(), Easing::Linear);

		let style = bar.style();
		assert_eq!(style.padding, 2.0);
		assert_eq!(style.fill_color, Rgba::new(1.0, 0.0, 0.0, 1.0));
		assert_eq!(style.track_color.to_string(), "#00000080");
	}

	#[test]
	fn rejects_invalid_values() {
		for contents in [
			"[bar]\nsegments = 0",
			"[bar]\nduration = 0.0",
			"[bar]\nduration = -1.0",
			"[bar]\nduration = 1e300",
			"[bar]\nduration = inf",
			"[bar]\npadding = -4.0",
		] {
			assert!(
				matches!(Config::from_toml(contents), Err(ConfigError::Invalid(_))),
				"{contents} was accepted"
			);
		}
	}

	#[test]
	fn rejects_unknown_fields_and_bad_colors() {
		for contents in [
			"[bar]\nspeed = 2",
			"[server]\nstyle = 'a'",
			"[bar]\nfill_color = 'red'",
			"[bar]\neasing = 'bounce'",
		] {
			assert!(
				matches!(Config::from_toml(contents), Err(ConfigError::Parse(_))),
				"{contents} was accepted"
			);
		}
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let path = Path::new("/nonexistent/segmented-progress/config.toml");
		assert!(matches!(
			read_config(Some(path)),
			Err(ConfigError::Io { .. })
		));
	}

	#[test]
	fn out_of_range_seconds_saturate() {
		assert_eq!(duration_from_secs(1.5), Duration::from_millis(1500));
		assert_eq!(duration_from_secs(1e300), Duration::MAX);
		assert_eq!(duration_from_secs(f64::INFINITY), Duration::MAX);
		assert_eq!(duration_from_secs(-3.0), Duration::ZERO);
		assert_eq!(duration_from_secs(f64::NAN), Duration::ZERO);
	}

	#[test]
	fn finds_the_user_config() {
		let home = tempfile::tempdir().unwrap();
		let dir = home.path().join(CONFIG_DIR_NAME);
		std::fs::create_dir_all(&dir).unwrap();
		std::fs::write(dir.join(CONFIG_FILE_NAME), "[bar]\nsegments = 7").unwrap();

		std::env::set_var("XDG_CONFIG_HOME", home.path());
		let config = read_config(None);
		std::env::remove_var("XDG_CONFIG_HOME");

		assert_eq!(config.unwrap().bar.n_segments(), 7);
	}

	#[test]
	fn builds_a_sequencer() {
		let config = Config::from_toml("[bar]\nsegments = 4\nduration = 2.0").unwrap();
		let sequencer = crate::sequencer::Sequencer::from_config(&config.bar);
		assert_eq!(sequencer.n_segments(), 4);
		assert_eq!(sequencer.duration(), Duration::from_secs(2));
	}
}
