//! A segmented, animated "story" progress bar.
//!
//! The bar is split into equally sized segments which fill one after the
//! other. [`Sequencer`] holds the toolkit independent state machine, the
//! optional `gtk` feature provides a GTK 4 widget driving it from the frame
//! clock.

pub mod animation;
pub mod config;
pub mod layout;
pub mod sequencer;
pub mod style;

#[cfg(feature = "gtk")]
pub mod widgets;

pub use animation::{AnimationHandle, AnimationPosition, Easing, FrameDelta};
pub use config::{duration_from_secs, read_config, BarConfig, Config, ConfigError};
pub use layout::{BarLayout, Rect};
pub use sequencer::{Segment, Sequencer, SequencerObserver, SequencerState, DEFAULT_DURATION};
pub use style::{BarStyle, ColorParseError, Rgba};
