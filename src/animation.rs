use std::time::Duration;

use serde_derive::Deserialize;

/// Timing curve applied to the linear progress of a fill animation.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
	Linear,
	EaseIn,
	EaseOut,
	#[default]
	EaseInOut,
}

impl Easing {
	pub fn apply(self, t: f64) -> f64 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Easing::Linear => t,
			Easing::EaseIn => t * t,
			Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
			Easing::EaseInOut => {
				if t < 0.5 {
					2.0 * t * t
				} else {
					1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
				}
			}
		}
	}
}

/// Only `End` means that the run completed on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPosition {
	Start,
	Current,
	End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
	pub(crate) fn first() -> Self {
		Self(0)
	}

	pub(crate) fn next(self) -> Self {
		Self(self.0.wrapping_add(1))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
	Running,
	Paused,
	Stopped,
	Completed,
}

/// A timed fill from empty to full, driven by the host frame clock.
#[derive(Debug, Clone)]
pub struct FillAnimation {
	handle: AnimationHandle,
	duration: Duration,
	elapsed: Duration,
	easing: Easing,
	state: RunState,
}

impl FillAnimation {
	pub fn new(handle: AnimationHandle, duration: Duration, easing: Easing) -> Self {
		Self {
			handle,
			duration,
			elapsed: Duration::ZERO,
			easing,
			state: RunState::Running,
		}
	}

	pub fn handle(&self) -> AnimationHandle {
		self.handle
	}

	pub fn is_paused(&self) -> bool {
		self.state == RunState::Paused
	}

	pub fn progress(&self) -> f64 {
		if self.state == RunState::Completed {
			return 1.0;
		}
		if self.duration.is_zero() {
			return 0.0;
		}
		(self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
	}

	pub fn value(&self) -> f64 {
		self.easing.apply(self.progress())
	}

	pub fn pause(&mut self) {
		if self.state == RunState::Running {
			self.state = RunState::Paused;
		}
	}

	pub fn resume(&mut self) {
		if self.state == RunState::Paused {
			self.state = RunState::Running;
		}
	}

	/// Advances the run by `dt`. Returns `Some(AnimationPosition::End)` on the
	/// tick that completes it, which happens at most once.
	pub fn tick(&mut self, dt: Duration) -> Option<AnimationPosition> {
		if self.state != RunState::Running {
			return None;
		}

		self.elapsed = (self.elapsed + dt).min(self.duration);
		if self.elapsed >= self.duration {
			self.state = RunState::Completed;
			return Some(AnimationPosition::End);
		}
		None
	}

	/// Returns the eased fill at the point where the run stopped.
	pub fn stop(&mut self) -> f64 {
		if self.state != RunState::Completed {
			self.state = RunState::Stopped;
		}
		self.value()
	}
}

/// Turns absolute frame clock timestamps (microseconds) into frame deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDelta {
	last: Option<i64>,
}

impl FrameDelta {
	/// Returns the time since the previous sample, or `None` for the first
	/// sample after a reset.
	pub fn sample(&mut self, frame_time: i64) -> Option<Duration> {
		let last = self.last.replace(frame_time)?;
		Some(Duration::from_micros(frame_time.saturating_sub(last).max(0) as u64))
	}

	pub fn reset(&mut self) {
		self.last = None;
	}
}
