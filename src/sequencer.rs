use std::{
	rc::{Rc, Weak},
	time::Duration,
};

use tracing::{debug, trace};

use crate::{
	animation::{AnimationHandle, AnimationPosition, Easing, FillAnimation},
	config::BarConfig,
	layout::BarLayout,
	style::{BarStyle, Rgba},
};

pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

/// Called while the sequencer is being mutated, so an observer must not call
/// back into the same sequencer.
pub trait SequencerObserver {
	fn index_changed(&self, index: usize);
	fn finished(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
	fill: f64,
}

impl Segment {
	pub fn fill(&self) -> f64 {
		self.fill
	}

	pub fn is_empty(&self) -> bool {
		self.fill == 0.0
	}

	pub fn is_full(&self) -> bool {
		self.fill >= 1.0
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
	Idle,
	Animating(usize),
	Paused(usize),
	Finished,
}

/// Drives the fill animation of a fixed row of segments, one segment at a
/// time, and reports every change of the active segment.
#[derive(Debug)]
pub struct Sequencer {
	segments: Vec<Segment>,
	cursor: usize,
	duration: Duration,
	easing: Easing,
	style: BarStyle,
	animation: Option<FillAnimation>,
	next_handle: AnimationHandle,
	finished: bool,
	layout: Option<BarLayout>,
	observer: Option<Weak<dyn SequencerObserver>>,
}

impl Sequencer {
	pub fn new(n_segments: usize, duration: Duration) -> Self {
		Self::with_style(n_segments, duration, BarStyle::default())
	}

	pub fn with_style(n_segments: usize, duration: Duration, style: BarStyle) -> Self {
		assert!(
			n_segments >= 1,
			"a segmented progress bar needs at least one segment"
		);

		Self {
			segments: vec![Segment::default(); n_segments],
			cursor: 0,
			duration,
			easing: Easing::default(),
			style,
			animation: None,
			next_handle: AnimationHandle::first(),
			finished: false,
			layout: None,
			observer: None,
		}
	}

	pub fn from_config(config: &BarConfig) -> Self {
		let mut sequencer = Self::with_style(config.n_segments(), config.duration(), config.style());
		sequencer.easing = config.easing();
		sequencer
	}

	/// Only keeps a weak reference to the observer.
	pub fn set_observer<O: SequencerObserver + 'static>(&mut self, observer: &Rc<O>) {
		let observer: Weak<O> = Rc::downgrade(observer);
		self.observer = Some(observer);
	}

	pub fn clear_observer(&mut self) {
		self.observer = None;
	}

	pub fn state(&self) -> SequencerState {
		if self.finished {
			return SequencerState::Finished;
		}
		match &self.animation {
			Some(animation) if animation.is_paused() => SequencerState::Paused(self.cursor),
			Some(_) => SequencerState::Animating(self.cursor),
			None => SequencerState::Idle,
		}
	}

	pub fn current_index(&self) -> usize {
		self.cursor
	}

	pub fn n_segments(&self) -> usize {
		self.segments.len()
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn fill(&self, index: usize) -> Option<f64> {
		self.segments.get(index).map(Segment::fill)
	}

	pub fn is_animating(&self) -> bool {
		matches!(self.state(), SequencerState::Animating(_))
	}

	pub fn active_handle(&self) -> Option<AnimationHandle> {
		self.animation.as_ref().map(FillAnimation::handle)
	}

	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Takes effect from the next segment that starts animating.
	pub fn set_duration(&mut self, duration: Duration) {
		self.duration = duration;
	}

	pub fn easing(&self) -> Easing {
		self.easing
	}

	pub fn set_easing(&mut self, easing: Easing) {
		self.easing = easing;
	}

	pub fn style(&self) -> &BarStyle {
		&self.style
	}

	pub fn set_fill_color(&mut self, color: Rgba) {
		self.style.fill_color = color;
	}

	pub fn set_track_color(&mut self, color: Rgba) {
		self.style.track_color = color;
	}

	pub fn set_padding(&mut self, padding: f64) {
		self.style.padding = padding.max(0.0);
		self.invalidate_layout();
	}

	pub fn layout(&self) -> Option<&BarLayout> {
		self.layout.as_ref()
	}

	pub fn invalidate_layout(&mut self) {
		self.layout = None;
	}

	pub fn ensure_layout(&mut self, width: f64, height: f64) -> &BarLayout {
		let n_segments = self.segments.len();
		let padding = self.style.padding;
		self.layout.get_or_insert_with(|| {
			debug!(width, height, n_segments, "computing bar layout");
			BarLayout::compute(width, height, padding, n_segments)
		})
	}

	/// Lays the bar out for the given size and starts filling the first
	/// segment. Does nothing else while the bar is running or finished.
	pub fn start_animation(&mut self, width: f64, height: f64) {
		self.ensure_layout(width, height);

		match self.state() {
			SequencerState::Idle => {
				debug!(n_segments = self.segments.len(), "starting animation");
				self.animate(0);
			}
			state => trace!(?state, "start ignored"),
		}
	}

	pub fn pause_animation(&mut self) {
		match self.animation.as_mut() {
			Some(animation) => animation.pause(),
			None => trace!("pause ignored, no active animation"),
		}
	}

	pub fn resume_animation(&mut self) {
		match self.animation.as_mut() {
			Some(animation) => animation.resume(),
			None => trace!("resume ignored, no active animation"),
		}
	}

	pub fn skip(&mut self) {
		if self.animation.is_none() {
			trace!(state = ?self.state(), "skip ignored, no active animation");
			return;
		}

		debug!(index = self.cursor, "skipping segment");
		self.finish_active_animation();
		self.segments[self.cursor].fill = 1.0;
		self.advance();
	}

	pub fn rewind(&mut self) {
		self.finish_active_animation();
		self.segments[self.cursor].fill = 0.0;

		let index = self.cursor.saturating_sub(1);
		self.segments[index].fill = 0.0;

		debug!(from = self.cursor, to = index, "rewinding");
		self.notify_index_changed(index);
		self.animate(index);
	}

	/// Stops animating and empties every segment. The cursor is kept.
	pub fn cancel(&mut self) {
		if let Some(mut animation) = self.animation.take() {
			animation.stop();
		}
		for segment in &mut self.segments {
			segment.fill = 0.0;
		}
		self.finished = false;
		debug!(index = self.cursor, "cancelled");
	}

	/// Cancels and moves the cursor back to the first segment.
	pub fn reset(&mut self) {
		self.cancel();
		self.cursor = 0;
	}

	pub fn tick(&mut self, dt: Duration) {
		let Some(animation) = self.animation.as_mut() else {
			return;
		};

		let position = animation.tick(dt);
		let handle = animation.handle();
		self.segments[self.cursor].fill = animation.value();

		if let Some(position) = position {
			self.finish_animation(handle, position);
		}
	}

	/// Only the active run reaching its end moves the bar forward.
	pub fn finish_animation(&mut self, handle: AnimationHandle, position: AnimationPosition) {
		if self.active_handle() != Some(handle) {
			trace!(?handle, "ignoring completion of a superseded animation");
			return;
		}
		if position != AnimationPosition::End {
			trace!(?handle, ?position, "ignoring interrupted animation");
			return;
		}

		self.animation = None;
		self.segments[self.cursor].fill = 1.0;
		self.advance();
	}

	fn animate(&mut self, index: usize) {
		self.finish_active_animation();

		self.cursor = index;
		self.finished = false;
		self.segments[index].fill = 0.0;

		let handle = self.next_handle;
		self.next_handle = handle.next();
		self.animation = Some(FillAnimation::new(handle, self.duration, self.easing));
		debug!(index, ?handle, "animating segment");
	}

	fn advance(&mut self) {
		self.finish_active_animation();

		let index = self.cursor + 1;
		if index < self.segments.len() {
			debug!(index, "advancing");
			self.notify_index_changed(index);
			self.animate(index);
		} else {
			debug!("all segments finished");
			self.finished = true;
			self.notify_finished();
		}
	}

	fn finish_active_animation(&mut self) {
		if let Some(mut animation) = self.animation.take() {
			self.segments[self.cursor].fill = animation.stop();
		}
	}

	fn observer(&self) -> Option<Rc<dyn SequencerObserver>> {
		self.observer.as_ref().and_then(Weak::upgrade)
	}

	fn notify_index_changed(&self, index: usize) {
		if let Some(observer) = self.observer() {
			observer.index_changed(index);
		}
	}

	fn notify_finished(&self) {
		if let Some(observer) = self.observer() {
			observer.finished();
		}
	}
}
