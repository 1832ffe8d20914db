mod imp;

use gtk::{
	glib::{self, Object},
	prelude::*,
	subclass::prelude::*,
};

use crate::{config::BarConfig, sequencer::SequencerState};

glib::wrapper! {
	/// A story style progress bar whose segments fill one after another.
	///
	/// Emits `index-changed` with the new segment index whenever the active
	/// segment changes and `finished` after the last segment filled up.
	pub struct SegmentedProgressWidget(ObjectSubclass<imp::SegmentedProgressWidget>)
		@extends gtk::Widget,
		@implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget;
}

impl SegmentedProgressWidget {
	pub fn new(n_segments: u32) -> Self {
		Object::builder().property("n-segments", n_segments).build()
	}

	pub fn from_config(config: &BarConfig) -> Self {
		let style = config.style();
		Object::builder()
			.property("n-segments", config.n_segments() as u32)
			.property("duration", config.duration().as_secs_f64())
			.property("padding", style.padding)
			.property("fill-color", imp::rgba_to_gdk(&style.fill_color).to_value())
			.property("track-color", imp::rgba_to_gdk(&style.track_color).to_value())
			.build()
	}

	/// Starts filling the first segment. Does nothing while running.
	pub fn start_animation(&self) {
		self.imp().start_animation();
	}

	pub fn pause_animation(&self) {
		self.imp().pause_animation();
	}

	pub fn resume_animation(&self) {
		self.imp().resume_animation();
	}

	pub fn skip(&self) {
		self.imp().skip();
	}

	pub fn rewind(&self) {
		self.imp().rewind();
	}

	/// Stops and empties every segment without emitting any signal.
	pub fn cancel(&self) {
		self.imp().cancel();
	}

	/// Like [`Self::cancel`], but the next start begins at the first segment.
	pub fn reset(&self) {
		self.imp().reset();
	}

	pub fn current_index(&self) -> u32 {
		self.imp().current_index()
	}

	pub fn state(&self) -> SequencerState {
		self.imp().state()
	}

	pub fn connect_index_changed<F: Fn(&Self, u32) + 'static>(&self, f: F) -> glib::SignalHandlerId {
		self.connect_local("index-changed", false, move |values| {
			let widget = values[0].get::<Self>().ok()?;
			let index = values[1].get::<u32>().ok()?;
			f(&widget, index);
			None
		})
	}

	pub fn connect_finished<F: Fn(&Self) + 'static>(&self, f: F) -> glib::SignalHandlerId {
		self.connect_local("finished", false, move |values| {
			let widget = values[0].get::<Self>().ok()?;
			f(&widget);
			None
		})
	}
}

impl Default for SegmentedProgressWidget {
	fn default() -> Self {
		Self::new(5)
	}
}
