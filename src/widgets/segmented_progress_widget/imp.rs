use std::{
	cell::{Cell, RefCell},
	collections::VecDeque,
	rc::Rc,
	sync::OnceLock,
};

use gtk::{
	gdk, graphene, gsk,
	glib::{self, subclass::Signal, Properties},
	prelude::*,
	subclass::prelude::*,
};

use crate::{
	animation::FrameDelta,
	config::{duration_from_secs, DEFAULT_DURATION_SECS},
	layout::Rect,
	sequencer::{Sequencer, SequencerObserver, SequencerState},
	style::{BarStyle, Rgba, DEFAULT_PADDING},
};

const SEGMENT_HEIGHT: i32 = 4;
const MIN_SEGMENT_WIDTH: i32 = 1;

pub(super) fn rgba_to_gdk(color: &Rgba) -> gdk::RGBA {
	gdk::RGBA::new(color.red, color.green, color.blue, color.alpha)
}

fn rgba_from_gdk(color: &gdk::RGBA) -> Rgba {
	Rgba::new(color.red(), color.green(), color.blue(), color.alpha())
}

fn to_graphene(rect: &Rect) -> graphene::Rect {
	graphene::Rect::new(
		rect.x as f32,
		rect.y as f32,
		rect.width as f32,
		rect.height as f32,
	)
}

#[derive(Debug)]
enum SequencerEvent {
	IndexChanged(usize),
	Finished,
}

/// Collects notifications while the sequencer is borrowed, so that signal
/// handlers are free to call back into the widget.
#[derive(Debug, Default)]
struct EventQueue(RefCell<VecDeque<SequencerEvent>>);

impl SequencerObserver for EventQueue {
	fn index_changed(&self, index: usize) {
		self.0
			.borrow_mut()
			.push_back(SequencerEvent::IndexChanged(index));
	}

	fn finished(&self) {
		self.0.borrow_mut().push_back(SequencerEvent::Finished);
	}
}

#[derive(Properties, Debug)]
#[properties(wrapper_type = super::SegmentedProgressWidget)]
pub struct SegmentedProgressWidget {
	#[property(get, construct_only, minimum = 1, default = 5)]
	n_segments: Cell<u32>,

	/// Fill duration of one segment in seconds
	#[property(get, set = Self::set_duration, minimum = 0.0, default = DEFAULT_DURATION_SECS)]
	duration: Cell<f64>,

	#[property(get, set = Self::set_padding, minimum = 0.0, default = DEFAULT_PADDING)]
	padding: Cell<f64>,

	#[property(get, set = Self::set_fill_color)]
	fill_color: RefCell<gdk::RGBA>,

	#[property(get, set = Self::set_track_color)]
	track_color: RefCell<gdk::RGBA>,

	sequencer: RefCell<Option<Sequencer>>,
	events: Rc<EventQueue>,
	allocated_size: Cell<(i32, i32)>,
	/// Only installed while a segment is animating
	tick_id: RefCell<Option<gtk::TickCallbackId>>,
	frames: Cell<FrameDelta>,
	in_tick: Cell<bool>,
}

impl Default for SegmentedProgressWidget {
	fn default() -> Self {
		let style = BarStyle::default();
		Self {
			n_segments: Cell::new(5),
			duration: Cell::new(DEFAULT_DURATION_SECS),
			padding: Cell::new(style.padding),
			fill_color: RefCell::new(rgba_to_gdk(&style.fill_color)),
			track_color: RefCell::new(rgba_to_gdk(&style.track_color)),
			sequencer: RefCell::new(None),
			events: Rc::new(EventQueue::default()),
			allocated_size: Cell::new((0, 0)),
			tick_id: RefCell::new(None),
			frames: Cell::new(FrameDelta::default()),
			in_tick: Cell::new(false),
		}
	}
}

impl SegmentedProgressWidget {
	fn set_duration(&self, seconds: f64) {
		self.duration.set(seconds);
		if let Some(sequencer) = self.sequencer.borrow_mut().as_mut() {
			sequencer.set_duration(duration_from_secs(seconds));
		}
	}

	fn set_padding(&self, padding: f64) {
		self.padding.set(padding);
		if let Some(sequencer) = self.sequencer.borrow_mut().as_mut() {
			sequencer.set_padding(padding);
		}
		self.obj().queue_resize();
	}

	fn set_fill_color(&self, color: gdk::RGBA) {
		if let Some(sequencer) = self.sequencer.borrow_mut().as_mut() {
			sequencer.set_fill_color(rgba_from_gdk(&color));
		}
		*self.fill_color.borrow_mut() = color;
		self.obj().queue_draw();
	}

	fn set_track_color(&self, color: gdk::RGBA) {
		if let Some(sequencer) = self.sequencer.borrow_mut().as_mut() {
			sequencer.set_track_color(rgba_from_gdk(&color));
		}
		*self.track_color.borrow_mut() = color;
		self.obj().queue_draw();
	}

	pub(super) fn start_animation(&self) {
		let (width, height) = self.allocated_size.get();
		self.with_sequencer(|sequencer| sequencer.start_animation(width as f64, height as f64));
	}

	pub(super) fn pause_animation(&self) {
		self.with_sequencer(Sequencer::pause_animation);
	}

	pub(super) fn resume_animation(&self) {
		self.with_sequencer(Sequencer::resume_animation);
	}

	pub(super) fn skip(&self) {
		self.with_sequencer(Sequencer::skip);
	}

	pub(super) fn rewind(&self) {
		self.with_sequencer(Sequencer::rewind);
	}

	pub(super) fn cancel(&self) {
		self.with_sequencer(Sequencer::cancel);
	}

	pub(super) fn reset(&self) {
		self.with_sequencer(Sequencer::reset);
	}

	pub(super) fn current_index(&self) -> u32 {
		self.sequencer
			.borrow()
			.as_ref()
			.map_or(0, |sequencer| sequencer.current_index() as u32)
	}

	pub(super) fn state(&self) -> SequencerState {
		self.sequencer
			.borrow()
			.as_ref()
			.map_or(SequencerState::Idle, Sequencer::state)
	}

	fn is_animating(&self) -> bool {
		self.sequencer
			.borrow()
			.as_ref()
			.is_some_and(Sequencer::is_animating)
	}

	/// Runs `f` on the sequencer, then repaints and emits the signals for
	/// whatever happened in between.
	fn with_sequencer<F: FnOnce(&mut Sequencer)>(&self, f: F) {
		{
			let mut sequencer = self.sequencer.borrow_mut();
			let Some(sequencer) = sequencer.as_mut() else {
				return;
			};
			f(sequencer);
		}
		self.obj().queue_draw();
		self.flush_events();
		self.update_ticking();
	}

	/// Installs the tick callback when a segment starts animating and removes
	/// it once nothing animates anymore.
	fn update_ticking(&self) {
		// The tick callback decides for itself when it is running
		if self.in_tick.get() {
			return;
		}

		let animating = self.is_animating();
		let mut tick_id = self.tick_id.borrow_mut();
		if animating && tick_id.is_none() {
			let mut frames = self.frames.get();
			frames.reset();
			self.frames.set(frames);
			*tick_id = Some(self.obj().add_tick_callback(|widget, frame_clock| {
				widget.imp().on_tick(frame_clock.frame_time())
			}));
		} else if !animating {
			if let Some(tick_id) = tick_id.take() {
				tick_id.remove();
			}
		}
	}

	fn on_tick(&self, frame_time: i64) -> glib::ControlFlow {
		let mut frames = self.frames.get();
		let dt = frames.sample(frame_time);
		self.frames.set(frames);

		if let Some(dt) = dt {
			self.in_tick.set(true);
			self.with_sequencer(|sequencer| sequencer.tick(dt));
			self.in_tick.set(false);
		}

		if self.is_animating() {
			glib::ControlFlow::Continue
		} else {
			// Returning Break removes the callback
			self.tick_id.take();
			glib::ControlFlow::Break
		}
	}

	fn flush_events(&self) {
		let obj = self.obj();
		loop {
			let event = self.events.0.borrow_mut().pop_front();
			match event {
				Some(SequencerEvent::IndexChanged(index)) => {
					obj.update_property(&[gtk::accessible::Property::ValueNow(index as f64)]);
					obj.emit_by_name::<()>("index-changed", &[&(index as u32)]);
				}
				Some(SequencerEvent::Finished) => {
					obj.update_property(&[gtk::accessible::Property::ValueNow(
						self.n_segments.get() as f64,
					)]);
					obj.emit_by_name::<()>("finished", &[]);
				}
				None => break,
			}
		}
	}
}

#[glib::object_subclass]
impl ObjectSubclass for SegmentedProgressWidget {
	const NAME: &'static str = "SegmentedProgressWidget";
	type Type = super::SegmentedProgressWidget;
	type ParentType = gtk::Widget;

	fn class_init(klass: &mut Self::Class) {
		klass.set_css_name("segmentedprogress");
		klass.set_accessible_role(gtk::AccessibleRole::ProgressBar);
	}
}

#[glib::derived_properties]
impl ObjectImpl for SegmentedProgressWidget {
	fn signals() -> &'static [Signal] {
		static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
		SIGNALS.get_or_init(|| {
			vec![
				Signal::builder("index-changed")
					.param_types([u32::static_type()])
					.build(),
				Signal::builder("finished").build(),
			]
		})
	}

	fn constructed(&self) {
		self.parent_constructed();

		let n_segments = self.n_segments.get().max(1);
		let style = BarStyle {
			fill_color: rgba_from_gdk(&self.fill_color.borrow()),
			track_color: rgba_from_gdk(&self.track_color.borrow()),
			padding: self.padding.get(),
		};
		let duration = duration_from_secs(self.duration.get());

		let mut sequencer = Sequencer::with_style(n_segments as usize, duration, style);
		sequencer.set_observer(&self.events);
		self.sequencer.replace(Some(sequencer));

		self.obj().update_property(&[
			gtk::accessible::Property::ValueMin(0_f64),
			gtk::accessible::Property::ValueMax(n_segments as f64),
			gtk::accessible::Property::ValueNow(0_f64),
		]);
	}

	fn dispose(&self) {
		if let Some(tick_id) = self.tick_id.take() {
			tick_id.remove();
		}

		if let Some(sequencer) = self.sequencer.borrow_mut().as_mut() {
			sequencer.clear_observer();
		}
	}
}

impl WidgetImpl for SegmentedProgressWidget {
	fn measure(&self, orientation: gtk::Orientation, _for_size: i32) -> (i32, i32, i32, i32) {
		let n_segments = self.n_segments.get().max(1) as i32;
		match orientation {
			gtk::Orientation::Horizontal => {
				let gaps = (self.padding.get() * (n_segments - 1) as f64).ceil() as i32;
				let minimum = gaps + n_segments * MIN_SEGMENT_WIDTH;
				(minimum, minimum, -1, -1)
			}
			_ => (SEGMENT_HEIGHT, SEGMENT_HEIGHT, -1, -1),
		}
	}

	fn size_allocate(&self, width: i32, height: i32, _baseline: i32) {
		if let Some(sequencer) = self.sequencer.borrow_mut().as_mut() {
			if self.allocated_size.replace((width, height)) != (width, height) {
				sequencer.invalidate_layout();
			}
			sequencer.ensure_layout(width as f64, height as f64);
		}
		self.obj().queue_draw();
	}

	fn unmap(&self) {
		self.parent_unmap();
		// Time spent hidden does not count towards the fill
		let mut frames = self.frames.get();
		frames.reset();
		self.frames.set(frames);
	}

	fn snapshot(&self, snapshot: &gtk::Snapshot) {
		let sequencer = self.sequencer.borrow();
		let Some(sequencer) = sequencer.as_ref() else {
			return;
		};
		let Some(layout) = sequencer.layout() else {
			return;
		};

		let style = sequencer.style();
		let fill_color = rgba_to_gdk(&style.fill_color);
		let track_color = rgba_to_gdk(&style.track_color);
		let radius = layout.corner_radius() as f32;

		for (index, segment) in sequencer.segments().iter().enumerate() {
			let Some(frame) = layout.frame(index) else {
				continue;
			};
			if frame.width <= 0.0 || frame.height <= 0.0 {
				continue;
			}

			// Track and fill share the rounded outline of the segment
			let bounds = to_graphene(&frame);
			snapshot.push_rounded_clip(&gsk::RoundedRect::from_rect(bounds, radius));
			snapshot.append_color(&track_color, &bounds);
			if let Some(filled) = layout.fill_frame(index, segment.fill()) {
				if filled.width > 0.0 {
					snapshot.append_color(&fill_color, &to_graphene(&filled));
				}
			}
			snapshot.pop();
		}
	}
}
