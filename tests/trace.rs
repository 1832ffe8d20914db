use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use segmented_progress::{
	AnimationPosition, Config, Easing, Sequencer, SequencerObserver, SequencerState,
};

const FRAME: Duration = Duration::from_millis(10);

#[derive(Default)]
struct Log(RefCell<Vec<String>>);

impl SequencerObserver for Log {
	fn index_changed(&self, index: usize) {
		self.0.borrow_mut().push(format!("index {}", index));
	}

	fn finished(&self) {
		self.0.borrow_mut().push("finished".to_owned());
	}
}

fn run_frames(sequencer: &mut Sequencer, frames: u32) {
	for _ in 0..frames {
		sequencer.tick(FRAME);
	}
}

#[test]
fn three_segment_story() {
	let config = Config::from_toml("[bar]\nsegments = 3\nduration = 1.0").unwrap();
	let mut sequencer = Sequencer::from_config(&config.bar);
	let log = Rc::new(Log::default());
	sequencer.set_observer(&log);

	sequencer.start_animation(320.0, 4.0);
	run_frames(&mut sequencer, 100);
	assert_eq!(sequencer.state(), SequencerState::Animating(1));

	run_frames(&mut sequencer, 30);
	let superseded = sequencer.active_handle().unwrap();
	sequencer.skip();
	assert_eq!(sequencer.fill(1), Some(1.0));
	sequencer.finish_animation(superseded, AnimationPosition::End);

	run_frames(&mut sequencer, 100);
	assert_eq!(sequencer.state(), SequencerState::Finished);
	run_frames(&mut sequencer, 100);

	assert_eq!(
		log.0.borrow().as_slice(),
		["index 1", "index 2", "finished"]
	);
	assert!(sequencer.segments().iter().all(|segment| segment.is_full()));
}

#[test]
fn paused_story_holds_its_place() {
	let mut sequencer = Sequencer::new(2, Duration::from_secs(1));
	sequencer.set_easing(Easing::Linear);
	let log = Rc::new(Log::default());
	sequencer.set_observer(&log);

	sequencer.start_animation(320.0, 4.0);
	run_frames(&mut sequencer, 40);
	sequencer.pause_animation();
	run_frames(&mut sequencer, 500);
	assert!((sequencer.fill(0).unwrap() - 0.4).abs() < 1e-6);
	assert!(log.0.borrow().is_empty());

	sequencer.resume_animation();
	run_frames(&mut sequencer, 60);
	assert_eq!(log.0.borrow().as_slice(), ["index 1"]);
}

#[test]
fn rewinding_and_cancelling() {
	let mut sequencer = Sequencer::new(3, Duration::from_secs(1));
	let log = Rc::new(Log::default());
	sequencer.set_observer(&log);

	sequencer.start_animation(320.0, 4.0);
	sequencer.skip();
	sequencer.skip();
	run_frames(&mut sequencer, 50);
	sequencer.rewind();
	assert_eq!(sequencer.state(), SequencerState::Animating(1));
	assert_eq!(sequencer.fill(0), Some(1.0));
	assert_eq!(sequencer.fill(1), Some(0.0));
	assert_eq!(sequencer.fill(2), Some(0.0));

	sequencer.cancel();
	run_frames(&mut sequencer, 500);
	assert_eq!(sequencer.state(), SequencerState::Idle);
	assert!(sequencer.segments().iter().all(|segment| segment.is_empty()));
	assert_eq!(
		log.0.borrow().as_slice(),
		["index 1", "index 2", "index 1"]
	);
}
