use anyhow::Context;
use clap::Parser;
use segmented_progress::{read_config, Segment, Sequencer, SequencerObserver, SequencerState};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: f64 = 320.0;
const BAR_HEIGHT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
	Start,
	Pause,
	Resume,
	Skip,
	Rewind,
	Cancel,
	Reset,
}

impl FromStr for Command {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"start" => Command::Start,
			"pause" => Command::Pause,
			"resume" => Command::Resume,
			"skip" => Command::Skip,
			"rewind" => Command::Rewind,
			"cancel" => Command::Cancel,
			"reset" => Command::Reset,
			other => return Err(format!("unknown command \"{}\"", other)),
		})
	}
}

fn parse_scheduled(value: &str) -> Result<(Duration, Command), String> {
	let (at, command) = value
		.split_once(':')
		.ok_or_else(|| format!("expected SECONDS:COMMAND, got \"{}\"", value))?;
	let at: f64 = at
		.parse()
		.map_err(|_| format!("\"{}\" is not a number of seconds", at))?;
	let at = Duration::try_from_secs_f64(at).map_err(|_| format!("{} is not a valid time", at))?;
	Ok((at, command.parse()?))
}

/// Plays a segmented progress bar on a simulated frame clock and logs its events.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ArgsTrace {
	/// Use a custom config file instead of looking for one.
	#[arg(long, value_name = "Config File Path")]
	config: Option<PathBuf>,

	/// Number of segments, overrides the config
	#[arg(long, short = 's', value_parser = clap::value_parser!(u32).range(1..))]
	segments: Option<u32>,

	/// Fill duration of one segment in seconds, overrides the config
	#[arg(long, short = 'd', value_name = "SECONDS")]
	duration: Option<f64>,

	/// Simulated frames per second
	#[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=1000))]
	fps: u32,

	/// Runs a command (start, pause, resume, skip, rewind, cancel, reset) at the given time
	#[arg(long = "at", value_name = "SECONDS:COMMAND", value_parser = parse_scheduled)]
	commands: Vec<(Duration, Command)>,
}

/// Logs every notification together with the simulated time it happened at.
struct EventLogger {
	clock: Rc<Cell<Duration>>,
}

impl SequencerObserver for EventLogger {
	fn index_changed(&self, index: usize) {
		info!(at = ?self.clock.get(), index, "index changed");
	}

	fn finished(&self) {
		info!(at = ?self.clock.get(), "finished");
	}
}

fn apply(sequencer: &mut Sequencer, command: Command) {
	match command {
		Command::Start => sequencer.start_animation(BAR_WIDTH, BAR_HEIGHT),
		Command::Pause => sequencer.pause_animation(),
		Command::Resume => sequencer.resume_animation(),
		Command::Skip => sequencer.skip(),
		Command::Rewind => sequencer.rewind(),
		Command::Cancel => sequencer.cancel(),
		Command::Reset => sequencer.reset(),
	}
}

/// Simulated time after which the run gives up, four times what an
/// uninterrupted run takes plus a second.
fn run_limit(segment: Duration, n_segments: usize) -> Duration {
	let n_segments = u32::try_from(n_segments).unwrap_or(u32::MAX);
	segment
		.checked_mul(n_segments)
		.and_then(|total| total.checked_mul(4))
		.and_then(|total| total.checked_add(Duration::from_secs(1)))
		.unwrap_or(Duration::MAX)
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = ArgsTrace::parse();

	let mut config = read_config(args.config.as_deref())
		.context("Failed to parse config file")?
		.bar;
	if let Some(segments) = args.segments {
		config.segments = Some(segments as usize);
	}
	if args.duration.is_some() {
		config.duration = args.duration;
	}
	config.validate()?;

	let mut sequencer = Sequencer::from_config(&config);
	let clock = Rc::new(Cell::new(Duration::ZERO));
	let logger = Rc::new(EventLogger {
		clock: clock.clone(),
	});
	sequencer.set_observer(&logger);

	let frame = Duration::from_secs_f64(1.0 / args.fps as f64);
	let limit = run_limit(config.duration(), config.n_segments());

	let mut commands = args.commands;
	commands.sort_by_key(|(at, _)| *at);
	let mut pending = commands.into_iter().peekable();

	sequencer.start_animation(BAR_WIDTH, BAR_HEIGHT);
	while clock.get() <= limit {
		while let Some((_, command)) = pending.next_if(|(at, _)| *at <= clock.get()) {
			info!(at = ?clock.get(), ?command, "applying command");
			apply(&mut sequencer, command);
		}
		if sequencer.state() == SequencerState::Finished && pending.peek().is_none() {
			break;
		}

		sequencer.tick(frame);
		let Some(now) = clock.get().checked_add(frame) else {
			break;
		};
		clock.set(now);
	}

	let fills: Vec<f64> = sequencer.segments().iter().map(Segment::fill).collect();
	info!(state = ?sequencer.state(), ?fills, "done");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(values: &[&str]) -> Result<ArgsTrace, clap::Error> {
		ArgsTrace::try_parse_from(std::iter::once("segmented-progress-trace").chain(values.iter().copied()))
	}

	#[test]
	fn parses_commands_and_overrides() {
		let parsed = args(&[
			"--segments", "3", "--duration", "1.5", "--at", "0.5:skip", "--at", "2:rewind",
		])
		.unwrap();
		assert_eq!(parsed.segments, Some(3));
		assert_eq!(parsed.duration, Some(1.5));
		assert_eq!(parsed.fps, 60);
		assert_eq!(
			parsed.commands,
			vec![
				(Duration::from_millis(500), Command::Skip),
				(Duration::from_secs(2), Command::Rewind)
			]
		);
	}

	#[test]
	fn rejects_bad_arguments() {
		for bad in [
			vec!["--segments"],
			vec!["--segments", "0"],
			vec!["--config"],
			vec!["--fps", "0"],
			vec!["--at", "1:jump"],
			vec!["--at", "-1:skip"],
			vec!["--at", "skip"],
			vec!["--verbose"],
		] {
			assert!(args(&bad).is_err(), "{bad:?} was accepted");
		}
	}

	#[test]
	fn run_limit_saturates() {
		assert_eq!(run_limit(Duration::from_secs(1), 3), Duration::from_secs(13));
		assert_eq!(run_limit(Duration::MAX, 2), Duration::MAX);
		assert_eq!(run_limit(Duration::from_secs(u64::MAX / 4), usize::MAX), Duration::MAX);
	}
}
