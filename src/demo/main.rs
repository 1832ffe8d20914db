#[macro_use]
extern crate shrinkwraprs;

#[macro_use]
extern crate cascade;

use anyhow::{bail, Context};
use clap::Parser;
use gtk::{
	gdk,
	gio::ApplicationFlags,
	glib::{self, clone},
	prelude::*,
};
use segmented_progress::{
	read_config, widgets::SegmentedProgressWidget, BarConfig, SequencerState,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const APPLICATION_NAME: &str = "org.segmentedprogress.Demo";

/// Shows a segmented progress bar. Space pauses, arrows skip and rewind,
/// Escape cancels, r restarts and q quits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ArgsDemo {
	/// Use a custom config file instead of looking for one.
	#[arg(long, value_name = "Config File Path")]
	config: Option<PathBuf>,

	/// Number of segments, overrides the config
	#[arg(long, short = 's', value_parser = clap::value_parser!(u32).range(1..))]
	segments: Option<u32>,

	/// Fill duration of one segment in seconds, overrides the config
	#[arg(long, short = 'd', value_name = "SECONDS")]
	duration: Option<f64>,
}

/// A window showing one bar and the index of its active segment.
#[derive(Clone, Shrinkwrap)]
struct DemoWindow {
	#[shrinkwrap(main_field)]
	window: gtk::ApplicationWindow,
	bar: SegmentedProgressWidget,
	label: gtk::Label,
}

impl DemoWindow {
	fn new(app: &gtk::Application, config: &BarConfig) -> Self {
		let window = cascade! {
			gtk::ApplicationWindow::new(app);
			..set_title(Some("Segmented progress"));
			..set_default_size(480, 120);
		};

		let bar = cascade! {
			SegmentedProgressWidget::from_config(config);
			..set_valign(gtk::Align::Center);
			..set_hexpand(true);
		};

		let label = cascade! {
			gtk::Label::new(Some("Segment 1"));
			..set_halign(gtk::Align::Center);
			..add_css_class("title-4");
		};

		let container = cascade! {
			gtk::Box::new(gtk::Orientation::Vertical, 12);
			..set_margin_top(24);
			..set_margin_bottom(24);
			..set_margin_start(24);
			..set_margin_end(24);
			..append(&bar);
			..append(&label);
		};
		window.set_child(Some(&container));

		let demo = Self { window, bar, label };
		demo.connect_signals();
		demo
	}

	fn connect_signals(&self) {
		self.bar.connect_index_changed(clone!(
			#[weak(rename_to = label)]
			self.label,
			move |_, index| {
				info!(index, "segment changed");
				label.set_text(&format!("Segment {}", index + 1));
			}
		));
		self.bar.connect_finished(clone!(
			#[weak(rename_to = label)]
			self.label,
			move |_| {
				info!("all segments finished");
				label.set_text("Finished");
			}
		));

		// Start once the bar is on screen
		self.window.connect_map(clone!(
			#[weak(rename_to = bar)]
			self.bar,
			move |_| bar.start_animation()
		));

		let controller = gtk::EventControllerKey::new();
		controller.connect_key_pressed(clone!(
			#[weak(rename_to = bar)]
			self.bar,
			#[weak(rename_to = window)]
			self.window,
			#[upgrade_or]
			glib::Propagation::Proceed,
			move |_, key, _, _| {
				match key {
					gdk::Key::space => match bar.state() {
						SequencerState::Paused(_) => bar.resume_animation(),
						_ => bar.pause_animation(),
					},
					gdk::Key::Right => bar.skip(),
					gdk::Key::Left => bar.rewind(),
					gdk::Key::Escape => bar.cancel(),
					gdk::Key::r => {
						bar.reset();
						bar.start_animation();
					}
					gdk::Key::q => window.close(),
					_ => return glib::Propagation::Proceed,
				}
				glib::Propagation::Stop
			}
		));
		self.window.add_controller(controller);
	}
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = ArgsDemo::parse();

	// Parse Config
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

	if gtk::init().is_err() {
		bail!("failed to initialize GTK Application");
	}

	let app = gtk::Application::new(Some(APPLICATION_NAME), ApplicationFlags::FLAGS_NONE);
	app.connect_activate(move |app| {
		let window = DemoWindow::new(app, &config);
		window.present();
	});

	// Arguments were handled above, GTK does not get to see them
	if app.run_with_args::<&str>(&[]) != glib::ExitCode::SUCCESS {
		bail!("application exited with an error");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_flag_needs_its_value() {
		for flag in ["--config", "--segments", "--duration"] {
			assert!(
				ArgsDemo::try_parse_from(["segmented-progress-demo", flag]).is_err(),
				"{flag} without a value was accepted"
			);
		}
		let args = ArgsDemo::try_parse_from(["segmented-progress-demo", "--config", "bar.toml", "-s", "3"]).unwrap();
		assert_eq!(args.config, Some(PathBuf::from("bar.toml")));
		assert_eq!(args.segments, Some(3));
	}
}
