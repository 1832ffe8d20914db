/// An axis aligned rectangle in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

/// Geometry of every segment of a bar, computed for one bar size.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
	frames: Vec<Rect>,
	segment_width: f64,
	corner_radius: f64,
}

impl BarLayout {
	/// Splits `width` into `n_segments` equal slots separated by `padding`.
	pub fn compute(width: f64, height: f64, padding: f64, n_segments: usize) -> Self {
		let n = n_segments.max(1);
		let padding = padding.max(0.0);
		let segment_width = ((width - padding * (n - 1) as f64) / n as f64).max(0.0);
		let height = height.max(0.0);

		let frames = (0..n)
			.map(|i| Rect {
				x: i as f64 * (segment_width + padding),
				y: 0.0,
				width: segment_width,
				height,
			})
			.collect();

		Self {
			frames,
			segment_width,
			corner_radius: height / 2.0,
		}
	}

	pub fn frames(&self) -> &[Rect] {
		&self.frames
	}

	pub fn frame(&self, index: usize) -> Option<Rect> {
		self.frames.get(index).copied()
	}

	/// The filled part of segment `index` for a fill `fraction`.
	pub fn fill_frame(&self, index: usize, fraction: f64) -> Option<Rect> {
		self.frame(index).map(|frame| Rect {
			width: frame.width * fraction.clamp(0.0, 1.0),
			..frame
		})
	}

	pub fn segment_width(&self) -> f64 {
		self.segment_width
	}

	pub fn corner_radius(&self) -> f64 {
		self.corner_radius
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_width_between_segments() {
		let layout = BarLayout::compute(108.0, 6.0, 4.0, 3);
		assert!((layout.segment_width() - 100.0 / 3.0).abs() < 1e-9);
		let xs: Vec<f64> = layout.frames().iter().map(|f| f.x).collect();
		assert!((xs[1] - 37.333333333).abs() < 1e-6);
		assert!((xs[2] - 74.666666666).abs() < 1e-6);

		let last = layout.frame(2).unwrap();
		assert!((last.x + last.width - 108.0).abs() < 1e-9);
		assert_eq!(layout.corner_radius(), 3.0);
	}

	#[test]
	fn single_segment_spans_everything() {
		let layout = BarLayout::compute(50.0, 2.0, 4.0, 1);
		assert_eq!(
			layout.frames(),
			&[Rect {
				x: 0.0,
				y: 0.0,
				width: 50.0,
				height: 2.0
			}]
		);
	}

	#[test]
	fn narrow_bars_clamp_to_zero_width() {
		let layout = BarLayout::compute(4.0, 2.0, 4.0, 5);
		assert!(layout.frames().iter().all(|f| f.width == 0.0));
		assert_eq!(layout.frame(4).unwrap().x, 16.0);
	}

	#[test]
	fn fill_frame_scales_width() {
		let layout = BarLayout::compute(100.0, 4.0, 0.0, 2);
		assert_eq!(layout.fill_frame(1, 0.5).unwrap().width, 25.0);
		assert_eq!(layout.fill_frame(1, 2.0).unwrap().width, 50.0);
		assert_eq!(layout.fill_frame(0, -1.0).unwrap().width, 0.0);
		assert_eq!(layout.fill_frame(2, 1.0), None);
	}
}
