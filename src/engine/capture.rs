use super::{Deferred, Drawing, Smoother};
use crate::config::{BrushConfig, CaptureConfig};
use crate::geom::Point2D;
use std::time::Duration;

pub type PointerId = u64;

/// One input tick from whatever drives capture: touch, mouse, or a replay log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
	pub pointer: PointerId,
	/// Projected world position. `None` when the projection is not available, e.g. no camera yet.
	pub position: Option<Point2D>,
	/// Normalized contact in `[0, 1]`. Buttons map to 0 or 1.
	pub contact: f32,
	pub over_ui: bool,
	pub timestamp: Duration,
}

impl PointerSample {
	pub fn pressed(position: Point2D, timestamp: Duration) -> Self {
		Self {
			pointer: 0,
			position: Some(position),
			contact: 1.0,
			over_ui: false,
			timestamp,
		}
	}

	pub fn released(timestamp: Duration) -> Self {
		Self {
			pointer: 0,
			position: None,
			contact: 0.0,
			over_ui: false,
			timestamp,
		}
	}

	pub fn unprojected(timestamp: Duration) -> Self {
		Self {
			position: None,
			..Self::pressed(Point2D::ZERO, timestamp)
		}
	}

	pub fn with_pointer(self, pointer: PointerId) -> Self {
		Self { pointer, ..self }
	}

	pub fn with_contact(self, contact: f32) -> Self {
		Self { contact, ..self }
	}

	pub fn over_ui(self) -> Self {
		Self {
			over_ui: true,
			..self
		}
	}

	fn finite_position(&self) -> Option<Point2D> {
		self.position.filter(|p| p.is_finite())
	}
}

/// What a single sample did to the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
	/// Dropped: idle without a press, filtered as jitter, unprojected, or from another pointer.
	Ignored,
	Started,
	PointAdded,
	/// The stroke hit its point cap and continues as a new stroke from the same position.
	Split,
	Finished { kept: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Idle,
	Drawing { pointer: PointerId },
}

/// Turns pointer samples into strokes: Idle → Drawing on press, back to Idle on release.
#[derive(Debug, Clone)]
pub struct StrokeCapture {
	config: CaptureConfig,
	drawing: Drawing,
	smoother: Smoother,
	state: State,
	pending_validation: Deferred,
}

impl Default for StrokeCapture {
	fn default() -> Self {
		Self::new(CaptureConfig::default())
	}
}

impl StrokeCapture {
	pub fn new(config: CaptureConfig) -> Self {
		let config = config.sanitized();
		Self {
			drawing: Drawing::new(config.brush),
			smoother: Smoother::new(config.history_size, config.smoothing_factor),
			state: State::Idle,
			pending_validation: Deferred::default(),
			config,
		}
	}

	pub fn config(&self) -> &CaptureConfig {
		&self.config
	}

	pub fn drawing(&self) -> &Drawing {
		&self.drawing
	}

	pub fn is_drawing(&self) -> bool {
		matches!(self.state, State::Drawing { .. })
	}

	/// Applies to strokes started from now on.
	pub fn set_brush(&mut self, brush: BrushConfig) {
		tracing::debug!(thickness = brush.thickness, color = ?brush.color, "brush changed");
		self.config.brush = brush;
		self.drawing.set_brush(brush);
	}

	pub fn handle(&mut self, sample: PointerSample) -> CaptureEvent {
		match self.state {
			State::Idle => self.handle_idle(sample),
			State::Drawing { pointer } if pointer != sample.pointer => CaptureEvent::Ignored,
			State::Drawing { .. } => self.handle_drawing(sample),
		}
	}

	/// Returns true once the post-release debounce has elapsed and validation should run.
	pub fn poll_validation(&mut self, now: Duration) -> bool {
		self.pending_validation.poll(now)
	}

	pub fn validation_pending(&self) -> bool {
		self.pending_validation.is_pending()
	}

	/// Clears every stroke and any pending validation.
	pub fn reset(&mut self) {
		self.drawing.clear();
		self.smoother.clear();
		self.state = State::Idle;
		self.pending_validation.cancel();
		tracing::debug!("drawing cleared");
	}

	fn is_contacting(&self, sample: &PointerSample) -> bool {
		!(sample.contact < self.config.contact_threshold)
	}

	fn handle_idle(&mut self, sample: PointerSample) -> CaptureEvent {
		if !self.is_contacting(&sample) || sample.over_ui {
			return CaptureEvent::Ignored;
		}
		let Some(position) = sample.finite_position() else {
			return CaptureEvent::Ignored;
		};
		if self.pending_validation.cancel() {
			tracing::debug!("new stroke cancelled pending validation");
		}
		self.smoother.reset(position);
		self.drawing.begin(position);
		self.state = State::Drawing {
			pointer: sample.pointer,
		};
		CaptureEvent::Started
	}

	fn handle_drawing(&mut self, sample: PointerSample) -> CaptureEvent {
		if !self.is_contacting(&sample) {
			return self.finish(sample.timestamp);
		}
		let Some(raw) = sample.finite_position() else {
			return CaptureEvent::Ignored;
		};
		let position = self.smoother.smooth(raw);
		let max_points = self.config.max_points_per_line;
		let Some(active) = self.drawing.active_mut() else {
			self.state = State::Idle;
			return CaptureEvent::Ignored;
		};
		let Some(last) = active.last() else {
			return CaptureEvent::Ignored;
		};
		if position == last || position.distance(last) < self.config.min_distance_threshold {
			return CaptureEvent::Ignored;
		}

		active.add_point(position);
		if active.len() < max_points {
			return CaptureEvent::PointAdded;
		}

		self.drawing.finalize();
		self.drawing.begin(position);
		tracing::debug!(
			max_points,
			strokes = self.drawing.stroke_count(),
			"stroke split"
		);
		CaptureEvent::Split
	}

	fn finish(&mut self, now: Duration) -> CaptureEvent {
		self.state = State::Idle;
		self.smoother.clear();
		let kept = self.drawing.finalize();
		if kept {
			self
				.pending_validation
				.schedule(now, self.config.validation_delay);
		}
		tracing::debug!(
			kept,
			strokes = self.drawing.stroke_count(),
			points = self.drawing.total_point_count(),
			"stroke finished"
		);
		CaptureEvent::Finished { kept }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test::*;
	use glam::vec2;
	use itertools::Itertools;

	fn capture(min_distance_threshold: f32, max_points_per_line: usize) -> StrokeCapture {
		StrokeCapture::new(
			CaptureConfig::builder()
				.min_distance_threshold(min_distance_threshold)
				.max_points_per_line(max_points_per_line)
				.build(),
		)
	}

	#[test]
	fn test_jitter_within_threshold_keeps_one_point() {
		let mut capture = capture(0.05, 1000);
		let samples = [
			vec2(0.0, 0.0),
			vec2(0.01, 0.0),
			vec2(0.0, 0.01),
			vec2(-0.01, 0.0),
			vec2(0.01, 0.01),
		];
		for (i, p) in samples.into_iter().enumerate() {
			capture.handle(PointerSample::pressed(p, tick(i)));
		}
		assert_eq!(capture.drawing().active_points().map(<[_]>::len), Some(1));

		// A single-point stroke is discarded and does not trigger validation.
		assert_eq!(
			capture.handle(PointerSample::released(tick(5))),
			CaptureEvent::Finished { kept: false }
		);
		assert!(capture.drawing().is_empty());
		assert!(!capture.validation_pending());
	}

	#[test]
	fn test_long_gesture_is_split() {
		let mut capture = capture(0.01, 1000);
		let events = line_samples(vec2(0.0, 0.0), vec2(150.0, 0.0), 1500)
			.map(|s| capture.handle(s))
			.collect_vec();
		assert_eq!(events.iter().filter(|e| **e == CaptureEvent::Split).count(), 1);
		capture.handle(PointerSample::released(tick(1500)));

		let strokes = capture.drawing().strokes();
		assert_eq!(strokes.len(), 2);
		assert_eq!(strokes[0].len(), 1000);
		// The continuation starts where the first stroke ended.
		assert_eq!(strokes[1].points()[0], *strokes[0].points().last().unwrap());
		assert_eq!(strokes[1].len(), 501);
	}

	#[test]
	fn test_consecutive_points_respect_threshold() {
		fastrand::seed(0x5eed);
		let threshold = 0.05;
		let mut capture = StrokeCapture::new(
			CaptureConfig::builder()
				.min_distance_threshold(threshold)
				.max_points_per_line(64)
				.build(),
		);
		for sample in jittered_circle_samples(vec2(0.0, 0.0), 2.0, 800, 0.02) {
			capture.handle(sample);
		}
		capture.handle(PointerSample::released(tick(800)));

		let strokes = capture.drawing().strokes();
		assert!(strokes.len() > 1);
		for stroke in strokes {
			assert!(stroke.len() <= 64);
			for (a, b) in stroke.points().iter().tuple_windows() {
				assert!(a.distance(*b) >= threshold);
			}
		}
	}

	#[test]
	fn test_press_over_ui_is_ignored() {
		let mut capture = StrokeCapture::default();
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(0.0, 0.0), tick(0)).over_ui()),
			CaptureEvent::Ignored
		);
		assert!(!capture.is_drawing());
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(0.0, 0.0), tick(1))),
			CaptureEvent::Started
		);
		// Once drawing, moving over UI does not interrupt the gesture.
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(1.0, 0.0), tick(2)).over_ui()),
			CaptureEvent::PointAdded
		);
	}

	#[test]
	fn test_unprojected_samples_are_dropped() {
		let mut capture = StrokeCapture::default();
		assert_eq!(capture.handle(PointerSample::unprojected(tick(0))), CaptureEvent::Ignored);
		assert!(!capture.is_drawing());

		capture.handle(PointerSample::pressed(vec2(0.0, 0.0), tick(1)));
		assert_eq!(capture.handle(PointerSample::unprojected(tick(2))), CaptureEvent::Ignored);
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(f32::NAN, 0.0), tick(3))),
			CaptureEvent::Ignored
		);
		assert!(capture.is_drawing());
		assert_eq!(capture.drawing().total_point_count(), 1);
	}

	#[test]
	fn test_only_first_pointer_draws() {
		let mut capture = StrokeCapture::default();
		capture.handle(PointerSample::pressed(vec2(0.0, 0.0), tick(0)).with_pointer(7));
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(1.0, 1.0), tick(1)).with_pointer(8)),
			CaptureEvent::Ignored
		);
		assert_eq!(
			capture.handle(PointerSample::released(tick(2)).with_pointer(8)),
			CaptureEvent::Ignored
		);
		assert!(capture.is_drawing());
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(1.0, 0.0), tick(3)).with_pointer(7)),
			CaptureEvent::PointAdded
		);
	}

	#[test]
	fn test_weak_contact_ends_stroke() {
		let mut capture = StrokeCapture::default();
		capture.handle(PointerSample::pressed(vec2(0.0, 0.0), tick(0)));
		capture.handle(PointerSample::pressed(vec2(1.0, 0.0), tick(1)));
		assert_eq!(
			capture.handle(PointerSample::pressed(vec2(2.0, 0.0), tick(2)).with_contact(0.4)),
			CaptureEvent::Finished { kept: true }
		);
		assert!(!capture.is_drawing());
		assert_eq!(capture.drawing().stroke_count(), 1);
	}

	#[test]
	fn test_validation_is_debounced_and_cancellable() {
		let mut capture = StrokeCapture::default();
		for sample in line_samples(vec2(0.0, 0.0), vec2(1.0, 0.0), 10) {
			capture.handle(sample);
		}
		capture.handle(PointerSample::released(tick(10)));
		assert!(capture.validation_pending());
		assert!(!capture.poll_validation(tick(10) + Duration::from_millis(299)));
		assert!(capture.poll_validation(tick(10) + Duration::from_millis(300)));
		assert!(!capture.poll_validation(tick(10) + Duration::from_secs(1)));

		capture.handle(PointerSample::pressed(vec2(0.0, 1.0), tick(20)));
		capture.handle(PointerSample::pressed(vec2(1.0, 1.0), tick(21)));
		capture.handle(PointerSample::released(tick(22)));
		assert!(capture.validation_pending());
		// Starting another stroke before the debounce elapses cancels it.
		capture.handle(PointerSample::pressed(vec2(0.0, 2.0), tick(23)));
		assert!(!capture.validation_pending());
		assert!(!capture.poll_validation(Duration::from_secs(60)));
	}

	#[test]
	fn test_reset() {
		let mut capture = StrokeCapture::default();
		capture.handle(PointerSample::pressed(vec2(0.0, 0.0), tick(0)));
		capture.handle(PointerSample::pressed(vec2(1.0, 0.0), tick(1)));
		capture.handle(PointerSample::released(tick(2)));
		capture.handle(PointerSample::pressed(vec2(0.0, 1.0), tick(3)));
		capture.reset();
		assert!(capture.drawing().is_empty());
		assert!(!capture.is_drawing());
		assert!(!capture.validation_pending());
	}
}
