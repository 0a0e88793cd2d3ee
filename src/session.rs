use crate::config::{BrushConfig, ValidatorConfig};
use crate::engine::{CaptureEvent, CpuRasterizer, Drawing, PointerSample, Rasterizer, StrokeCapture};
use crate::util::{ResultExt, SnapshotSink};
use crate::validation::{PixelBuffer, ValidationError, ValidationResult, Validator};
use std::sync::mpsc;
use std::time::Duration;

pub type Observer = Box<dyn FnMut(&ValidationResult)>;

/// One tracing exercise: captures strokes, renders them into the player buffer and scores that
/// against the reference once the post-release debounce elapses.
///
/// The host drives it with [`TraceSession::handle`] for every input sample and
/// [`TraceSession::tick`] once per frame.
pub struct TraceSession<R = CpuRasterizer> {
	capture: StrokeCapture,
	validator: Validator,
	rasterizer: R,
	player: Option<PixelBuffer>,
	reference: Option<PixelBuffer>,
	current: ValidationResult,
	last_error: Option<ValidationError>,
	observers: Vec<Observer>,
}

impl<R: Rasterizer> TraceSession<R> {
	/// Allocates a square player buffer at the validator's resolution.
	pub fn new(capture: StrokeCapture, validator: Validator, rasterizer: R) -> Self {
		let resolution = validator.config().resolution;
		let player = PixelBuffer::new(resolution, resolution).ok_or_log();
		let current = ValidationResult::zero(validator.config().weights.passing_threshold);
		Self {
			capture,
			validator,
			rasterizer,
			player,
			reference: None,
			current,
			last_error: None,
			observers: Vec::new(),
		}
	}

	pub fn with_config(capture: StrokeCapture, config: ValidatorConfig, rasterizer: R) -> Self {
		Self::new(capture, Validator::new(config), rasterizer)
	}

	pub fn capture(&self) -> &StrokeCapture {
		&self.capture
	}

	pub fn drawing(&self) -> &Drawing {
		self.capture.drawing()
	}

	pub fn validator(&self) -> &Validator {
		&self.validator
	}

	pub fn reference(&self) -> Option<&PixelBuffer> {
		self.reference.as_ref()
	}

	pub fn player(&self) -> Option<&PixelBuffer> {
		self.player.as_ref()
	}

	pub fn set_reference(&mut self, reference: PixelBuffer) {
		tracing::debug!(dimensions = ?reference.dimensions(), "reference set");
		self.reference = Some(reference);
	}

	pub fn clear_reference(&mut self) {
		self.reference = None;
	}

	pub fn set_brush(&mut self, brush: BrushConfig) {
		self.capture.set_brush(brush);
	}

	pub fn handle(&mut self, sample: PointerSample) -> CaptureEvent {
		self.capture.handle(sample)
	}

	/// Runs validation if the debounce has elapsed by `now`.
	pub fn tick(&mut self, now: Duration) -> Option<ValidationResult> {
		self.capture
			.poll_validation(now)
			.then(|| self.validate_now())
	}

	/// Renders and scores immediately. Failures are logged, recorded in
	/// [`TraceSession::last_error`] and reported as a zero result.
	pub fn validate_now(&mut self) -> ValidationResult {
		let outcome = self.render_and_validate();
		self.last_error = outcome.as_ref().err().cloned();
		let result = outcome.ok_or_log().unwrap_or_else(|| {
			ValidationResult::zero(self.validator.config().weights.passing_threshold)
		});
		tracing::info!(
			%result,
			quality = %result.quality(),
			passing = result.is_passing(),
			"validation complete"
		);
		self.current = result;
		for observer in &mut self.observers {
			observer(&result);
		}
		result
	}

	fn render_and_validate(&mut self) -> Result<ValidationResult, ValidationError> {
		let reference = self
			.reference
			.as_ref()
			.ok_or(ValidationError::MissingReference)?;
		let player = self
			.player
			.as_mut()
			.ok_or(ValidationError::MissingPlayerBuffer)?;
		self.rasterizer.render(self.capture.drawing(), player)?;
		self.validator.validate(
			Some(&*player),
			Some(reference),
			self.capture.drawing().total_point_count(),
		)
	}

	/// Registers a callback invoked with every completed result.
	pub fn subscribe(&mut self, observer: impl FnMut(&ValidationResult) + 'static) {
		self.observers.push(Box::new(observer));
	}

	/// Like [`TraceSession::subscribe`], but results are delivered to a channel the caller polls.
	pub fn subscribe_channel(&mut self) -> mpsc::Receiver<ValidationResult> {
		let (sender, receiver) = mpsc::channel();
		self.subscribe(move |result| {
			// A dropped receiver only means nobody is listening anymore.
			let _ = sender.send(*result);
		});
		receiver
	}

	pub fn current_result(&self) -> &ValidationResult {
		&self.current
	}

	pub fn last_error(&self) -> Option<&ValidationError> {
		self.last_error.as_ref()
	}

	/// Clears the drawing, any pending validation and the current result.
	pub fn reset(&mut self) {
		self.capture.reset();
		self.current = ValidationResult::zero(self.validator.config().weights.passing_threshold);
		self.last_error = None;
		if let Some(player) = &mut self.player {
			player.clear();
		}
	}

	/// Hands the player and reference buffers to `sink`, skipping any that do not exist.
	pub fn snapshot(&self, sink: &mut impl SnapshotSink) {
		if let Some(player) = &self.player {
			sink.receive("player", player);
		}
		if let Some(reference) = &self.reference {
			sink.receive("reference", reference);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geom::AABox;
	use crate::test::*;
	use approx::assert_abs_diff_eq;
	use glam::{vec2, Vec2, Vec4};
	use std::cell::RefCell;
	use std::rc::Rc;

	fn session(resolution: u32) -> TraceSession {
		TraceSession::with_config(
			StrokeCapture::default(),
			ValidatorConfig::builder().resolution(resolution).build(),
			CpuRasterizer::new(AABox::new(Vec2::ZERO, vec2(10.0, 10.0))),
		)
	}

	fn draw_line(session: &mut TraceSession) {
		for sample in line_samples(vec2(1.0, 5.0), vec2(9.0, 5.0), 20) {
			session.handle(sample);
		}
		session.handle(PointerSample::released(tick(20)));
	}

	#[test]
	fn test_validates_after_debounce() {
		let mut session = session(32);
		session.set_reference(square(32, 4, 28, Vec4::ONE));
		let results = Rc::new(RefCell::new(Vec::new()));
		session.subscribe({
			let results = results.clone();
			move |result| results.borrow_mut().push(*result)
		});

		draw_line(&mut session);
		assert_eq!(session.tick(tick(20)), None);
		let result = session.tick(tick(20) + Duration::from_millis(300)).unwrap();
		assert!(result.final_score() > 0.0);
		assert_eq!(session.current_result(), &result);
		assert_eq!(results.borrow().as_slice(), &[result]);
		assert!(session.last_error().is_none());
		assert_eq!(session.tick(Duration::from_secs(10)), None);
	}

	#[test]
	fn test_missing_reference_reports_zero() {
		let mut session = session(16);
		let receiver = session.subscribe_channel();
		draw_line(&mut session);
		let result = session.validate_now();
		assert_eq!(result, ValidationResult::default());
		assert_eq!(session.last_error(), Some(&ValidationError::MissingReference));
		assert_eq!(receiver.try_recv(), Ok(result));
	}

	#[test]
	fn test_uninitialized_player_buffer() {
		let mut session = session(0);
		session.set_reference(square(16, 4, 12, Vec4::ONE));
		assert!(session.player().is_none());
		session.validate_now();
		assert_eq!(session.last_error(), Some(&ValidationError::MissingPlayerBuffer));
	}

	#[test]
	fn test_reference_dimension_mismatch() {
		let mut session = session(16);
		session.set_reference(transparent(32));
		draw_line(&mut session);
		session.validate_now();
		assert!(matches!(
			session.last_error(),
			Some(ValidationError::DimensionMismatch { .. })
		));
	}

	#[test]
	fn test_reset() {
		let mut session = session(16);
		session.set_reference(square(16, 0, 16, Vec4::ONE));
		draw_line(&mut session);
		let result = session.validate_now();
		assert!(result.final_score() > 0.0);

		session.reset();
		assert!(session.drawing().is_empty());
		assert_abs_diff_eq!(session.current_result().final_score(), 0.0);
		assert!(session
			.player()
			.unwrap()
			.pixels()
			.iter()
			.all(|p| *p == Vec4::ZERO));
		assert_eq!(session.tick(Duration::from_secs(60)), None);
	}

	#[test]
	fn test_snapshot() {
		let mut session = session(16);
		let mut sink: Vec<(String, PixelBuffer)> = Vec::new();
		session.snapshot(&mut sink);
		assert_eq!(sink.len(), 1);
		session.set_reference(transparent(16));
		session.snapshot(&mut sink);
		assert_eq!(
			sink.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>(),
			vec!["player", "player", "reference"]
		);
	}
}
