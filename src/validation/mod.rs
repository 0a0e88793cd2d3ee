mod pixel_buffer;
pub use pixel_buffer::*;

mod sampling;
pub use sampling::*;

mod shape;
pub use shape::*;

mod color;
pub use color::*;

mod result;
pub use result::*;

use crate::config::ValidatorConfig;
use crate::engine::RasterError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
	#[error("no reference image is loaded")]
	MissingReference,
	#[error("the player buffer is not initialized")]
	MissingPlayerBuffer,
	#[error("player buffer is {player:?} but reference is {reference:?}")]
	DimensionMismatch {
		player: (u32, u32),
		reference: (u32, u32),
	},
	#[error(transparent)]
	Raster(#[from] RasterError),
}

static_assertions::assert_impl_all!(ValidationError: std::error::Error, Send, Sync);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ShapePolicy {
	#[default]
	AlphaOverlap,
	EdgeOverlap,
}

impl ShapeScoring for ShapePolicy {
	fn name(&self) -> &'static str {
		match self {
			ShapePolicy::AlphaOverlap => AlphaOverlap.name(),
			ShapePolicy::EdgeOverlap => EdgeOverlap.name(),
		}
	}

	fn score_shape(&self, input: &ScoringInput) -> ShapeOutcome {
		match self {
			ShapePolicy::AlphaOverlap => AlphaOverlap.score_shape(input),
			ShapePolicy::EdgeOverlap => EdgeOverlap.score_shape(input),
		}
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ColorPolicy {
	#[default]
	PixelDistance,
	HistogramChiSquare,
}

impl ColorScoring for ColorPolicy {
	fn name(&self) -> &'static str {
		match self {
			ColorPolicy::PixelDistance => PixelDistance.name(),
			ColorPolicy::HistogramChiSquare => HistogramChiSquare.name(),
		}
	}

	fn score_color(&self, input: &ScoringInput) -> Option<f32> {
		match self {
			ColorPolicy::PixelDistance => PixelDistance.score_color(input),
			ColorPolicy::HistogramChiSquare => HistogramChiSquare.score_color(input),
		}
	}
}

/// Which built-in scorers a [`Validator`] uses. Without a color policy the color score is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
	pub shape: ShapePolicy,
	pub color: Option<ColorPolicy>,
}

impl Default for ScoringPolicy {
	fn default() -> Self {
		Self {
			shape: ShapePolicy::default(),
			color: Some(ColorPolicy::default()),
		}
	}
}

/// Everything a scorer reads: the two buffers, which pixels to visit and the thresholds that
/// classify them.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
	pub player: &'a PixelBuffer,
	pub reference: &'a PixelBuffer,
	pub sampling: Sampling,
	pub reference_alpha_threshold: f32,
	pub player_alpha_threshold: f32,
	pub edge_threshold: f32,
	pub outside_penalty_weight: f32,
}

impl<'a> ScoringInput<'a> {
	/// Expects buffers of equal dimensions.
	pub fn new(
		player: &'a PixelBuffer,
		reference: &'a PixelBuffer,
		config: &ValidatorConfig,
	) -> Self {
		let (width, height) = reference.dimensions();
		Self {
			player,
			reference,
			sampling: Sampling::for_dimensions(width, height, config.stride_threshold),
			reference_alpha_threshold: config.reference_alpha_threshold,
			player_alpha_threshold: config.player_alpha_threshold,
			edge_threshold: config.edge_threshold,
			outside_penalty_weight: config.weights.outside_penalty_weight,
		}
	}

	pub fn indices(&self) -> impl Iterator<Item = usize> {
		let (width, height) = self.reference.dimensions();
		self.sampling.indices(width, height)
	}

	/// How many pixels each visited pixel stands for.
	pub fn weight(&self) -> u64 {
		self.sampling.weight()
	}

	pub fn is_reference_opaque(&self, index: usize) -> bool {
		self.reference.texel(index).w > self.reference_alpha_threshold
	}

	pub fn is_player_drawn(&self, index: usize) -> bool {
		self.player.texel(index).w > self.player_alpha_threshold
	}
}

/// Scores a rendered drawing against a reference. Holds no state besides its configuration, so
/// scoring the same buffers twice gives the same result.
#[derive(Debug, Clone, Default)]
pub struct Validator {
	config: ValidatorConfig,
}

impl Validator {
	pub fn new(config: ValidatorConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &ValidatorConfig {
		&self.config
	}

	/// Full entry point: checks that both buffers exist and agree in size, short-circuits to a
	/// zero result for drawings with fewer than `min_point_count` points, then scores with the
	/// configured policy.
	pub fn validate(
		&self,
		player: Option<&PixelBuffer>,
		reference: Option<&PixelBuffer>,
		point_count: usize,
	) -> Result<ValidationResult, ValidationError> {
		let reference = reference.ok_or(ValidationError::MissingReference)?;
		let player = player.ok_or(ValidationError::MissingPlayerBuffer)?;
		check_dimensions(player, reference)?;

		if point_count < self.config.min_point_count {
			tracing::warn!(
				point_count,
				min_point_count = self.config.min_point_count,
				"not enough points to validate"
			);
			return Ok(ValidationResult::zero(self.config.weights.passing_threshold));
		}
		self.score(player, reference)
	}

	pub fn score(
		&self,
		player: &PixelBuffer,
		reference: &PixelBuffer,
	) -> Result<ValidationResult, ValidationError> {
		let policy = self.config.policy;
		self.score_with(
			player,
			reference,
			&policy.shape,
			policy.color.as_ref().map(|c| c as &dyn ColorScoring),
		)
	}

	/// Scores with caller-provided scorers instead of the configured policy.
	pub fn score_with(
		&self,
		player: &PixelBuffer,
		reference: &PixelBuffer,
		shape: &dyn ShapeScoring,
		color: Option<&dyn ColorScoring>,
	) -> Result<ValidationResult, ValidationError> {
		check_dimensions(player, reference)?;
		let input = ScoringInput::new(player, reference, &self.config);
		let outcome = shape.score_shape(&input);
		let color_score = color.and_then(|c| c.score_color(&input));
		let result = ValidationResult::new(outcome, color_score, &self.config.weights);
		tracing::debug!(
			shape = shape.name(),
			color = color.map(|c| c.name()),
			stride = input.sampling.stride(),
			%result,
			"validated"
		);
		Ok(result)
	}
}

fn check_dimensions(player: &PixelBuffer, reference: &PixelBuffer) -> Result<(), ValidationError> {
	if player.same_dimensions(reference) {
		Ok(())
	} else {
		Err(ValidationError::DimensionMismatch {
			player: player.dimensions(),
			reference: reference.dimensions(),
		})
	}
}

/// `numerator / denominator`, or 0 when there is nothing to divide by.
pub(crate) fn ratio(numerator: u64, denominator: u64) -> f32 {
	if denominator == 0 {
		0.0
	} else {
		(numerator as f64 / denominator as f64) as f32
	}
}
