use super::ShapeOutcome;
use crate::config::ScoringWeights;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum QualityTier {
	Poor,
	Fair,
	Good,
	Excellent,
}

impl QualityTier {
	pub fn from_score(score: f32) -> Self {
		match score {
			s if s >= 0.9 => QualityTier::Excellent,
			s if s >= 0.7 => QualityTier::Good,
			s if s >= 0.5 => QualityTier::Fair,
			_ => QualityTier::Poor,
		}
	}
}

/// Outcome of one validation run. Every score lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationResult {
	shape_score: f32,
	color_score: Option<f32>,
	final_score: f32,
	coverage: f32,
	accuracy: f32,
	outside_penalty: f32,
	correct_pixel_count: u64,
	incorrect_pixel_count: u64,
	total_reference_pixels: u64,
	total_player_pixels: u64,
	passing_threshold: f32,
}

impl Default for ValidationResult {
	fn default() -> Self {
		Self::zero(ScoringWeights::default().passing_threshold)
	}
}

impl ValidationResult {
	/// Combines a shape outcome and an optional color score. An absent color score counts as 0.
	pub fn new(shape: ShapeOutcome, color_score: Option<f32>, weights: &ScoringWeights) -> Self {
		let shape_score = unit(shape.score);
		let color_score = color_score.map(unit);
		let final_score = unit(
			weights.shape_weight * shape_score + weights.color_weight * color_score.unwrap_or(0.0),
		);
		Self {
			shape_score,
			color_score,
			final_score,
			coverage: unit(shape.coverage),
			accuracy: unit(shape.accuracy),
			// Not a unit score: far more outside ink than reference area reads above 1.
			outside_penalty: if shape.outside_penalty.is_nan() {
				0.0
			} else {
				shape.outside_penalty.max(0.0)
			},
			correct_pixel_count: shape.correct,
			incorrect_pixel_count: shape.incorrect,
			total_reference_pixels: shape.total_reference,
			total_player_pixels: shape.total_player,
			passing_threshold: weights.passing_threshold,
		}
	}

	/// The result reported for drawings too small to score and for failed validations.
	pub fn zero(passing_threshold: f32) -> Self {
		Self {
			shape_score: 0.0,
			color_score: None,
			final_score: 0.0,
			coverage: 0.0,
			accuracy: 0.0,
			outside_penalty: 0.0,
			correct_pixel_count: 0,
			incorrect_pixel_count: 0,
			total_reference_pixels: 0,
			total_player_pixels: 0,
			passing_threshold,
		}
	}

	pub fn shape_score(&self) -> f32 {
		self.shape_score
	}

	pub fn color_score(&self) -> Option<f32> {
		self.color_score
	}

	pub fn final_score(&self) -> f32 {
		self.final_score
	}

	pub fn coverage(&self) -> f32 {
		self.coverage
	}

	pub fn accuracy(&self) -> f32 {
		self.accuracy
	}

	pub fn outside_penalty(&self) -> f32 {
		self.outside_penalty
	}

	pub fn correct_pixel_count(&self) -> u64 {
		self.correct_pixel_count
	}

	pub fn incorrect_pixel_count(&self) -> u64 {
		self.incorrect_pixel_count
	}

	pub fn total_reference_pixels(&self) -> u64 {
		self.total_reference_pixels
	}

	pub fn total_player_pixels(&self) -> u64 {
		self.total_player_pixels
	}

	pub fn passing_threshold(&self) -> f32 {
		self.passing_threshold
	}

	pub fn quality(&self) -> QualityTier {
		QualityTier::from_score(self.final_score)
	}

	pub fn is_passing(&self) -> bool {
		self.is_passing_at(self.passing_threshold)
	}

	pub fn is_passing_at(&self, threshold: f32) -> bool {
		self.final_score >= threshold
	}

	pub fn final_score_percentage(&self) -> f32 {
		self.final_score * 100.0
	}

	pub fn shape_score_percentage(&self) -> f32 {
		self.shape_score * 100.0
	}

	pub fn color_score_percentage(&self) -> Option<f32> {
		self.color_score.map(|c| c * 100.0)
	}
}

/// `{:#}` appends the raw pixel counts.
impl fmt::Display for ValidationResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Coverage: {:.1}% | Accuracy: {:.1}% | Penalty: {:.1}% | Score: {:.1}%",
			self.coverage * 100.0,
			self.accuracy * 100.0,
			self.outside_penalty * 100.0,
			self.final_score_percentage()
		)?;
		if f.alternate() {
			write!(
				f,
				" | Correct: {} | Incorrect: {} | Reference: {}",
				self.correct_pixel_count, self.incorrect_pixel_count, self.total_reference_pixels
			)?;
		}
		Ok(())
	}
}

fn unit(value: f32) -> f32 {
	if value.is_nan() {
		0.0
	} else {
		value.clamp(0.0, 1.0)
	}
}
