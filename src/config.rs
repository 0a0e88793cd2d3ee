use crate::validation::ScoringPolicy;
use bon::Builder;
use glam::Vec4;
use std::time::Duration;
use thiserror::Error;

/// Target class of device. Lower-powered targets trade accuracy for cost.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Profile {
	#[default]
	Desktop,
	Mobile,
}

impl Profile {
	/// Side length of the square player and reference buffers.
	pub fn texture_resolution(self) -> u32 {
		match self {
			Profile::Desktop => 512,
			Profile::Mobile => 256,
		}
	}

	/// Coarser touch input on mobile gets a wider point-spacing threshold.
	pub fn min_distance_threshold(self) -> f32 {
		match self {
			Profile::Desktop => 0.01,
			Profile::Mobile => 0.03,
		}
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BrushSize {
	Small,
	#[default]
	Medium,
	Large,
	ExtraLarge,
}

impl BrushSize {
	/// Line thickness in world units.
	pub fn thickness(self) -> f32 {
		match self {
			BrushSize::Small => 0.05,
			BrushSize::Medium => 0.15,
			BrushSize::Large => 0.3,
			BrushSize::ExtraLarge => 0.5,
		}
	}
}

#[derive(Debug, Error)]
pub enum BrushError {
	#[error("invalid brush color {0:?}")]
	InvalidColor(String, #[source] csscolorparser::ParseColorError),
}

static_assertions::assert_impl_all!(BrushError: std::error::Error, Send, Sync);

/// The brush a stroke is drawn with. Passed explicitly into capture; each stroke keeps the
/// brush that was active when it began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushConfig {
	pub thickness: f32,
	/// Straight RGBA in `[0, 1]`.
	pub color: Vec4,
}

impl Default for BrushConfig {
	fn default() -> Self {
		Self::new(BrushSize::default().thickness(), Vec4::ONE)
	}
}

impl BrushConfig {
	pub fn new(thickness: f32, color: Vec4) -> Self {
		Self {
			thickness: thickness.max(0.0),
			color: color.clamp(Vec4::ZERO, Vec4::ONE),
		}
	}

	pub fn sized(size: BrushSize) -> Self {
		Self {
			thickness: size.thickness(),
			..Default::default()
		}
	}

	/// Replaces the color with one parsed from a CSS color string such as `#FF8800`.
	pub fn with_color(self, color: &str) -> Result<Self, BrushError> {
		let parsed = csscolorparser::parse(color)
			.map_err(|err| BrushError::InvalidColor(color.to_owned(), err))?;
		let [r, g, b, a] = parsed.to_rgba8();
		Ok(Self {
			color: Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0,
			..self
		})
	}

	/// Like [`BrushConfig::with_color`] but falls back to opaque white.
	pub fn with_color_or_white(self, color: &str) -> Self {
		self.with_color(color).unwrap_or_else(|err| {
			tracing::warn!(%err, "using white");
			Self {
				color: Vec4::ONE,
				..self
			}
		})
	}
}

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct CaptureConfig {
	/// Minimum spacing between consecutive accepted points, in world units.
	#[builder(default = 0.01)]
	pub min_distance_threshold: f32,
	/// Point cap per stroke. Longer gestures are split into several strokes.
	#[builder(default = 1000)]
	pub max_points_per_line: usize,
	/// 0 keeps raw positions, 1 uses the history mean.
	#[builder(default = 0.2)]
	pub smoothing_factor: f32,
	#[builder(default = 3)]
	pub history_size: usize,
	/// Samples with a contact value below this end the stroke.
	#[builder(default = 0.5)]
	pub contact_threshold: f32,
	/// Debounce between releasing the pointer and the automatic validation.
	#[builder(default = Duration::from_millis(300))]
	pub validation_delay: Duration,
	#[builder(default)]
	pub brush: BrushConfig,
}

impl Default for CaptureConfig {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl CaptureConfig {
	pub fn for_profile(profile: Profile) -> Self {
		Self::builder()
			.min_distance_threshold(profile.min_distance_threshold())
			.build()
	}

	/// Brings every option into the range capture relies on.
	pub(crate) fn sanitized(self) -> Self {
		Self {
			min_distance_threshold: finite_or(self.min_distance_threshold, 0.0).max(0.0),
			// A split stroke is seeded with the last point, so it needs room for at least one more.
			max_points_per_line: self.max_points_per_line.max(2),
			smoothing_factor: finite_or(self.smoothing_factor, 0.0).clamp(0.0, 1.0),
			history_size: self.history_size.max(1),
			contact_threshold: finite_or(self.contact_threshold, 0.5),
			..self
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct ScoringWeights {
	#[builder(default = 0.8)]
	pub shape_weight: f32,
	#[builder(default = 0.2)]
	pub color_weight: f32,
	/// Scales the outside penalty before it is subtracted from coverage.
	#[builder(default = 0.5)]
	pub outside_penalty_weight: f32,
	#[builder(default = 0.6)]
	pub passing_threshold: f32,
}

impl Default for ScoringWeights {
	fn default() -> Self {
		Self::builder().build()
	}
}

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct ValidatorConfig {
	#[builder(default)]
	pub weights: ScoringWeights,
	#[builder(default)]
	pub policy: ScoringPolicy,
	/// Reference pixels above this alpha belong to the shape.
	#[builder(default = 0.5)]
	pub reference_alpha_threshold: f32,
	/// Deliberately lower than the reference threshold so thin strokes count.
	#[builder(default = 0.1)]
	pub player_alpha_threshold: f32,
	/// Normalized Sobel magnitude above which a pixel is an edge.
	#[builder(default = 0.15)]
	pub edge_threshold: f32,
	/// Drawings with fewer points are scored as zero without scanning.
	#[builder(default = 10)]
	pub min_point_count: usize,
	/// Buffers wider or taller than this are sampled every other pixel.
	#[builder(default = 512)]
	pub stride_threshold: u32,
	#[builder(default = 512)]
	pub resolution: u32,
}

impl Default for ValidatorConfig {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl ValidatorConfig {
	pub fn for_profile(profile: Profile) -> Self {
		Self::builder()
			.resolution(profile.texture_resolution())
			.build()
	}
}

fn finite_or(value: f32, fallback: f32) -> f32 {
	if value.is_finite() {
		value
	} else {
		fallback
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn test_defaults() {
		let capture = CaptureConfig::default();
		assert_eq!(capture.max_points_per_line, 1000);
		assert_eq!(capture.history_size, 3);
		assert_eq!(capture.validation_delay, Duration::from_millis(300));

		let weights = ScoringWeights::default();
		assert_abs_diff_eq!(weights.shape_weight, 0.8);
		assert_abs_diff_eq!(weights.color_weight, 0.2);
		assert_abs_diff_eq!(weights.passing_threshold, 0.6);
	}

	#[test]
	fn test_profiles() {
		assert_eq!(ValidatorConfig::for_profile(Profile::Mobile).resolution, 256);
		assert_eq!(ValidatorConfig::for_profile(Profile::Desktop).resolution, 512);
		assert!(
			CaptureConfig::for_profile(Profile::Mobile).min_distance_threshold
				> CaptureConfig::for_profile(Profile::Desktop).min_distance_threshold
		);
	}

	#[test]
	fn test_sanitized() {
		let config = CaptureConfig::builder()
			.max_points_per_line(0)
			.smoothing_factor(7.0)
			.history_size(0)
			.min_distance_threshold(f32::NAN)
			.build()
			.sanitized();
		assert_eq!(config.max_points_per_line, 2);
		assert_eq!(config.smoothing_factor, 1.0);
		assert_eq!(config.history_size, 1);
		assert_eq!(config.min_distance_threshold, 0.0);
	}

	#[test]
	fn test_brush_color() {
		let brush = BrushConfig::sized(BrushSize::Large)
			.with_color("#FF0000")
			.unwrap();
		assert_abs_diff_eq!(brush.thickness, 0.3);
		assert_eq!(brush.color, Vec4::new(1.0, 0.0, 0.0, 1.0));

		assert!(BrushConfig::default().with_color("not a color").is_err());
		let fallback = BrushConfig::default()
			.with_color("#00FF00")
			.unwrap()
			.with_color_or_white("nope");
		assert_eq!(fallback.color, Vec4::ONE);
	}
}
