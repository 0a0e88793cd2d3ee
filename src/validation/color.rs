use super::{PixelBuffer, ScoringInput};

/// Compares the colors of a player buffer and a reference buffer. `None` means there was nothing
/// to compare; it contributes zero to the final score.
pub trait ColorScoring {
	fn name(&self) -> &'static str;

	fn score_color(&self, input: &ScoringInput) -> Option<f32>;
}

/// Root-mean-square Euclidean RGB distance over pixels that are both reference-opaque and player-drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelDistance;

impl ColorScoring for PixelDistance {
	fn name(&self) -> &'static str {
		"pixel-distance"
	}

	fn score_color(&self, input: &ScoringInput) -> Option<f32> {
		let weight = input.weight() as f64;
		let mut total = 0.0f64;
		let mut samples = 0.0f64;
		for index in input.indices() {
			if !(input.is_reference_opaque(index) && input.is_player_drawn(index)) {
				continue;
			}
			let difference = input.player.texel(index).truncate() - input.reference.texel(index).truncate();
			total += weight * difference.length_squared() as f64;
			samples += weight;
		}
		if samples == 0.0 {
			return None;
		}
		let rms = (total / samples).sqrt() as f32;
		Some(1.0 - rms.min(1.0))
	}
}

/// Chi-square distance between normalized color histograms of each buffer's opaque pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramChiSquare;

impl ColorScoring for HistogramChiSquare {
	fn name(&self) -> &'static str {
		"histogram-chi-square"
	}

	fn score_color(&self, input: &ScoringInput) -> Option<f32> {
		let threshold = input.reference_alpha_threshold;
		let player = ColorHistogram::of_opaque(input.player, input.indices(), threshold)?;
		let reference = ColorHistogram::of_opaque(input.reference, input.indices(), threshold)?;
		Some((1.0 - player.chi_square_distance(&reference)).clamp(0.0, 1.0))
	}
}

pub const BINS_PER_CHANNEL: usize = 8;

/// Normalized RGB histogram with [`BINS_PER_CHANNEL`] bins per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHistogram {
	bins: Box<[f32]>,
}

impl ColorHistogram {
	/// Returns `None` when no visited pixel is opaque enough.
	pub fn of_opaque(
		buffer: &PixelBuffer,
		indices: impl Iterator<Item = usize>,
		alpha_threshold: f32,
	) -> Option<Self> {
		let mut bins = vec![0.0f32; BINS_PER_CHANNEL.pow(3)];
		let mut count = 0usize;
		for pixel in indices.map(|i| buffer.texel(i)).filter(|p| p.w > alpha_threshold) {
			let [r, g, b] = [pixel.x, pixel.y, pixel.z].map(bin);
			bins[(r * BINS_PER_CHANNEL + g) * BINS_PER_CHANNEL + b] += 1.0;
			count += 1;
		}
		if count == 0 {
			return None;
		}
		bins.iter_mut().for_each(|b| *b /= count as f32);
		Some(Self {
			bins: bins.into_boxed_slice(),
		})
	}

	pub fn bins(&self) -> &[f32] {
		&self.bins
	}

	/// `0.5 * Σ (a - b)² / (a + b)` over bins where either side is non-zero. 0 for identical
	/// histograms, 1 for disjoint ones.
	pub fn chi_square_distance(&self, other: &ColorHistogram) -> f32 {
		0.5 * self
			.bins
			.iter()
			.zip(other.bins.iter())
			.filter(|(a, b)| **a + **b > 0.0)
			.map(|(a, b)| (a - b) * (a - b) / (a + b))
			.sum::<f32>()
	}
}

fn bin(channel: f32) -> usize {
	((channel * BINS_PER_CHANNEL as f32).floor() as usize).min(BINS_PER_CHANNEL - 1)
}
