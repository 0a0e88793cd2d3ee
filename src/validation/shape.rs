use super::{ratio, PixelBuffer, ScoringInput};
use itertools::iproduct;

/// Per-pixel tallies behind a shape score. Counts are weighted by the sampling stride.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapeOutcome {
	pub score: f32,
	pub coverage: f32,
	pub accuracy: f32,
	pub outside_penalty: f32,
	pub correct: u64,
	pub incorrect: u64,
	pub total_reference: u64,
	pub total_player: u64,
}

/// Compares the silhouettes of a player buffer and a reference buffer.
pub trait ShapeScoring {
	fn name(&self) -> &'static str;

	fn score_shape(&self, input: &ScoringInput) -> ShapeOutcome;
}

/// Rewards covering the reference's opaque area and penalizes ink outside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphaOverlap;

impl ShapeScoring for AlphaOverlap {
	fn name(&self) -> &'static str {
		"alpha-overlap"
	}

	fn score_shape(&self, input: &ScoringInput) -> ShapeOutcome {
		let weight = input.weight();
		let mut outcome = ShapeOutcome::default();
		for index in input.indices() {
			let in_reference = input.is_reference_opaque(index);
			let in_player = input.is_player_drawn(index);
			if in_reference {
				outcome.total_reference += weight;
			}
			if in_player {
				outcome.total_player += weight;
				if in_reference {
					outcome.correct += weight;
				} else {
					outcome.incorrect += weight;
				}
			}
		}

		outcome.coverage = ratio(outcome.correct, outcome.total_reference);
		outcome.accuracy = ratio(outcome.correct, outcome.total_player);
		outcome.outside_penalty = ratio(outcome.incorrect, outcome.total_reference);
		outcome.score = (outcome.coverage - outcome.outside_penalty * input.outside_penalty_weight)
			.clamp(0.0, 1.0);
		outcome
	}
}

/// Compares Sobel contours instead of filled areas. The score is the F1 of edge precision and
/// recall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeOverlap;

impl ShapeScoring for EdgeOverlap {
	fn name(&self) -> &'static str {
		"edge-overlap"
	}

	fn score_shape(&self, input: &ScoringInput) -> ShapeOutcome {
		let reference_edges = edge_map(input.reference, input.edge_threshold);
		let player_edges = edge_map(input.player, input.edge_threshold);

		let weight = input.weight();
		let mut outcome = ShapeOutcome::default();
		for index in input.indices() {
			let in_reference = reference_edges[index];
			let in_player = player_edges[index];
			if in_reference {
				outcome.total_reference += weight;
			}
			if in_player {
				outcome.total_player += weight;
				if in_reference {
					outcome.correct += weight;
				} else {
					outcome.incorrect += weight;
				}
			}
		}

		let precision = ratio(outcome.correct, outcome.total_player);
		let recall = ratio(outcome.correct, outcome.total_reference);
		outcome.coverage = recall;
		outcome.accuracy = precision;
		outcome.outside_penalty = ratio(outcome.incorrect, outcome.total_reference);
		outcome.score = if precision + recall > 0.0 {
			(2.0 * precision * recall / (precision + recall)).clamp(0.0, 1.0)
		} else {
			0.0
		};
		outcome
	}
}

/// Largest Sobel gradient magnitude for inputs in `[0, 1]`.
const SOBEL_MAX_RESPONSE: f32 = 4.472_136;

/// Marks pixels whose Sobel gradient of alpha, normalized by [`SOBEL_MAX_RESPONSE`], exceeds
/// `threshold`. Border pixels are never edges.
pub fn edge_map(buffer: &PixelBuffer, threshold: f32) -> Vec<bool> {
	let (width, height) = buffer.dimensions();
	let (width, height) = (width as usize, height as usize);
	let mut edges = vec![false; width * height];
	if width < 3 || height < 3 {
		return edges;
	}

	let intensity: Vec<f32> = (0..buffer.len()).map(|i| buffer.texel(i).w).collect();
	let at = |x: usize, y: usize| intensity[y * width + x];
	for (y, x) in iproduct!(1..height - 1, 1..width - 1) {
		let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
			- at(x - 1, y - 1)
			- 2.0 * at(x - 1, y)
			- at(x - 1, y + 1);
		let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
			- at(x - 1, y - 1)
			- 2.0 * at(x, y - 1)
			- at(x + 1, y - 1);
		let magnitude = (gx * gx + gy * gy).sqrt() / SOBEL_MAX_RESPONSE;
		edges[y * width + x] = magnitude > threshold;
	}
	edges
}
