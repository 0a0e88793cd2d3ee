use crate::geom::Point2D;
use std::collections::VecDeque;

/// Jitter filter over the last few raw positions. Each sample is pulled towards the mean of the
/// history by `factor`, which costs O(history) per sample with a small fixed history.
#[derive(Debug, Clone)]
pub struct Smoother {
	history: VecDeque<Point2D>,
	capacity: usize,
	factor: f32,
}

impl Smoother {
	pub fn new(capacity: usize, factor: f32) -> Self {
		let capacity = capacity.max(1);
		Self {
			history: VecDeque::with_capacity(capacity + 1),
			capacity,
			factor: factor.clamp(0.0, 1.0),
		}
	}

	/// Forgets the history and seeds it with `start`.
	pub fn reset(&mut self, start: Point2D) {
		self.history.clear();
		self.history.push_back(start);
	}

	pub fn clear(&mut self) {
		self.history.clear();
	}

	pub fn smooth(&mut self, raw: Point2D) -> Point2D {
		self.history.push_back(raw);
		while self.history.len() > self.capacity {
			self.history.pop_front();
		}
		let mean = self.history.iter().copied().sum::<Point2D>() / self.history.len() as f32;
		raw.lerp(mean, self.factor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use glam::vec2;

	#[test]
	fn test_zero_factor_is_identity() {
		let mut smoother = Smoother::new(3, 0.0);
		smoother.reset(vec2(0.0, 0.0));
		assert_eq!(smoother.smooth(vec2(5.0, 1.0)), vec2(5.0, 1.0));
		assert_eq!(smoother.smooth(vec2(-2.0, 3.0)), vec2(-2.0, 3.0));
	}

	#[test]
	fn test_full_factor_is_history_mean() {
		let mut smoother = Smoother::new(3, 1.0);
		smoother.reset(vec2(0.0, 0.0));
		assert_eq!(smoother.smooth(vec2(3.0, 0.0)), vec2(1.5, 0.0));
		assert_eq!(smoother.smooth(vec2(6.0, 0.0)), vec2(3.0, 0.0));
		// The seed has now fallen out of the window.
		assert_eq!(smoother.smooth(vec2(9.0, 0.0)), vec2(6.0, 0.0));
	}

	#[test]
	fn test_partial_factor() {
		let mut smoother = Smoother::new(3, 0.2);
		smoother.reset(vec2(0.0, 0.0));
		let p = smoother.smooth(vec2(1.0, 0.0));
		// mean = 0.5, lerp(1.0, 0.5, 0.2) = 0.9
		assert_abs_diff_eq!(p.x, 0.9, epsilon = 1e-6);
		assert_abs_diff_eq!(p.y, 0.0);
	}
}
