use glam::Vec2;

/// A world- or texture-space coordinate.
pub type Point2D = Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox {
	min: Vec2,
	max: Vec2,
}

impl AABox {
	pub fn new(min: Vec2, max: Vec2) -> Self {
		Self { min, max }
	}

	pub fn empty() -> Self {
		Self::new(Vec2::MAX, Vec2::MIN)
	}

	pub fn is_empty(&self) -> bool {
		self.min.x > self.max.x || self.min.y > self.max.y
	}

	pub fn min(&self) -> Vec2 {
		self.min
	}

	pub fn max(&self) -> Vec2 {
		self.max
	}

	pub fn size(&self) -> Vec2 {
		self.max - self.min
	}

	pub fn expanded_to_contain(self, point: Vec2) -> Self {
		Self::new(self.min.min(point), self.max.max(point))
	}

	pub fn containing(points: impl Iterator<Item = Vec2>) -> Self {
		points.fold(Self::empty(), |b, p| b.expanded_to_contain(p))
	}

	/// Grows the box by `margin` on every side.
	pub fn inflated(self, margin: f32) -> Self {
		Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
	}

	/// The overlap of both boxes; empty when they are disjoint.
	pub fn intersection(self, other: Self) -> Self {
		Self::new(self.min.max(other.min), self.max.min(other.max))
	}

	/// Maps `point` into `[0, 1]²` relative to this box. Points outside map outside that range.
	pub fn to_unit(&self, point: Vec2) -> Vec2 {
		(point - self.min) / self.size()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use glam::vec2;

	#[test]
	fn test_containing() {
		let b = AABox::containing([vec2(1.0, 2.0), vec2(-1.0, 4.0), vec2(0.5, 3.0)].into_iter());
		assert_eq!(b.min(), vec2(-1.0, 2.0));
		assert_eq!(b.max(), vec2(1.0, 4.0));
		assert!(!b.is_empty());
		assert!(AABox::empty().is_empty());
	}

	#[test]
	fn test_intersection() {
		let b = AABox::new(Vec2::ZERO, vec2(2.0, 2.0));
		let overlap = b.intersection(AABox::new(Vec2::ONE, vec2(3.0, 3.0)));
		assert_eq!(overlap, AABox::new(Vec2::ONE, vec2(2.0, 2.0)));
		assert!(b.intersection(AABox::new(vec2(3.0, 0.0), vec2(4.0, 1.0))).is_empty());
		// Touching edges still overlap.
		assert!(!b.intersection(AABox::new(vec2(2.0, 0.0), vec2(4.0, 1.0))).is_empty());
	}

	#[test]
	fn test_to_unit() {
		let b = AABox::new(vec2(-2.0, -1.0), vec2(2.0, 1.0));
		let u = b.to_unit(vec2(0.0, 0.5));
		assert_abs_diff_eq!(u.x, 0.5);
		assert_abs_diff_eq!(u.y, 0.75);
		assert_eq!(b.inflated(1.0).size(), vec2(6.0, 4.0));
	}
}
