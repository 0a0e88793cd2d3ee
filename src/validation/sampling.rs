use itertools::iproduct;

/// Which pixels a scoring pass visits. Large buffers are visited on a stride-2 grid and each
/// visited pixel stands in for `stride²` pixels, so counts stay comparable across strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
	stride: u32,
}

impl Default for Sampling {
	fn default() -> Self {
		Self::full()
	}
}

impl Sampling {
	pub fn full() -> Self {
		Self { stride: 1 }
	}

	pub fn with_stride(stride: u32) -> Self {
		Self {
			stride: stride.max(1),
		}
	}

	/// Stride 2 once either side exceeds `threshold`, otherwise every pixel.
	pub fn for_dimensions(width: u32, height: u32, threshold: u32) -> Self {
		if width > threshold || height > threshold {
			Self::with_stride(2)
		} else {
			Self::full()
		}
	}

	pub fn stride(&self) -> u32 {
		self.stride
	}

	pub fn weight(&self) -> u64 {
		let stride = self.stride as u64;
		stride * stride
	}

	/// Row-major indices of the visited pixels.
	pub fn indices(&self, width: u32, height: u32) -> impl Iterator<Item = usize> {
		let step = self.stride as usize;
		let width = width as usize;
		iproduct!(
			(0..height as usize).step_by(step),
			(0..width).step_by(step)
		)
		.map(move |(y, x)| y * width + x)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use itertools::Itertools;

	#[test]
	fn test_for_dimensions() {
		assert_eq!(Sampling::for_dimensions(512, 512, 512).stride(), 1);
		assert_eq!(Sampling::for_dimensions(513, 16, 512).stride(), 2);
		assert_eq!(Sampling::for_dimensions(1024, 1024, 512).weight(), 4);
	}

	#[test]
	fn test_indices() {
		assert_eq!(Sampling::full().indices(2, 2).collect_vec(), vec![0, 1, 2, 3]);
		assert_eq!(
			Sampling::with_stride(2).indices(3, 3).collect_vec(),
			vec![0, 2, 6, 8]
		);
	}
}
