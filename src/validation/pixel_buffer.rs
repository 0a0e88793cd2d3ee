use glam::Vec4;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelBufferError {
	#[error("pixel buffer must not be empty, got {width}x{height}")]
	Empty { width: u32, height: u32 },
	#[error("expected {expected} values for the given dimensions, got {actual}")]
	LengthMismatch { expected: usize, actual: usize },
}

static_assertions::assert_impl_all!(PixelBufferError: std::error::Error, Send, Sync);

/// Row-major straight-alpha RGBA in `[0, 1]`. Row 0 is the texture origin. Dimensions are fixed
/// for the buffer's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
	width: u32,
	height: u32,
	pixels: Vec<Vec4>,
}

impl PixelBuffer {
	/// A fully transparent buffer.
	pub fn new(width: u32, height: u32) -> Result<Self, PixelBufferError> {
		Self::filled(width, height, Vec4::ZERO)
	}

	pub fn filled(width: u32, height: u32, color: Vec4) -> Result<Self, PixelBufferError> {
		let len = checked_len(width, height)?;
		Ok(Self {
			width,
			height,
			pixels: vec![sanitize(color); len],
		})
	}

	pub fn from_pixels(width: u32, height: u32, pixels: Vec<Vec4>) -> Result<Self, PixelBufferError> {
		let expected = checked_len(width, height)?;
		if pixels.len() != expected {
			return Err(PixelBufferError::LengthMismatch {
				expected,
				actual: pixels.len(),
			});
		}
		Ok(Self {
			width,
			height,
			pixels,
		})
	}

	/// Builds a buffer from interleaved 8-bit RGBA, the layout most decoders and screenshots use.
	pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self, PixelBufferError> {
		let expected = checked_len(width, height)? * 4;
		if data.len() != expected {
			return Err(PixelBufferError::LengthMismatch {
				expected,
				actual: data.len(),
			});
		}
		let pixels = data
			.chunks_exact(4)
			.map(|c| Vec4::new(c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32) / 255.0)
			.collect();
		Self::from_pixels(width, height, pixels)
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn dimensions(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	pub fn len(&self) -> usize {
		self.pixels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}

	/// Raw storage. Values written through [`PixelBuffer::from_pixels`] are not sanitized.
	pub fn pixels(&self) -> &[Vec4] {
		&self.pixels
	}

	pub(crate) fn pixels_mut(&mut self) -> &mut [Vec4] {
		&mut self.pixels
	}

	/// The pixel at a row-major index, with NaN read as 0 and every channel clamped to `[0, 1]`.
	pub fn texel(&self, index: usize) -> Vec4 {
		self.pixels.get(index).copied().map_or(Vec4::ZERO, sanitize)
	}

	pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
		if x >= self.width || y >= self.height {
			return Vec4::ZERO;
		}
		self.texel(self.index(x, y))
	}

	pub fn set_pixel(&mut self, x: u32, y: u32, color: Vec4) {
		if x < self.width && y < self.height {
			let index = self.index(x, y);
			self.pixels[index] = sanitize(color);
		}
	}

	/// Fills `[x0, x1) x [y0, y1)`, clipped to the buffer.
	pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Vec4) {
		let color = sanitize(color);
		let start = x0.min(self.width) as usize;
		let end = (x1.min(self.width) as usize).max(start);
		for y in y0.min(self.height)..y1.min(self.height) {
			let row = y as usize * self.width as usize;
			self.pixels[row + start..row + end].fill(color);
		}
	}

	/// Resets every pixel to transparent without reallocating.
	pub fn clear(&mut self) {
		self.pixels.fill(Vec4::ZERO);
	}

	pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
		self.dimensions() == other.dimensions()
	}

	fn index(&self, x: u32, y: u32) -> usize {
		y as usize * self.width as usize + x as usize
	}
}

fn checked_len(width: u32, height: u32) -> Result<usize, PixelBufferError> {
	if width == 0 || height == 0 {
		return Err(PixelBufferError::Empty { width, height });
	}
	Ok(width as usize * height as usize)
}

fn sanitize(color: Vec4) -> Vec4 {
	Vec4::from_array(color.to_array().map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }))
}
