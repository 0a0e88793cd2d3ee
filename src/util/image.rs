use crate::validation::{PixelBuffer, PixelBufferError};
use glam::Vec4;
use thiserror::Error;
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_image::image::Image;

#[derive(Debug, Error)]
pub enum ImageError {
	#[error("image conversion failed: {0}")]
	Conversion(String),
	#[error("image has no frames")]
	NoFrames,
	#[error(transparent)]
	Buffer(#[from] PixelBufferError),
}

static_assertions::assert_impl_all!(ImageError: std::error::Error, Send, Sync);

fn conversion(err: impl std::fmt::Debug) -> ImageError {
	ImageError::Conversion(format!("{err:?}"))
}

/// Bridges [`PixelBuffer`] and decoded `zune_image` images, e.g. to load reference art from a
/// PNG or to save a snapshot of the player's drawing.
pub trait ImageExt: Sized {
	fn from_pixel_buffer(buffer: &PixelBuffer) -> Self;
	fn to_pixel_buffer(&mut self) -> Result<PixelBuffer, ImageError>;
	fn convert_to_f32_subpixels(&mut self) -> Result<Vec<f32>, ImageError>;
}

impl ImageExt for Image {
	fn from_pixel_buffer(buffer: &PixelBuffer) -> Self {
		let data: Vec<f32> = buffer.pixels().iter().flat_map(|p| p.to_array()).collect();
		let (width, height) = buffer.dimensions();
		Self::from_f32(&data, width as usize, height as usize, ColorSpace::RGBA)
	}

	fn to_pixel_buffer(&mut self) -> Result<PixelBuffer, ImageError> {
		self.convert_color(ColorSpace::RGBA).map_err(conversion)?;
		let data = self.convert_to_f32_subpixels()?;
		let (width, height) = self.dimensions();
		let pixels = data.chunks_exact(4).map(Vec4::from_slice).collect();
		Ok(PixelBuffer::from_pixels(width as u32, height as u32, pixels)?)
	}

	fn convert_to_f32_subpixels(&mut self) -> Result<Vec<f32>, ImageError> {
		self.convert_depth(BitDepth::Float32).map_err(conversion)?;
		let frame = self.frames_ref().first().ok_or(ImageError::NoFrames)?;
		let channels = frame.channels_ref(self.colorspace(), false);
		let size: usize = channels.iter().map(|c| c.len()).sum();
		let len = size.div_ceil(std::mem::size_of::<f32>());
		let mut data = vec![0.0f32; len];
		let len = zune_image::utils::swizzle_channels(channels, &mut data).map_err(conversion)?;
		data.truncate(len);
		Ok(data)
	}
}

impl PixelBuffer {
	/// Converts any decoded image to RGBA, e.g. reference art loaded from a PNG.
	pub fn from_image(image: &mut Image) -> Result<Self, ImageError> {
		image.to_pixel_buffer()
	}
}

/// Receives labelled copies of session buffers for debugging or persistence.
pub trait SnapshotSink {
	fn receive(&mut self, label: &str, buffer: &PixelBuffer);
}

impl SnapshotSink for Vec<(String, PixelBuffer)> {
	fn receive(&mut self, label: &str, buffer: &PixelBuffer) {
		self.push((label.to_owned(), buffer.clone()));
	}
}

/// Collects snapshots as `zune_image` images, ready to be encoded.
#[derive(Default)]
pub struct ImageSink {
	images: Vec<(String, Image)>,
}

impl ImageSink {
	pub fn images(&self) -> &[(String, Image)] {
		&self.images
	}

	pub fn into_images(self) -> Vec<(String, Image)> {
		self.images
	}
}

impl SnapshotSink for ImageSink {
	fn receive(&mut self, label: &str, buffer: &PixelBuffer) {
		self
			.images
			.push((label.to_owned(), Image::from_pixel_buffer(buffer)));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pixel_buffer_round_trip() {
		let mut buffer = PixelBuffer::new(3, 2).unwrap();
		buffer.set_pixel(0, 0, Vec4::new(1.0, 0.5, 0.25, 1.0));
		buffer.set_pixel(2, 1, Vec4::new(0.0, 0.0, 1.0, 0.5));

		let mut image = Image::from_pixel_buffer(&buffer);
		assert_eq!(image.dimensions(), (3, 2));
		let restored = image.to_pixel_buffer().unwrap();
		crate::test::assert_buffers_close(&restored, &buffer, 1.0, 1e-6);
	}

	#[test]
	fn test_image_sink() {
		let mut sink = ImageSink::default();
		sink.receive("player", &PixelBuffer::new(4, 4).unwrap());
		assert_eq!(sink.images().len(), 1);
		assert_eq!(sink.images()[0].0, "player");
		assert_eq!(sink.images()[0].1.dimensions(), (4, 4));
	}
}
