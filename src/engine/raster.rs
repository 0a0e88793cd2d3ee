use super::{Drawing, Stroke};
use crate::geom::AABox;
use crate::validation::PixelBuffer;
use glam::{vec2, Vec2, Vec4};
use itertools::iproduct;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RasterError {
	#[error("viewport {0:?} has no area")]
	DegenerateViewport(AABox),
}

static_assertions::assert_impl_all!(RasterError: std::error::Error, Send, Sync);

/// Renders a drawing into a caller-owned buffer. The buffer keeps its size.
pub trait Rasterizer {
	fn render(&mut self, drawing: &Drawing, target: &mut PixelBuffer) -> Result<(), RasterError>;
}

/// Software rasterizer: each stroke is a chain of round-capped capsules of the stroke's brush
/// thickness. `viewport` is the world-space rectangle that covers the whole target; texture row 0
/// lies at `viewport.min().y`.
#[derive(Debug, Clone)]
pub struct CpuRasterizer {
	viewport: AABox,
	coverage: Vec<bool>,
}

impl CpuRasterizer {
	pub fn new(viewport: AABox) -> Self {
		Self {
			viewport,
			coverage: Vec::new(),
		}
	}

	pub fn viewport(&self) -> AABox {
		self.viewport
	}

	fn check_viewport(&self) -> Result<(), RasterError> {
		let size = self.viewport.size();
		if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
			Ok(())
		} else {
			Err(RasterError::DegenerateViewport(self.viewport))
		}
	}

	fn to_pixels(&self, point: Vec2, extent: Vec2) -> Vec2 {
		self.viewport.to_unit(point) * extent
	}

	fn render_stroke(&mut self, stroke: &Stroke, target: &mut PixelBuffer) {
		let (width, height) = target.dimensions();
		let extent = vec2(width as f32, height as f32);
		let scale = extent / self.viewport.size();
		// Thin brushes still cover at least the pixel they pass through.
		let radius = (0.25 * stroke.brush().thickness * (scale.x + scale.y)).max(0.5);

		let reach = radius / scale.min_element();
		if stroke
			.bounds()
			.inflated(reach)
			.intersection(self.viewport)
			.is_empty()
		{
			return;
		}

		self.coverage.clear();
		self.coverage.resize(target.len(), false);
		for (a, b) in stroke.segments() {
			let a = self.to_pixels(a, extent);
			let b = self.to_pixels(b, extent);
			let bounds = AABox::containing([a, b].into_iter()).inflated(radius);
			let xs = clamped_span(bounds.min().x, bounds.max().x, width);
			let ys = clamped_span(bounds.min().y, bounds.max().y, height);
			for (y, x) in iproduct!(ys, xs) {
				let center = vec2(x as f32 + 0.5, y as f32 + 0.5);
				if distance_to_segment(center, a, b) <= radius {
					self.coverage[y as usize * width as usize + x as usize] = true;
				}
			}
		}

		let color = stroke.brush().color;
		for (pixel, _) in target
			.pixels_mut()
			.iter_mut()
			.zip(&self.coverage)
			.filter(|(_, covered)| **covered)
		{
			*pixel = blend_over(color, *pixel);
		}
	}
}

impl Rasterizer for CpuRasterizer {
	fn render(&mut self, drawing: &Drawing, target: &mut PixelBuffer) -> Result<(), RasterError> {
		self.check_viewport()?;
		target.clear();
		for stroke in drawing.renderable_strokes() {
			self.render_stroke(&stroke, target);
		}
		Ok(())
	}
}

/// Pixel indices covering `[min, max]`, clamped to `0..size` before any integer conversion so
/// coordinates far outside the target cannot overflow.
fn clamped_span(min: f32, max: f32, size: u32) -> std::ops::Range<u32> {
	let size = size as f32;
	let start = min.floor().clamp(0.0, size) as u32;
	let end = (max.floor() + 1.0).clamp(0.0, size) as u32;
	start..end
}

pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
	let ab = b - a;
	let length_squared = ab.length_squared();
	let t = if length_squared > 0.0 {
		((p - a).dot(ab) / length_squared).clamp(0.0, 1.0)
	} else {
		0.0
	};
	p.distance(a + ab * t)
}

/// Straight-alpha source-over.
fn blend_over(source: Vec4, destination: Vec4) -> Vec4 {
	let alpha = source.w + destination.w * (1.0 - source.w);
	if alpha <= 0.0 {
		return Vec4::ZERO;
	}
	let rgb = (source.truncate() * source.w
		+ destination.truncate() * destination.w * (1.0 - source.w))
		/ alpha;
	rgb.extend(alpha)
}
