use crate::config::BrushConfig;
use crate::geom::{AABox, Point2D};

/// One continuous pointer-down gesture. Immutable once finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
	points: Box<[Point2D]>,
	brush: BrushConfig,
}

impl Stroke {
	pub fn points(&self) -> &[Point2D] {
		&self.points
	}

	pub fn brush(&self) -> &BrushConfig {
		&self.brush
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	pub fn bounds(&self) -> AABox {
		AABox::containing(self.points.iter().copied())
	}

	/// Consecutive point pairs. A single-point stroke yields one degenerate segment so it still
	/// renders as a dot.
	pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
		let single = (self.points.len() == 1).then(|| (self.points[0], self.points[0]));
		single
			.into_iter()
			.chain(self.points.windows(2).map(|w| (w[0], w[1])))
	}
}

/// The stroke currently being drawn.
#[derive(Debug, Clone)]
pub(crate) struct ActiveStroke {
	points: Vec<Point2D>,
	brush: BrushConfig,
}

impl ActiveStroke {
	pub fn new(start: Point2D, brush: BrushConfig) -> Self {
		Self {
			points: vec![start],
			brush,
		}
	}

	pub fn add_point(&mut self, point: Point2D) {
		self.points.push(point);
	}

	pub fn last(&self) -> Option<Point2D> {
		self.points.last().copied()
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn points(&self) -> &[Point2D] {
		&self.points
	}

	pub fn brush(&self) -> &BrushConfig {
		&self.brush
	}

	pub fn finish(self) -> Stroke {
		Stroke {
			points: self.points.into_boxed_slice(),
			brush: self.brush,
		}
	}
}

/// All strokes of the current session, in draw order, plus at most one in-progress stroke.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
	strokes: Vec<Stroke>,
	active: Option<ActiveStroke>,
	brush: BrushConfig,
}

impl Drawing {
	pub fn new(brush: BrushConfig) -> Self {
		Self {
			strokes: Vec::new(),
			active: None,
			brush,
		}
	}

	pub fn strokes(&self) -> &[Stroke] {
		&self.strokes
	}

	pub fn stroke_count(&self) -> usize {
		self.strokes.len()
	}

	/// Points of the in-progress stroke, if any.
	pub fn active_points(&self) -> Option<&[Point2D]> {
		self.active.as_ref().map(ActiveStroke::points)
	}

	pub fn is_drawing(&self) -> bool {
		self.active.is_some()
	}

	/// The brush new strokes start with.
	pub fn brush(&self) -> &BrushConfig {
		&self.brush
	}

	pub fn total_point_count(&self) -> usize {
		self.strokes.iter().map(Stroke::len).sum::<usize>()
			+ self.active.as_ref().map_or(0, ActiveStroke::len)
	}

	/// Finalized strokes followed by a snapshot of the active one, for rendering.
	pub fn renderable_strokes(&self) -> impl Iterator<Item = Stroke> + '_ {
		self
			.strokes
			.iter()
			.cloned()
			.chain(self.active.iter().cloned().map(ActiveStroke::finish))
	}

	pub fn is_empty(&self) -> bool {
		self.strokes.is_empty() && self.active.is_none()
	}

	pub(crate) fn set_brush(&mut self, brush: BrushConfig) {
		self.brush = brush;
	}

	pub(crate) fn begin(&mut self, start: Point2D) {
		debug_assert!(self.active.is_none());
		self.active = Some(ActiveStroke::new(start, self.brush));
	}

	pub(crate) fn active_mut(&mut self) -> Option<&mut ActiveStroke> {
		self.active.as_mut()
	}

	/// Moves the active stroke into the finalized list. Strokes with at most one point are
	/// discarded. Returns whether a stroke was kept.
	pub(crate) fn finalize(&mut self) -> bool {
		let Some(active) = self.active.take() else {
			return false;
		};
		if active.len() <= 1 {
			tracing::debug!("discarding single-point stroke");
			return false;
		}
		self.strokes.push(active.finish());
		true
	}

	pub(crate) fn clear(&mut self) {
		self.strokes.clear();
		self.active = None;
	}
}
