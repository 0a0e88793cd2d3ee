//! Freehand stroke capture and scoring of traced drawings against a reference image.
//!
//! [`StrokeCapture`] turns pointer samples into a [`Drawing`], a [`Rasterizer`] renders it into a
//! [`PixelBuffer`], and a [`Validator`] scores that buffer against the reference. [`TraceSession`]
//! wires the three together with a debounced validation after each stroke.

pub(crate) mod util;
pub use util::{ImageError, ImageExt, ImageSink, SnapshotSink};

pub mod config;
pub use config::*;

pub mod engine;
pub use engine::{
	CaptureEvent, CpuRasterizer, Drawing, PointerId, PointerSample, RasterError, Rasterizer, Stroke,
	StrokeCapture,
};

pub mod geom;

pub mod session;
pub use session::*;

pub mod validation;
pub use validation::*;
