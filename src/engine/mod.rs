mod stroke;
pub use stroke::*;

mod smoothing;
pub use smoothing::*;

mod deferred;
pub use deferred::*;

mod capture;
pub use capture::*;

pub mod raster;
pub use raster::{CpuRasterizer, RasterError, Rasterizer};
