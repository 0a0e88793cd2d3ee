mod result_ext;
pub use result_ext::*;

mod image;
pub use image::*;
