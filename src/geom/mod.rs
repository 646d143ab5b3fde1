//! The bounding box geometry engine.
//!
//! Everything here is pure value manipulation: a canonical LTRB rectangle
//! ([`BBox`]), the three supported coordinate layouts ([`BoxFormat`]), the
//! pixel/normalized coordinate spaces ([`Space`]), and the boundary-safe
//! projection used to sanitize externally-sourced geometry
//! ([`safe_project`]).

mod bbox;
mod format;
mod space;

pub use bbox::{norm_to_pixel, pixel_to_norm, safe_project, BBox};
pub use format::{convert, BoxFormat};
pub use space::{ImageSize, Space};
