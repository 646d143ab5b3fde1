//! Coordinate spaces and the reference image size.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The coordinate space a box is expressed in.
///
/// Unlike an ID or a format tag, the space is a runtime property of each
/// box: the same dataset can hold pixel boxes from one source and
/// normalized boxes from another, and conversion between the two requires
/// a known [`ImageSize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    /// Absolute coordinates in image pixels.
    Pixel,
    /// Coordinates scaled to the unit interval relative to the image size.
    Normalized,
}

/// Reference image dimensions in pixels, used to convert between spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Creates a new image size.
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Per-axis scale factors `(width, height, width, height)` matching the
    /// x/y interleaving of a four-coordinate box.
    #[inline]
    pub fn scale(&self) -> [f64; 4] {
        let w = self.width as f64;
        let h = self.height as f64;
        [w, h, w, h]
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
