//! Bounding box coordinate formats and the pairwise conversion table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnoboxError;

/// The three supported bounding box coordinate layouts.
///
/// [`Ltrb`](BoxFormat::Ltrb) is the canonical form: every composite
/// conversion pivots through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxFormat {
    /// `(left, top, right, bottom)` edge coordinates.
    Ltrb,
    /// `(center_x, center_y, width, height)`, the YOLO layout.
    Cxcywh,
    /// `(left, top, width, height)`, the COCO layout.
    Ltwh,
}

impl BoxFormat {
    /// All supported formats, in declaration order.
    pub const ALL: [BoxFormat; 3] = [BoxFormat::Ltrb, BoxFormat::Cxcywh, BoxFormat::Ltwh];

    /// The short lowercase name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxFormat::Ltrb => "ltrb",
            BoxFormat::Cxcywh => "cxcywh",
            BoxFormat::Ltwh => "ltwh",
        }
    }
}

impl fmt::Display for BoxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxFormat {
    type Err = AnnoboxError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "ltrb" => Ok(BoxFormat::Ltrb),
            "cxcywh" | "xywh" => Ok(BoxFormat::Cxcywh),
            "ltwh" => Ok(BoxFormat::Ltwh),
            other => Err(AnnoboxError::Validation(format!(
                "unknown box format '{other}'; expected one of ltrb, cxcywh, ltwh"
            ))),
        }
    }
}

/// Converts box coordinates from one layout to another.
///
/// The six directed conversions are exact and mutually inverse; conversions
/// between the two non-canonical formats chain through LTRB. No validation
/// is performed here: callers that need invariants enforced go through
/// [`BBox`](super::BBox).
pub fn convert(coords: [f64; 4], src: BoxFormat, dst: BoxFormat) -> [f64; 4] {
    use BoxFormat::*;

    match (src, dst) {
        (Ltrb, Ltrb) | (Cxcywh, Cxcywh) | (Ltwh, Ltwh) => coords,
        (Ltrb, Cxcywh) => ltrb_to_cxcywh(coords),
        (Cxcywh, Ltrb) => cxcywh_to_ltrb(coords),
        (Ltrb, Ltwh) => ltrb_to_ltwh(coords),
        (Ltwh, Ltrb) => ltwh_to_ltrb(coords),
        (Cxcywh, Ltwh) => ltrb_to_ltwh(cxcywh_to_ltrb(coords)),
        (Ltwh, Cxcywh) => ltrb_to_cxcywh(ltwh_to_ltrb(coords)),
    }
}

fn ltrb_to_cxcywh([l, t, r, b]: [f64; 4]) -> [f64; 4] {
    [(l + r) / 2.0, (t + b) / 2.0, r - l, b - t]
}

fn cxcywh_to_ltrb([cx, cy, w, h]: [f64; 4]) -> [f64; 4] {
    let l = cx - w / 2.0;
    let t = cy - h / 2.0;
    [l, t, l + w, t + h]
}

fn ltrb_to_ltwh([l, t, r, b]: [f64; 4]) -> [f64; 4] {
    [l, t, r - l, b - t]
}

fn ltwh_to_ltrb([l, t, w, h]: [f64; 4]) -> [f64; 4] {
    [l, t, l + w, t + h]
}
