//! The canonical bounding box value type.
//!
//! A [`BBox`] always stores `(left, top, right, bottom)` internally, in
//! whichever coordinate [`Space`] it was constructed with. Construction
//! validates eagerly: an invalid box never escapes [`BBox::new`].

use crate::error::AnnoboxError;

use super::format::{self, BoxFormat};
use super::space::{ImageSize, Space};

/// An axis-aligned bounding box, validated at construction.
///
/// Immutable after construction except for the label. The reference image
/// size is only consulted when a conversion crosses coordinate spaces.
#[derive(Clone, Debug, PartialEq)]
pub struct BBox {
    /// Canonical LTRB coordinates in `space`.
    coords: [f64; 4],
    space: Space,
    image_size: Option<ImageSize>,
    label: Option<String>,
}

impl BBox {
    /// Creates a validated box from coordinates in any supported format.
    ///
    /// # Errors
    ///
    /// Returns [`AnnoboxError::Validation`] if any coordinate is negative
    /// or non-finite, if a normalized coordinate exceeds 1.0, if
    /// pixel-tagged coordinates all lie inside `[0, 1)` without being
    /// all-zero, or if the canonical form is inverted (left > right or
    /// top > bottom).
    pub fn new(coords: [f64; 4], format: BoxFormat, space: Space) -> Result<Self, AnnoboxError> {
        check_coords(coords, space)?;

        let ltrb = format::convert(coords, format, BoxFormat::Ltrb);
        let [l, t, r, b] = ltrb;
        if l > r || t > b {
            return Err(AnnoboxError::Validation(format!(
                "inverted box after conversion to ltrb: [{l}, {t}, {r}, {b}]"
            )));
        }

        Ok(Self {
            coords: ltrb,
            space,
            image_size: None,
            label: None,
        })
    }

    /// Attaches a reference image size for cross-space conversions.
    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = Some(size);
        self
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The coordinate space the box is stored in.
    #[inline]
    pub fn space(&self) -> Space {
        self.space
    }

    /// The reference image size, if one is attached.
    #[inline]
    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    /// The label, or "0" when none was ever assigned.
    #[inline]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("0")
    }

    /// The label as assigned, without the "0" default.
    #[inline]
    pub fn raw_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Reassigns the label. The only mutation a box supports.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// The canonical LTRB coordinates in the requested space.
    ///
    /// When `space` differs from the box's own space, a reference size is
    /// required: the one attached to the box wins, `fallback` is consulted
    /// otherwise, and [`AnnoboxError::MissingReference`] is returned when
    /// neither is available.
    pub fn ltrb(&self, space: Space, fallback: Option<ImageSize>) -> Result<[f64; 4], AnnoboxError> {
        if space == self.space {
            return Ok(self.coords);
        }

        let size = self
            .image_size
            .or(fallback)
            .ok_or(AnnoboxError::MissingReference)?;

        match space {
            Space::Pixel => norm_to_pixel(self.coords, size),
            Space::Normalized => pixel_to_norm(self.coords, size),
        }
    }

    /// The coordinates in the requested format and space.
    pub fn to_format(
        &self,
        format: BoxFormat,
        space: Space,
        fallback: Option<ImageSize>,
    ) -> Result<[f64; 4], AnnoboxError> {
        let ltrb = self.ltrb(space, fallback)?;
        Ok(format::convert(ltrb, BoxFormat::Ltrb, format))
    }

    /// Returns a copy of the box re-expressed in `space`.
    ///
    /// A no-op copy when the box is already in that space.
    pub fn reprojected(&self, space: Space) -> Result<BBox, AnnoboxError> {
        let coords = self.ltrb(space, None)?;
        Ok(Self {
            coords,
            space,
            image_size: self.image_size,
            label: self.label.clone(),
        })
    }
}

/// Scales normalized LTRB-interleaved coordinates up to pixel space.
///
/// # Errors
///
/// Returns [`AnnoboxError::Validation`] when any input coordinate lies
/// outside `[0, 1]`.
pub fn norm_to_pixel(coords: [f64; 4], size: ImageSize) -> Result<[f64; 4], AnnoboxError> {
    if coords.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
        return Err(AnnoboxError::Validation(format!(
            "normalized coordinates must lie in [0, 1], got {coords:?}"
        )));
    }

    let scale = size.scale();
    Ok([
        coords[0] * scale[0],
        coords[1] * scale[1],
        coords[2] * scale[2],
        coords[3] * scale[3],
    ])
}

/// Scales pixel LTRB-interleaved coordinates down to normalized space.
///
/// # Errors
///
/// Returns [`AnnoboxError::Validation`] when any coordinate is negative,
/// or when every coordinate is below 1.0 without the box being all-zero
/// (the input already looks normalized).
pub fn pixel_to_norm(coords: [f64; 4], size: ImageSize) -> Result<[f64; 4], AnnoboxError> {
    if coords.iter().any(|&v| v < 0.0) {
        return Err(AnnoboxError::Validation(format!(
            "pixel coordinates must be non-negative, got {coords:?}"
        )));
    }
    if coords.iter().all(|&v| v < 1.0) && coords != [0.0; 4] {
        return Err(AnnoboxError::Validation(format!(
            "coordinates {coords:?} already look normalized; refusing to divide by the image size"
        )));
    }

    let scale = size.scale();
    Ok([
        coords[0] / scale[0],
        coords[1] / scale[1],
        coords[2] / scale[2],
        coords[3] / scale[3],
    ])
}

/// Converts a box between formats and spaces, clamping the result to the
/// image bounds.
///
/// This is the one sanitizing entry point: a box touching or exceeding the
/// image border is clipped instead of rejected, so externally-sourced
/// geometry can be made safe before further use. Input validation is still
/// full [`BBox::new`] validation; only the output range is forgiven.
///
/// Normalized output is clamped to `[0, 1]` per axis; pixel output clamps
/// the two x-slots to `[0, width]` and the two y-slots to `[0, height]`.
pub fn safe_project(
    coords: [f64; 4],
    src_format: BoxFormat,
    dst_format: BoxFormat,
    size: ImageSize,
    src_space: Space,
    dst_space: Space,
) -> Result<[f64; 4], AnnoboxError> {
    let bbox = BBox::new(coords, src_format, src_space)?.with_image_size(size);
    let out = bbox.to_format(dst_format, dst_space, None)?;

    Ok(match dst_space {
        Space::Normalized => out.map(|v| v.clamp(0.0, 1.0)),
        Space::Pixel => {
            let scale = size.scale();
            [
                out[0].clamp(0.0, scale[0]),
                out[1].clamp(0.0, scale[1]),
                out[2].clamp(0.0, scale[2]),
                out[3].clamp(0.0, scale[3]),
            ]
        }
    })
}

fn check_coords(coords: [f64; 4], space: Space) -> Result<(), AnnoboxError> {
    if coords.iter().any(|v| !v.is_finite()) {
        return Err(AnnoboxError::Validation(format!(
            "coordinates must be finite, got {coords:?}"
        )));
    }
    if coords.iter().any(|&v| v < 0.0) {
        return Err(AnnoboxError::Validation(format!(
            "coordinates must be non-negative, got {coords:?}"
        )));
    }

    match space {
        Space::Normalized => {
            if coords.iter().any(|&v| v > 1.0) {
                return Err(AnnoboxError::Validation(format!(
                    "normalized coordinates must not exceed 1.0, got {coords:?}"
                )));
            }
        }
        Space::Pixel => {
            // An all-zero box is legal in either space; anything else that
            // fits entirely inside [0, 1) was almost certainly normalized
            // data mislabeled as pixel data.
            if coords.iter().all(|&v| v < 1.0) && coords != [0.0; 4] {
                return Err(AnnoboxError::Validation(format!(
                    "coordinates {coords:?} look normalized but were tagged as pixel space"
                )));
            }
        }
    }

    Ok(())
}
