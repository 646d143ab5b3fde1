//! Annobox: a bounding-box geometry engine with pluggable annotation
//! format converters.
//!
//! The crate models object-detection annotations around one canonical
//! rectangle representation and moves them between on-disk schemas:
//!
//! - [`geom`]: the geometry engine with [`geom::BBox`], coordinate formats,
//!   pixel/normalized spaces, and boundary-safe clamping.
//! - [`dataset`]: the [`dataset::Dataset`] holding annotation records and
//!   metadata for a single image, with load/dump/save orchestration.
//! - [`formats`]: the [`formats::FormatRegistry`] and the built-in
//!   Labelme JSON, YOLO text, and Pascal VOC XML plugins.
//! - [`error`]: the [`AnnoboxError`] type every operation reports through.
//!
//! # Example
//!
//! ```
//! use annobox::{BBox, BoxFormat, Dataset, FormatRegistry, Space};
//!
//! let registry = FormatRegistry::builtins();
//! let mut dataset = Dataset::new();
//! dataset.load_bytes(&registry, "yolo", b"1 0.5 0.5 0.25 0.25\n")?;
//!
//! assert_eq!(dataset.len(), 1);
//! let bbox = &dataset.records()[0].bbox;
//! assert_eq!(bbox.space(), Space::Normalized);
//! assert_eq!(
//!     bbox.to_format(BoxFormat::Ltrb, Space::Normalized, None)?,
//!     [0.375, 0.375, 0.625, 0.625]
//! );
//! # Ok::<(), annobox::AnnoboxError>(())
//! ```

pub mod dataset;
pub mod error;
pub mod formats;
pub mod geom;

pub use dataset::{Annotation, Dataset};
pub use error::AnnoboxError;
pub use formats::{ExportOptions, FormatPlugin, FormatRegistry, ImportOptions, Payload};
pub use geom::{convert, norm_to_pixel, pixel_to_norm, safe_project, BBox, BoxFormat, ImageSize, Space};
