//! Labelme JSON reader and writer.
//!
//! Supports the rectangle shapes of a Labelme annotation document. Each
//! rectangle is stored as two diagonal corner points in pixel space; the
//! min/max across the points yields the canonical LTRB box, so point order
//! does not matter on import.

use serde::{Deserialize, Serialize};

use crate::dataset::{Annotation, Dataset};
use crate::error::AnnoboxError;
use crate::geom::{BBox, BoxFormat, ImageSize, Space};

use super::{
    apply_label_map, image_basename, resolve_export_size, ExportOptions, FormatPlugin,
    ImportOptions, Payload,
};

const LABELME_VERSION: &str = "5.6.0";

// ============================================================================
// Labelme schema types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
struct LabelmeDoc {
    #[serde(default)]
    shapes: Vec<LabelmeShape>,
    #[serde(rename = "imagePath", default)]
    image_path: Option<String>,
    #[serde(rename = "imageHeight")]
    image_height: u32,
    #[serde(rename = "imageWidth")]
    image_width: u32,
}

#[derive(Debug, Deserialize)]
struct LabelmeShape {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    points: Vec<[f64; 2]>,
    #[serde(rename = "shape_type", default)]
    shape_type: String,
}

#[derive(Debug, Serialize)]
struct LabelmeDocOut {
    version: &'static str,
    flags: serde_json::Map<String, serde_json::Value>,
    shapes: Vec<LabelmeShapeOut>,
    #[serde(rename = "imagePath")]
    image_path: String,
    #[serde(rename = "imageData")]
    image_data: Option<String>,
    #[serde(rename = "imageHeight")]
    image_height: u32,
    #[serde(rename = "imageWidth")]
    image_width: u32,
}

#[derive(Debug, Serialize)]
struct LabelmeShapeOut {
    label: String,
    points: Vec<[f64; 2]>,
    group_id: Option<u32>,
    shape_type: &'static str,
    flags: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Plugin
// ============================================================================

/// The Labelme JSON polygon schema.
pub struct Labelme;

impl FormatPlugin for Labelme {
    fn name(&self) -> &'static str {
        "labelme"
    }

    fn can_import(&self) -> bool {
        true
    }

    fn can_export(&self) -> bool {
        true
    }

    fn import_set(
        &self,
        dataset: &mut Dataset,
        bytes: &[u8],
        _options: &ImportOptions,
    ) -> Result<(), AnnoboxError> {
        let doc: LabelmeDoc =
            serde_json::from_slice(bytes).map_err(|source| AnnoboxError::Parse {
                format: "labelme json",
                message: source.to_string(),
            })?;

        let had_image_path = dataset.image_path().map(str::to_string);
        dataset.clear();

        let size = ImageSize::new(doc.image_width, doc.image_height);
        dataset.set_image_size(size);

        // A path already bound to the dataset wins over the document's.
        if let Some(path) = had_image_path.or(doc.image_path) {
            dataset.set_image_path(path);
        }

        for (shape_idx, shape) in doc.shapes.into_iter().enumerate() {
            if shape.shape_type != "rectangle" {
                continue;
            }
            if shape.points.is_empty() {
                return Err(AnnoboxError::Parse {
                    format: "labelme json",
                    message: format!("shape[{shape_idx}] is a rectangle with no points"),
                });
            }

            let mut min = shape.points[0];
            let mut max = shape.points[0];
            for [x, y] in &shape.points[1..] {
                min[0] = min[0].min(*x);
                min[1] = min[1].min(*y);
                max[0] = max[0].max(*x);
                max[1] = max[1].max(*y);
            }

            let mut bbox = BBox::new(
                [min[0], min[1], max[0], max[1]],
                BoxFormat::Ltrb,
                Space::Pixel,
            )?
            .with_image_size(size);
            if let Some(label) = shape.label {
                bbox.set_label(label);
            }

            dataset.push(Annotation::new(bbox));
        }

        Ok(())
    }

    fn export_set(
        &self,
        dataset: &Dataset,
        options: &ExportOptions,
    ) -> Result<Payload, AnnoboxError> {
        let size = resolve_export_size(dataset)?;
        let image_path = dataset
            .image_path()
            .map(image_basename)
            .ok_or(AnnoboxError::MissingImagePath)?;

        let mut shapes = Vec::with_capacity(dataset.len());
        for record in dataset.records() {
            let [l, t, r, b] = record.bbox.ltrb(Space::Pixel, Some(size))?;
            let label = apply_label_map(record.bbox.raw_label(), options.label_map.as_ref())?;

            shapes.push(LabelmeShapeOut {
                label,
                points: vec![[l, t], [r, b]],
                group_id: None,
                shape_type: "rectangle",
                flags: serde_json::Map::new(),
            });
        }

        let doc = LabelmeDocOut {
            version: LABELME_VERSION,
            flags: serde_json::Map::new(),
            shapes,
            image_path,
            image_data: None,
            image_height: size.height,
            image_width: size.width,
        };

        let json = serde_json::to_string_pretty(&doc).map_err(|source| AnnoboxError::Parse {
            format: "labelme json",
            message: source.to_string(),
        })?;
        Ok(Payload::Text(json))
    }
}
