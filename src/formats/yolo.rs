//! YOLO text-file reader and writer.
//!
//! One annotation per line: `class cx cy w h [extra...]`, all coordinates
//! normalized to the unit interval. Lines with fewer than five tokens are
//! skipped rather than rejected; trailing numeric fields beyond the fifth
//! token are preserved as opaque record metadata.

use std::fmt::Write as _;
use std::path::Path;

use crate::dataset::{Annotation, Dataset};
use crate::error::AnnoboxError;
use crate::geom::{BBox, BoxFormat, ImageSize, Space};

use super::{
    apply_label_map, probe_image_size, resolve_export_size, ExportOptions, FormatPlugin,
    ImportOptions, Payload,
};

/// Extra trailing fields land in the record attributes under this key,
/// space-joined in their original token order.
pub const EXTRA_FIELDS_KEY: &str = "extra";

/// The whitespace-delimited normalized-coordinate text schema.
pub struct Yolo;

impl FormatPlugin for Yolo {
    fn name(&self) -> &'static str {
        "yolo"
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
        options: &ImportOptions,
    ) -> Result<(), AnnoboxError> {
        let text = std::str::from_utf8(bytes).map_err(|source| AnnoboxError::Parse {
            format: "yolo text",
            message: format!("input is not valid UTF-8: {source}"),
        })?;

        // Resolve the upgrade size before clearing: the cached size and
        // image path are part of the metadata being consulted.
        let upgrade_size = if options.norm_to_pixel {
            Some(discover_image_size(dataset)?)
        } else {
            None
        };
        let had_image_path = dataset.image_path().map(str::to_string);

        dataset.clear();
        if let Some(path) = had_image_path {
            dataset.set_image_path(path);
        }
        if let Some(size) = upgrade_size {
            dataset.set_image_size(size);
        }

        for (line_idx, line) in text.lines().enumerate() {
            let line_num = line_idx + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 5 {
                // Malformed or empty rows are skipped, not fatal.
                continue;
            }

            let label = parse_class_token(tokens[0], line_num)?;
            let mut coords = [0.0; 4];
            for (slot, token) in coords.iter_mut().zip(&tokens[1..5]) {
                *slot = parse_coord_token(token, line_num)?;
            }

            let mut bbox = BBox::new(coords, BoxFormat::Cxcywh, Space::Normalized)?
                .with_label(label);
            if let Some(size) = upgrade_size {
                bbox = bbox.with_image_size(size).reprojected(Space::Pixel)?;
            }

            let mut record = Annotation::new(bbox);
            if tokens.len() > 5 {
                for token in &tokens[5..] {
                    parse_coord_token(token, line_num)?;
                }
                record = record.with_attribute(EXTRA_FIELDS_KEY, tokens[5..].join(" "));
            }

            dataset.push(record);
        }

        Ok(())
    }

    fn export_set(
        &self,
        dataset: &Dataset,
        options: &ExportOptions,
    ) -> Result<Payload, AnnoboxError> {
        // Only pixel-space boxes without their own reference size force the
        // shared resolution order; a fully normalized dataset exports with
        // no image size at all.
        let needs_size = dataset
            .records()
            .iter()
            .any(|rec| rec.bbox.space() == Space::Pixel && rec.bbox.image_size().is_none());
        let size = if needs_size {
            Some(resolve_export_size(dataset)?)
        } else {
            None
        };

        let mut out = String::new();
        for record in dataset.records() {
            let [cx, cy, w, h] = record.bbox.to_format(BoxFormat::Cxcywh, Space::Normalized, size)?;

            let label = apply_label_map(record.bbox.raw_label(), options.label_map.as_ref())?;
            if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AnnoboxError::NonNumericLabel(label));
            }

            writeln!(out, "{label} {cx:.6} {cy:.6} {w:.6} {h:.6}").expect("write to string");
        }

        Ok(Payload::Text(out))
    }
}

/// The image size used to upgrade normalized boxes to pixel space:
/// the dataset's cached size, else a header probe of the dataset's image.
fn discover_image_size(dataset: &Dataset) -> Result<ImageSize, AnnoboxError> {
    if let Some(size) = dataset.image_size() {
        return Ok(size);
    }
    match dataset.image_path() {
        Some(path) => probe_image_size(Path::new(path)),
        None => Err(AnnoboxError::MissingReference),
    }
}

fn parse_class_token(raw: &str, line_num: usize) -> Result<String, AnnoboxError> {
    // Class ids arrive as "1" or "1.0"; both read back as the integer
    // string "1".
    let value = raw.parse::<f64>().map_err(|_| AnnoboxError::Parse {
        format: "yolo text",
        message: format!("line {line_num}: invalid class id '{raw}'"),
    })?;
    if !value.is_finite() {
        return Err(AnnoboxError::Parse {
            format: "yolo text",
            message: format!("line {line_num}: class id '{raw}' is not a finite number"),
        });
    }
    Ok(format!("{}", value as i64))
}

fn parse_coord_token(raw: &str, line_num: usize) -> Result<f64, AnnoboxError> {
    raw.parse::<f64>().map_err(|_| AnnoboxError::Parse {
        format: "yolo text",
        message: format!("line {line_num}: invalid numeric field '{raw}'"),
    })
}
