//! The annotation dataset: an ordered record collection plus metadata.
//!
//! A [`Dataset`] is the unit of load/save. Format plugins populate it on
//! import and read it back through its accessors on export; the dataset
//! itself never interprets on-disk bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::AnnoboxError;
use crate::formats::{ExportOptions, FormatRegistry, ImportOptions};
use crate::geom::{BBox, ImageSize};

/// One annotation: a bounding box plus an open attribute bag for
/// format-specific extras (truncated/pose/difficulty flags, trailing
/// numeric fields, and the like).
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub bbox: BBox,
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    /// Creates a record with no extra attributes.
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute to the record.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// An ordered collection of [`Annotation`] records for a single image,
/// with a side-channel metadata store.
///
/// Insertion order is the only order; nothing is ever sorted implicitly.
/// The well-known metadata (image path, label-file path, cached image
/// size) is typed; anything else lives in a string-to-string overflow
/// bucket and is passed through opaquely.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<Annotation>,
    image_path: Option<String>,
    label_path: Option<String>,
    image_size: Option<ImageSize>,
    extra: BTreeMap<String, String>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dataset bound to an image path.
    pub fn for_image(image_path: impl Into<String>) -> Self {
        Self {
            image_path: Some(image_path.into()),
            ..Self::default()
        }
    }

    /// Appends a record, preserving insertion order.
    pub fn push(&mut self, record: Annotation) {
        self.records.push(record);
    }

    /// Replaces the record at `index`.
    pub fn replace(&mut self, index: usize, record: Annotation) -> Result<(), AnnoboxError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(AnnoboxError::IndexOutOfRange { index, len })?;
        *slot = record;
        Ok(())
    }

    /// Removes and returns the record at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Annotation, AnnoboxError> {
        if index >= self.records.len() {
            return Err(AnnoboxError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Empties the record sequence and the whole metadata store,
    /// including the image path.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are present.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records in insertion order.
    pub fn records(&self) -> &[Annotation] {
        &self.records
    }

    /// Mutable access to the records, insertion order preserved.
    pub fn records_mut(&mut self) -> &mut [Annotation] {
        &mut self.records
    }

    /// The image path, if set.
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    /// Sets the image path. Once set it can only be removed by
    /// [`clear`](Self::clear), never reassigned to absent.
    pub fn set_image_path(&mut self, image_path: impl Into<String>) {
        self.image_path = Some(image_path.into());
    }

    /// The label-file path, if one was recorded during a load.
    pub fn label_path(&self) -> Option<&str> {
        self.label_path.as_deref()
    }

    /// Records the label-file path.
    pub fn set_label_path(&mut self, label_path: impl Into<String>) {
        self.label_path = Some(label_path.into());
    }

    /// The cached image size, if known.
    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    /// Caches the image size.
    pub fn set_image_size(&mut self, size: ImageSize) {
        self.image_size = Some(size);
    }

    /// Looks up a key in the overflow metadata bucket. Absent keys read
    /// as `None`, never as an error.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Sets a key in the overflow metadata bucket.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Deletes a key from the overflow metadata bucket.
    pub fn remove_meta(&mut self, key: &str) -> Result<(), AnnoboxError> {
        self.extra
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AnnoboxError::MetadataKeyNotFound(key.to_string()))
    }

    /// Merges a batch of key/value pairs into the overflow bucket.
    pub fn merge_meta(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        self.extra.extend(entries);
    }

    /// Loads records from exactly one byte source.
    ///
    /// Pass either an in-memory buffer or a file path; neither is a
    /// configuration error ([`AnnoboxError::MissingSource`]), and when
    /// both are given the in-memory buffer wins. A file source is read
    /// fully into memory before parsing and its path is recorded as the
    /// label-file path. Plugins clear the dataset before populating, so
    /// no stale records survive a reload.
    pub fn load(
        &mut self,
        registry: &FormatRegistry,
        format: &str,
        bytes: Option<&[u8]>,
        path: Option<&Path>,
        options: &ImportOptions,
    ) -> Result<(), AnnoboxError> {
        if bytes.is_none() && path.is_none() {
            return Err(AnnoboxError::MissingSource);
        }

        let file_buf = match (bytes, path) {
            (None, Some(path)) => Some(fs::read(path)?),
            _ => None,
        };
        let buf = bytes.unwrap_or_else(|| file_buf.as_deref().expect("one source is present"));

        let plugin = registry.get(format)?;
        if !plugin.can_import() {
            return Err(AnnoboxError::ImportUnsupported(format.to_string()));
        }

        plugin.import_set(self, buf, options)?;

        if let Some(path) = path {
            self.set_label_path(path.to_string_lossy());
        }
        Ok(())
    }

    /// Loads records from an in-memory buffer with default options.
    pub fn load_bytes(
        &mut self,
        registry: &FormatRegistry,
        format: &str,
        bytes: &[u8],
    ) -> Result<(), AnnoboxError> {
        self.load(registry, format, Some(bytes), None, &ImportOptions::default())
    }

    /// Loads records from a file with default options.
    pub fn load_path(
        &mut self,
        registry: &FormatRegistry,
        format: &str,
        path: &Path,
    ) -> Result<(), AnnoboxError> {
        self.load(registry, format, None, Some(path), &ImportOptions::default())
    }

    /// Renders the dataset through a format plugin into bytes.
    ///
    /// Text-producing plugins are encoded as UTF-8. The plugin reads the
    /// dataset through its accessors only; an export either yields a
    /// complete payload or an error, never a partial write.
    pub fn dump(
        &self,
        registry: &FormatRegistry,
        format: &str,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, AnnoboxError> {
        let plugin = registry.get(format)?;
        if !plugin.can_export() {
            return Err(AnnoboxError::ExportUnsupported(format.to_string()));
        }
        Ok(plugin.export_set(self, options)?.into_bytes())
    }

    /// Dumps the dataset and writes the bytes to `path`, replacing any
    /// existing file.
    pub fn save(
        &self,
        registry: &FormatRegistry,
        path: &Path,
        format: &str,
        options: &ExportOptions,
    ) -> Result<(), AnnoboxError> {
        let payload = self.dump(registry, format, options)?;
        fs::write(path, payload)?;
        Ok(())
    }
}
