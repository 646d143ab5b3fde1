//! Format plugins and the registry that resolves them by name.
//!
//! A plugin binds one on-disk annotation schema to the [`Dataset`]
//! contract: import parses a byte buffer into records, export renders the
//! records back out. Plugins are stateless and need not support both
//! directions; the capability they lack surfaces as a capability error
//! at the [`Dataset::load`]/[`Dataset::dump`] boundary.

pub mod labelme;
pub mod voc;
pub mod yolo;

use std::collections::BTreeMap;
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::AnnoboxError;
use crate::geom::ImageSize;

/// Options consumed on import.
#[derive(Clone, Debug, Default)]
pub struct ImportOptions {
    /// YOLO only: upgrade normalized boxes to pixel space on the way in,
    /// using the dataset's cached image size or a header probe of the
    /// referenced image.
    pub norm_to_pixel: bool,
}

/// Options consumed on export.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Optional source-label to destination-label remapping, applied
    /// uniformly by every plugin. An unmapped non-empty label is an
    /// error; an unset label exports as "0" without consulting the map.
    pub label_map: Option<BTreeMap<String, String>>,
}

/// What a plugin produces on export. Text payloads are encoded as UTF-8
/// by [`Dataset::dump`].
#[derive(Clone, Debug)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    /// The payload as raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }
}

/// One annotation schema, identified by name.
///
/// The default `import_set`/`export_set` implementations report the
/// missing capability, so a one-directional plugin only overrides the
/// direction it supports together with the matching `can_*` flag.
pub trait FormatPlugin {
    /// The registry name of the schema.
    fn name(&self) -> &'static str;

    fn can_import(&self) -> bool {
        false
    }

    fn can_export(&self) -> bool {
        false
    }

    /// Parses `bytes` into `dataset`, clearing it first.
    fn import_set(
        &self,
        dataset: &mut Dataset,
        bytes: &[u8],
        options: &ImportOptions,
    ) -> Result<(), AnnoboxError> {
        let _ = (dataset, bytes, options);
        Err(AnnoboxError::ImportUnsupported(self.name().to_string()))
    }

    /// Renders `dataset` into a payload, reading it through accessors only.
    fn export_set(
        &self,
        dataset: &Dataset,
        options: &ExportOptions,
    ) -> Result<Payload, AnnoboxError> {
        let _ = (dataset, options);
        Err(AnnoboxError::ExportUnsupported(self.name().to_string()))
    }
}

/// An explicit name-to-plugin lookup table.
///
/// Constructed once (normally via [`FormatRegistry::builtins`]) and passed
/// to the load/dump entry points; there is no ambient global registry.
/// Registration order is preserved, which matters only to future
/// autodetection; lookups are by exact name.
#[derive(Default)]
pub struct FormatRegistry {
    plugins: Vec<Box<dyn FormatPlugin>>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the three built-in formats registered.
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(labelme::Labelme));
        registry.register(Box::new(yolo::Yolo));
        registry.register(Box::new(voc::Voc));
        registry
    }

    /// Registers a plugin, replacing any existing plugin of the same name.
    pub fn register(&mut self, plugin: Box<dyn FormatPlugin>) {
        if let Some(existing) = self
            .plugins
            .iter_mut()
            .find(|existing| existing.name() == plugin.name())
        {
            *existing = plugin;
        } else {
            self.plugins.push(plugin);
        }
    }

    /// Resolves a plugin by exact name.
    pub fn get(&self, name: &str) -> Result<&dyn FormatPlugin, AnnoboxError> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name() == name)
            .map(Box::as_ref)
            .ok_or_else(|| AnnoboxError::FormatNotRegistered(name.to_string()))
    }

    /// The registered plugins in registration order.
    pub fn formats(&self) -> impl Iterator<Item = &dyn FormatPlugin> {
        self.plugins.iter().map(Box::as_ref)
    }
}

/// Resolves the image size a plugin needs for export.
///
/// Resolution order: the dataset's cached size, then the reference size on
/// the first record's box, then a header probe of the image at the
/// dataset's image path. The probed size is not cached back: plugins hold
/// a read-only view of the dataset during export.
pub(crate) fn resolve_export_size(dataset: &Dataset) -> Result<ImageSize, AnnoboxError> {
    if let Some(size) = dataset.image_size() {
        return Ok(size);
    }

    if let Some(size) = dataset.records().first().and_then(|rec| rec.bbox.image_size()) {
        return Ok(size);
    }

    match dataset.image_path() {
        Some(path) => probe_image_size(Path::new(path)),
        None => Err(AnnoboxError::MissingReference),
    }
}

/// Reads image dimensions from a file header without decoding pixels.
pub(crate) fn probe_image_size(path: &Path) -> Result<ImageSize, AnnoboxError> {
    let size = imagesize::size(path).map_err(|source| AnnoboxError::ImageSizeRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width = u32::try_from(size.width).map_err(|_| {
        AnnoboxError::Validation(format!("image width {} does not fit in u32", size.width))
    })?;
    let height = u32::try_from(size.height).map_err(|_| {
        AnnoboxError::Validation(format!("image height {} does not fit in u32", size.height))
    })?;

    Ok(ImageSize::new(width, height))
}

/// Applies the optional label map to a record's label.
///
/// An unset label falls back to "0" and skips the map; a set label with no
/// map passes through; a set label with a map must have an entry.
pub(crate) fn apply_label_map(
    label: Option<&str>,
    map: Option<&BTreeMap<String, String>>,
) -> Result<String, AnnoboxError> {
    match (label, map) {
        (None, _) => Ok("0".to_string()),
        (Some(label), None) => Ok(label.to_string()),
        (Some(label), Some(map)) => map
            .get(label)
            .cloned()
            .ok_or_else(|| AnnoboxError::LabelUnmapped(label.to_string())),
    }
}

/// The final path component of an image path, as stored in exported
/// `filename`/`imagePath` fields.
pub(crate) fn image_basename(image_path: &str) -> String {
    Path::new(image_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_path.to_string())
}
