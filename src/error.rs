use std::path::PathBuf;
use thiserror::Error;

/// The main error type for annobox operations.
#[derive(Debug, Error)]
pub enum AnnoboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bounding box: {0}")]
    Validation(String),

    #[error("image size is unknown; cannot convert between pixel and normalized coordinates")]
    MissingReference,

    #[error("no format named '{0}' is registered")]
    FormatNotRegistered(String),

    #[error("metadata key '{0}' not found")]
    MetadataKeyNotFound(String),

    #[error("record index {index} is out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("format '{0}' does not support import")]
    ImportUnsupported(String),

    #[error("format '{0}' does not support export")]
    ExportUnsupported(String),

    #[error("either an in-memory byte buffer or a file path must be provided")]
    MissingSource,

    #[error("dataset has no image path set")]
    MissingImagePath,

    #[error("label '{0}' has no entry in the supplied label map")]
    LabelUnmapped(String),

    #[error("label '{0}' is not numeric; YOLO class ids must be integers")]
    NonNumericLabel(String),

    #[error("failed to parse {format} input: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("failed to read image dimensions from {path}: {source}")]
    ImageSizeRead {
        path: PathBuf,
        source: imagesize::ImageError,
    },
}
