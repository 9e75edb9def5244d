//! Asset loading: OBJ models and decoded images

pub mod image;
pub mod obj;

pub use self::image::ImageData;
pub use obj::{LoadedModel, ObjLoader};

use std::path::PathBuf;
use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Malformed content
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// The file parsed but cannot be used
    #[error("Invalid asset: {0}")]
    Invalid(String),

    /// Image decoding failed
    #[error("Failed to load image: {0}")]
    LoadFailed(String),
}
