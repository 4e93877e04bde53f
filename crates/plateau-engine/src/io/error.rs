use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("mesh '{name}': {attribute} has {found} entries, expected {expected}")]
    AttributeMismatch {
        name: String,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("mesh '{name}': index {index} out of range for {vertices} vertices")]
    IndexOutOfRange {
        name: String,
        index: u16,
        vertices: usize,
    },

    #[error("image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("image '{name}': {width}x{height} needs {expected} bytes, got {found}")]
    PixelCount {
        name: String,
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },
}
