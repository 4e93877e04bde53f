use std::path::Path;

use super::IoError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows of RGBA8 texels.
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, IoError> {
        let name = name.into();
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(IoError::PixelCount {
                name,
                width,
                height,
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            name,
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Two-color checkerboard with square cells of `cell` texels.
    pub fn checkerboard(
        name: impl Into<String>,
        size: u32,
        cell: u32,
        a: [u8; 4],
        b: [u8; 4],
    ) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let even = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.extend_from_slice(if even { &a } else { &b });
            }
        }
        Self {
            name: name.into(),
            width: size,
            height: size,
            pixels,
        }
    }
}

/// Decodes a PNG or JPEG file into RGBA8.
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData, IoError> {
    let path = path.as_ref();
    let decoded = ::image::open(path).map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    log::debug!("loaded image '{name}' ({width}x{height})");
    Ok(ImageData {
        name,
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
