use image::{ImageFormat, RgbImage};
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::Path;

/// An RGB image ready to be stored as a block texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Load an existing texture file from disk.
    pub fn open(path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path).map_err(|e| TextureError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(img.to_rgb8()))
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Write the texture as PNG. Fails if `path` already exists.
    pub fn save_png_new(&self, path: &Path) -> Result<(), TextureError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| TextureError::Create(path.display().to_string(), e))?;
        let mut writer = BufWriter::new(file);
        self.image
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|e| TextureError::Encode(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load texture {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("failed to create texture file {0}: {1}")]
    Create(String, std::io::Error),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}
