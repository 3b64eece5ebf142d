use block_portrait_common::config::DemoPackConfig;
use block_portrait_common::texture::{Texture, TextureError};
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use tracing::info;

/// Texture juggling for the sample resource pack used in demos.
pub struct DemoPack {
    config: DemoPackConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum DemoPackError {
    #[error("demo pack needs at least one texture variant")]
    NoVariants,
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("already have texture: {0}")]
    AlreadyExists(String),
    #[error("source image must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },
    #[error(transparent)]
    Texture(#[from] TextureError),
}

impl DemoPack {
    pub fn new(config: DemoPackConfig) -> Self {
        Self { config }
    }

    fn target_path(&self) -> PathBuf {
        self.config.textures_dir.join(&self.config.target)
    }

    /// Replace the target texture with the next variant in the list. The
    /// variant currently installed is found by comparing file contents; when
    /// none matches, the last variant is installed.
    pub fn swap(&self) -> Result<String, DemoPackError> {
        let variants = &self.config.variants;
        if variants.is_empty() {
            return Err(DemoPackError::NoVariants);
        }

        let target = self.target_path();
        let current = read(&target)?;
        let mut installed = None;
        for (idx, variant) in variants.iter().enumerate() {
            if read(&self.config.textures_dir.join(variant))? == current {
                installed = Some(idx);
                break;
            }
        }
        let next = match installed {
            Some(idx) => &variants[(idx + 1) % variants.len()],
            None => &variants[variants.len() - 1],
        };

        let src = self.config.textures_dir.join(next);
        std::fs::copy(&src, &target).map_err(|e| io_err(&src, e))?;
        info!(texture = self.config.target, variant = next, "set demo texture");
        Ok(next.clone())
    }

    /// Shrink a square photo to the demo texture size and add it to the pack
    /// as `name`.
    pub fn import(&self, src: &Path, name: &str) -> Result<PathBuf, DemoPackError> {
        let dest = self.config.textures_dir.join(name);
        if dest.exists() {
            return Err(DemoPackError::AlreadyExists(name.to_string()));
        }

        let img = image::open(src).map_err(|e| DemoPackError::Load {
            path: src.display().to_string(),
            reason: e.to_string(),
        })?;
        if img.width() != img.height() {
            return Err(DemoPackError::NotSquare {
                width: img.width(),
                height: img.height(),
            });
        }

        let side = self.config.import_size;
        let texture = Texture::new(img.resize_exact(side, side, FilterType::CatmullRom).to_rgb8());
        texture.save_png_new(&dest)?;
        info!(
            src = src.display().to_string(),
            dest = dest.display().to_string(),
            side,
            "imported demo texture"
        );
        Ok(dest)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, DemoPackError> {
    std::fs::read(path).map_err(|e| io_err(path, e))
}

fn io_err(path: &Path, source: std::io::Error) -> DemoPackError {
    DemoPackError::Io {
        path: path.display().to_string(),
        source,
    }
}
