pub mod behavior;
pub mod demo_pack;
pub mod lang;
pub mod manifest;
pub mod registrar;
pub mod reset;

use block_portrait_common::naming::NameError;
use block_portrait_common::texture::TextureError;
use std::path::Path;

pub use registrar::{AssetRegistrar, RegisteredBlock};
pub use reset::{reset, ResetReport};

#[derive(Debug, thiserror::Error)]
pub enum RegistrarError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("unexpected layout in {path}: {reason}")]
    ManifestShape { path: String, reason: String },
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Name(#[from] NameError),
}

impl RegistrarError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
