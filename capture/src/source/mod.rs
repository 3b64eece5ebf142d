pub mod device;
pub mod multipart;
pub mod stream;
pub mod traits;

use block_portrait_common::config::{CaptureConfig, SourceKind};

pub use device::DeviceSource;
pub use stream::StreamSource;
pub use traits::{FrameSource, GrabError, SourceError};

/// Open the camera selected by `capture.source`.
pub fn open_source(config: &CaptureConfig) -> Result<Box<dyn FrameSource>, SourceError> {
    match config.source {
        SourceKind::Device => Ok(Box::new(DeviceSource::open(config)?)),
        SourceKind::Stream => {
            let url = config.stream_url.as_deref().ok_or(SourceError::MissingUrl)?;
            Ok(Box::new(StreamSource::open(url)?))
        }
    }
}
