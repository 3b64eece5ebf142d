use block_portrait_common::frame::RawFrame;

/// A camera that hands out frames on demand.
///
/// `read` failing is the normal "no frame yet" signal of a camera that is
/// still warming up; callers decide how often to retry.
pub trait FrameSource {
    fn read(&mut self) -> Result<RawFrame, GrabError>;

    /// Stop the device and free its handle. Safe to call more than once.
    fn release(&mut self);

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read(&mut self) -> Result<RawFrame, GrabError> {
        (**self).read()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("camera stream ended")]
    EndOfStream,
    #[error("camera has been released")]
    Released,
    #[error("failed to read from camera: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while opening a camera.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to spawn {bin}: {reason}")]
    Spawn { bin: String, reason: String },
    #[error("HTTP connection failed: {0}")]
    HttpConnect(reqwest::Error),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("no stream_url configured for the stream source")]
    MissingUrl,
    #[error("input format {0} needs capture.device set to the camera's name")]
    MissingDevice(String),
}
