pub mod display;
pub mod keys;
pub mod process;
pub mod session;
pub mod source;

pub use session::{CaptureError, CaptureOutcome, CaptureSession, CaptureSettings};
