pub mod terminal;
pub mod traits;
#[cfg(feature = "window")]
pub mod window;

pub use terminal::TerminalDisplay;
pub use traits::{DisplayError, PreviewDisplay};
#[cfg(feature = "window")]
pub use window::WindowDisplay;

use block_portrait_common::config::DisplayKind;

/// Open the preview backend selected by `capture.display`.
pub fn open_display(kind: DisplayKind) -> Result<Box<dyn PreviewDisplay>, DisplayError> {
    match kind {
        DisplayKind::Terminal => Ok(Box::new(TerminalDisplay::new()?)),
        #[cfg(feature = "window")]
        DisplayKind::Window => Ok(Box::new(WindowDisplay::new())),
        #[cfg(not(feature = "window"))]
        DisplayKind::Window => Err(DisplayError::Unavailable("window".into())),
    }
}
