use image::RgbImage;
use std::time::Duration;

use crate::keys::Key;

/// Somewhere to show the live preview and collect key presses.
pub trait PreviewDisplay {
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<(), DisplayError>;

    /// Block for at most `timeout` waiting for one key press.
    fn wait_for_key(&mut self, timeout: Duration) -> Result<Option<Key>, DisplayError>;

    /// Tear down every window this display opened. Safe to call more than once.
    fn close(&mut self);
}

impl<T: PreviewDisplay + ?Sized> PreviewDisplay for Box<T> {
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<(), DisplayError> {
        (**self).show(title, image)
    }

    fn wait_for_key(&mut self, timeout: Duration) -> Result<Option<Key>, DisplayError> {
        (**self).wait_for_key(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("window error: {0}")]
    Window(String),
    #[error("display backend {0:?} is not available in this build")]
    Unavailable(String),
}
