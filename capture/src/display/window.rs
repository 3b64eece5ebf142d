use image::RgbImage;
use minifb::{KeyRepeat, Window, WindowOptions};
use std::time::{Duration, Instant};
use tracing::debug;

use super::traits::{DisplayError, PreviewDisplay};
use crate::keys::Key;

const POLL_STEP: Duration = Duration::from_millis(10);

/// Native preview window. The window is created lazily on the first frame so
/// it can take the preview's size.
pub struct WindowDisplay {
    window: Option<Window>,
    buffer: Vec<u32>,
    title: String,
}

impl WindowDisplay {
    pub fn new() -> Self {
        Self {
            window: None,
            buffer: Vec::new(),
            title: String::new(),
        }
    }
}

impl Default for WindowDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewDisplay for WindowDisplay {
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<(), DisplayError> {
        let (width, height) = (image.width() as usize, image.height() as usize);

        // each entry is 0x00RRGGBB for minifb
        self.buffer.clear();
        self.buffer.extend(image.pixels().map(|p| {
            let [r, g, b] = p.0;
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        }));

        if self.window.is_none() {
            let window = Window::new(title, width, height, WindowOptions::default())
                .map_err(|e| DisplayError::Window(e.to_string()))?;
            debug!(title, width, height, "preview window opened");
            self.window = Some(window);
            self.title = title.to_string();
        }
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| DisplayError::Window("window missing".into()))?;
        if self.title != title {
            window.set_title(title);
            self.title = title.to_string();
        }
        window
            .update_with_buffer(&self.buffer, width, height)
            .map_err(|e| DisplayError::Window(e.to_string()))
    }

    fn wait_for_key(&mut self, timeout: Duration) -> Result<Option<Key>, DisplayError> {
        let Some(window) = self.window.as_mut() else {
            std::thread::sleep(timeout);
            return Ok(None);
        };
        let deadline = Instant::now() + timeout;
        loop {
            window.update();
            if !window.is_open() {
                // Closing the window counts as quitting.
                return Ok(Some(Key::Escape));
            }
            if let Some(key) = window.get_keys_pressed(KeyRepeat::No).first() {
                let shift = window.is_key_down(minifb::Key::LeftShift)
                    || window.is_key_down(minifb::Key::RightShift);
                return Ok(Some(map_key(*key, shift)));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            std::thread::sleep(POLL_STEP.min(deadline - now));
        }
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            debug!("preview window closed");
        }
    }
}

fn map_key(key: minifb::Key, shift: bool) -> Key {
    match key {
        minifb::Key::Backspace => Key::Backspace,
        minifb::Key::Escape => Key::Escape,
        minifb::Key::Enter | minifb::Key::NumPadEnter => Key::Enter,
        minifb::Key::Space => Key::Space,
        minifb::Key::Q if shift => Key::Char('Q'),
        minifb::Key::Q => Key::Char('q'),
        _ => Key::Other,
    }
}
