/// A key press reported by a preview display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Escape,
    Enter,
    Space,
    Char(char),
    Other,
}

/// What the capture loop does with the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep previewing; the current frame is discarded.
    Retry,
    /// Keep the current frame as the texture.
    Accept,
    /// Stop capturing and cancel the whole run.
    Abort,
}

/// Backspace, Escape and `q`/`Q` abort; Enter and Space accept; anything
/// else, including no key at all, retries.
pub fn classify(key: Option<Key>) -> Decision {
    match key {
        Some(Key::Backspace | Key::Escape | Key::Char('q' | 'Q')) => Decision::Abort,
        Some(Key::Enter | Key::Space) => Decision::Accept,
        _ => Decision::Retry,
    }
}
