use lazy_regex::regex_replace_all;

/// Turn a display name into a string usable as a file name and as the path
/// part of a Minecraft identifier: every run of whitespace becomes `_`, then
/// the result is lower-cased.
pub fn normalize_name(name: &str) -> String {
    regex_replace_all!(r"\s+", name, "_").to_lowercase()
}

/// A display name paired with its normalized identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockName {
    display: String,
    id: String,
}

impl BlockName {
    pub fn new(display: &str) -> Result<Self, NameError> {
        if display.trim().is_empty() {
            return Err(NameError::Blank);
        }
        // Lang lines are `key=value\r\n` and the id becomes a file name.
        if display.contains(['\r', '\n', '/', '\\', ':']) {
            return Err(NameError::ForbiddenCharacter(display.to_string()));
        }
        Ok(Self {
            display: display.to_string(),
            id: normalize_name(display),
        })
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `namespace:id` with `prefix` already ending in a colon.
    pub fn qualified(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("block name is empty")]
    Blank,
    #[error("block name {0:?} contains a character that cannot appear in an identifier")]
    ForbiddenCharacter(String),
}
