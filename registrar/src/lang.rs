use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::RegistrarError;

/// `tile.<namespace:id>.name=<display name>` with the CRLF line ending the
/// game's `.lang` files use.
pub fn entry_line(qualified_id: &str, display_name: &str) -> String {
    format!("tile.{qualified_id}.name={display_name}\r\n")
}

pub fn append_entry(
    path: &Path,
    qualified_id: &str,
    display_name: &str,
) -> Result<(), RegistrarError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RegistrarError::io(path, e))?;
    file.write_all(entry_line(qualified_id, display_name).as_bytes())
        .map_err(|e| RegistrarError::io(path, e))
}

/// Empty the file, creating it if needed.
pub fn truncate(path: &Path) -> Result<(), RegistrarError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| RegistrarError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        assert_eq!(
            entry_line("ade_career_fair:ada_lovelace", "Ada Lovelace"),
            "tile.ade_career_fair:ada_lovelace.name=Ada Lovelace\r\n"
        );
    }

    #[test]
    fn append_then_truncate() {
        let path = std::env::temp_dir()
            .join(format!("block-portrait-lang-{}.lang", std::process::id()));
        let _ = std::fs::remove_file(&path);
        append_entry(&path, "ns:a", "A").unwrap();
        append_entry(&path, "ns:b", "B").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "tile.ns:a.name=A\r\ntile.ns:b.name=B\r\n"
        );
        truncate(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
        let _ = std::fs::remove_file(&path);
    }
}
