use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::RegistrarError;

/// A JSON object file that is read, edited in memory and written back whole.
///
/// Key order is kept as found on disk.
#[derive(Debug)]
pub struct JsonManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl JsonManifest {
    /// A manifest for `path` holding `root`, without reading what is on disk.
    pub fn fresh(path: &Path, root: Map<String, Value>) -> Self {
        Self {
            path: path.to_path_buf(),
            root,
        }
    }

    /// Load `path`, or start from `baseline` if the file does not exist yet.
    pub fn load_or(
        path: &Path,
        baseline: impl FnOnce() -> Map<String, Value>,
    ) -> Result<Self, RegistrarError> {
        let root = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(RegistrarError::ManifestShape {
                        path: path.display().to_string(),
                        reason: "top level is not an object".into(),
                    })
                }
                Err(e) => {
                    return Err(RegistrarError::Json {
                        path: path.display().to_string(),
                        source: e,
                    })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    path = path.display().to_string(),
                    "manifest missing, starting from baseline"
                );
                baseline()
            }
            Err(e) => return Err(RegistrarError::io(path, e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.root.insert(key.into(), value);
    }

    /// The object stored under `key`, created empty when absent.
    pub fn object_mut(&mut self, key: &str) -> Result<&mut Map<String, Value>, RegistrarError> {
        let entry = self
            .root
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        entry.as_object_mut().ok_or_else(|| RegistrarError::ManifestShape {
            path: self.path.display().to_string(),
            reason: format!("{key:?} is not an object"),
        })
    }

    pub fn save(&self) -> Result<(), RegistrarError> {
        let json = serde_json::to_string(&self.root).map_err(|e| RegistrarError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, json).map_err(|e| RegistrarError::io(&self.path, e))?;
        debug!(path = self.path.display().to_string(), "manifest written");
        Ok(())
    }
}

/// `textures/terrain_texture.json` as left by a reset.
pub fn terrain_baseline() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("texture_name".into(), Value::from("atlas.terrain"));
    map.insert("texture_data".into(), Value::Object(Map::new()));
    map
}

/// `blocks.json` as left by a reset.
pub fn blocks_baseline(format_version: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("format_version".into(), Value::from(format_version));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("block-portrait-manifest-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_starts_from_baseline() {
        let path = temp_file("missing.json");
        let _ = std::fs::remove_file(&path);
        let manifest = JsonManifest::load_or(&path, terrain_baseline).unwrap();
        assert_eq!(manifest.root.get("texture_name"), Some(&json!("atlas.terrain")));
        assert!(!path.exists());
    }

    #[test]
    fn key_order_survives_round_trip() {
        let path = temp_file("order.json");
        std::fs::write(&path, r#"{"zeta":1,"alpha":2}"#).unwrap();
        let mut manifest = JsonManifest::load_or(&path, Map::new).unwrap();
        manifest.insert("mid", json!(3));
        manifest.save().unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn non_object_section_is_an_error() {
        let path = temp_file("bad_section.json");
        std::fs::write(&path, r#"{"texture_data":[]}"#).unwrap();
        let mut manifest = JsonManifest::load_or(&path, Map::new).unwrap();
        assert!(matches!(
            manifest.object_mut("texture_data"),
            Err(RegistrarError::ManifestShape { .. })
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn fresh_manifest_overwrites_unreadable_file() {
        let path = temp_file("fresh.json");
        std::fs::write(&path, "{\"format_version\": trunc").unwrap();
        JsonManifest::fresh(&path, blocks_baseline("1.19.30"))
            .save()
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"format_version":"1.19.30"}"#
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn array_root_rejected() {
        let path = temp_file("array.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            JsonManifest::load_or(&path, Map::new),
            Err(RegistrarError::ManifestShape { .. })
        ));
        let _ = std::fs::remove_file(&path);
    }
}
