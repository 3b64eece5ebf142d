use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::RegistrarError;

/// Behavior-pack block definition, `blocks/<id>.json`.
#[derive(Debug, Serialize)]
pub struct BehaviorDefinition<'a> {
    pub format_version: &'a str,
    #[serde(rename = "minecraft:block")]
    pub block: BlockSection<'a>,
}

#[derive(Debug, Serialize)]
pub struct BlockSection<'a> {
    pub description: Description<'a>,
    pub components: Components,
}

#[derive(Debug, Serialize)]
pub struct Description<'a> {
    pub identifier: &'a str,
    pub menu_category: MenuCategory<'a>,
}

#[derive(Debug, Serialize)]
pub struct MenuCategory<'a> {
    pub category: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Components {
    #[serde(rename = "minecraft:light_emission")]
    pub light_emission: u8,
}

impl<'a> BehaviorDefinition<'a> {
    pub fn new(
        format_version: &'a str,
        identifier: &'a str,
        category: &'a str,
        light_emission: u8,
    ) -> Self {
        Self {
            format_version,
            block: BlockSection {
                description: Description {
                    identifier,
                    menu_category: MenuCategory { category },
                },
                components: Components { light_emission },
            },
        }
    }

    /// Write to `path`, refusing to replace an existing definition.
    pub fn write_new(&self, path: &Path) -> Result<(), RegistrarError> {
        let json = serde_json::to_string(self).map_err(|e| RegistrarError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    RegistrarError::AlreadyExists(path.display().to_string())
                }
                _ => RegistrarError::io(path, e),
            })?;
        file.write_all(json.as_bytes()).map_err(|e| RegistrarError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_expected_shape() {
        let def = BehaviorDefinition::new("1.19.30", "ade_career_fair:eagle", "construction", 4);
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(
            value,
            json!({
                "format_version": "1.19.30",
                "minecraft:block": {
                    "description": {
                        "identifier": "ade_career_fair:eagle",
                        "menu_category": {"category": "construction"}
                    },
                    "components": {"minecraft:light_emission": 4}
                }
            })
        );
    }
}
