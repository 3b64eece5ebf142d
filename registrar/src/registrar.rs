use block_portrait_common::config::{BlockConfig, Config, PathsConfig};
use block_portrait_common::naming::BlockName;
use block_portrait_common::texture::Texture;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::behavior::BehaviorDefinition;
use crate::lang;
use crate::manifest::{blocks_baseline, terrain_baseline, JsonManifest};
use crate::RegistrarError;

/// A block that made it into the packs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBlock {
    pub display_name: String,
    /// Namespaced identifier, e.g. `ade_career_fair:ada_lovelace`.
    pub identifier: String,
}

impl RegisteredBlock {
    /// Chat command that hands the block to the player.
    pub fn give_command(&self) -> String {
        format!("/give @s {}", self.identifier)
    }
}

/// Writes new blocks into the behavior and resource packs.
pub struct AssetRegistrar {
    paths: PathsConfig,
    block: BlockConfig,
}

impl AssetRegistrar {
    pub fn new(paths: PathsConfig, block: BlockConfig) -> Self {
        Self { paths, block }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.paths.clone(), config.block.clone())
    }

    pub fn base_block(&self) -> Result<BlockName, RegistrarError> {
        Ok(BlockName::new(&self.block.base_name)?)
    }

    /// Texture shared by the top and bottom faces of every block.
    pub fn base_texture_path(&self) -> Result<PathBuf, RegistrarError> {
        let base = self.base_block()?;
        Ok(self.paths.texture_dir().join(format!("{}.png", base.id())))
    }

    /// Add one block to the packs.
    ///
    /// Writes, in order: the behavior definition (never overwritten), the
    /// lang entry, the PNG texture when `persist_texture` is set, the terrain
    /// texture entry and the per-face texture mapping. A failure stops the
    /// sequence; earlier writes are not rolled back.
    pub fn register(
        &self,
        name: &BlockName,
        texture: &Texture,
        persist_texture: bool,
    ) -> Result<RegisteredBlock, RegistrarError> {
        let prefix = self.block.namespace_prefix();
        let id = name.id();
        let identifier = name.qualified(&prefix);

        let behavior_path = self.paths.behavior_blocks_dir().join(format!("{id}.json"));
        BehaviorDefinition::new(
            &self.block.format_version,
            &identifier,
            &self.block.menu_category,
            self.block.light_emission,
        )
        .write_new(&behavior_path)?;
        debug!(path = behavior_path.display().to_string(), "behavior definition written");

        lang::append_entry(&self.paths.lang_file(), &identifier, name.display())?;

        if persist_texture {
            let texture_path = self.paths.texture_dir().join(format!("{id}.png"));
            texture.save_png_new(&texture_path)?;
            debug!(path = texture_path.display().to_string(), "texture written");
        }

        let mut terrain = JsonManifest::load_or(&self.paths.terrain_manifest(), terrain_baseline)?;
        terrain
            .object_mut("texture_data")?
            .insert(id.to_string(), json!({ "textures": format!("textures/blocks/{id}") }));
        terrain.save()?;

        let base_id = self.base_block()?.id().to_string();
        let mut blocks = JsonManifest::load_or(&self.paths.blocks_manifest(), || {
            blocks_baseline(&self.block.format_version)
        })?;
        blocks.insert(
            identifier.clone(),
            json!({
                "textures": {
                    "up": base_id,
                    "down": base_id,
                    "north": id,
                    "south": id,
                    "east": id,
                    "west": id,
                }
            }),
        );
        blocks.save()?;

        info!(identifier, name = name.display(), persist_texture, "block registered");
        Ok(RegisteredBlock {
            display_name: name.display().to_string(),
            identifier,
        })
    }

    /// Register the base block unless `blocks.json` already has it. Its
    /// texture must already be in the pack and is left untouched.
    /// Returns the block when this call added it.
    pub fn ensure_base_block(&self) -> Result<Option<RegisteredBlock>, RegistrarError> {
        let base = self.base_block()?;
        let identifier = base.qualified(&self.block.namespace_prefix());
        let blocks = JsonManifest::load_or(&self.paths.blocks_manifest(), || {
            blocks_baseline(&self.block.format_version)
        })?;
        if blocks.contains(&identifier) {
            debug!(identifier, "base block already registered");
            return Ok(None);
        }

        let texture = Texture::open(&self.base_texture_path()?)?;
        let registered = self.register(&base, &texture, false)?;
        Ok(Some(registered))
    }
}
