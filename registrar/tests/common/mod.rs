#![allow(dead_code)]

use block_portrait_common::config::{BlockConfig, PathsConfig};
use block_portrait_common::texture::Texture;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::PathBuf;

/// A throwaway behavior + resource pack pair under the system temp dir.
pub struct TempPacks {
    pub root: PathBuf,
    pub paths: PathsConfig,
}

impl TempPacks {
    pub fn new(test: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "block-portrait-{test}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        let paths = PathsConfig {
            behavior_pack: root.join("behavior"),
            resource_pack: root.join("resource"),
        };
        fs::create_dir_all(paths.behavior_blocks_dir()).expect("create behavior dir");
        fs::create_dir_all(paths.texture_dir()).expect("create texture dir");
        fs::create_dir_all(paths.lang_file().parent().unwrap()).expect("create texts dir");
        Self { root, paths }
    }

    /// Put the base block's texture in place, as the pack ships it.
    pub fn with_base_texture(self) -> Self {
        solid_texture(16, [200, 180, 40])
            .save_png_new(&self.paths.texture_dir().join("eagle.png"))
            .expect("write base texture");
        self
    }

    pub fn read_json(&self, path: PathBuf) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).expect("read json")).expect("parse json")
    }
}

impl Drop for TempPacks {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

pub fn block_config() -> BlockConfig {
    BlockConfig::default()
}

pub fn solid_texture(side: u32, rgb: [u8; 3]) -> Texture {
    Texture::new(RgbImage::from_pixel(side, side, Rgb(rgb)))
}
