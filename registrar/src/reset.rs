use block_portrait_common::config::{BlockConfig, PathsConfig};
use block_portrait_common::naming::normalize_name;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

use crate::lang;
use crate::manifest::{blocks_baseline, terrain_baseline, JsonManifest};
use crate::RegistrarError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub behavior_files_removed: usize,
    pub textures_removed: usize,
}

/// Remove everything the tool has added to the packs. The base block's
/// texture stays; its registration goes with the rest.
pub fn reset(paths: &PathsConfig, block: &BlockConfig) -> Result<ResetReport, RegistrarError> {
    let behavior_files_removed = remove_matching(&paths.behavior_blocks_dir(), |name| {
        name.ends_with(".json")
    })?;
    info!(count = behavior_files_removed, "removed block behavior jsons");

    lang::truncate(&paths.lang_file())?;
    info!("cleared lang file");

    let keep = format!("{}.png", normalize_name(&block.base_name));
    let textures_removed = remove_matching(&paths.texture_dir(), |name| {
        name != keep && name.ends_with(".png")
    })?;
    info!(count = textures_removed, "removed block textures");

    let mut terrain = JsonManifest::load_or(&paths.terrain_manifest(), terrain_baseline)?;
    terrain.insert("texture_data", Value::Object(Map::new()));
    terrain.save()?;
    info!("cleaned up terrain texture file");

    // Whatever was there before, including a damaged file, is replaced.
    JsonManifest::fresh(&paths.blocks_manifest(), blocks_baseline(&block.format_version))
        .save()?;
    info!("cleaned block resource file");

    Ok(ResetReport {
        behavior_files_removed,
        textures_removed,
    })
}

/// Delete regular files in `dir` whose name passes `matches`. Individual
/// failures are skipped; a missing directory counts as empty.
fn remove_matching(dir: &Path, matches: impl Fn(&str) -> bool) -> Result<usize, RegistrarError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = dir.display().to_string(), "directory missing, nothing to remove");
            return Ok(0);
        }
        Err(e) => return Err(RegistrarError::io(dir, e)),
    };

    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matches(name) || !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => count += 1,
            Err(e) => {
                debug!(path = path.display().to_string(), error = %e, "could not remove file")
            }
        }
    }
    Ok(count)
}
