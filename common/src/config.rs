use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub block: BlockConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub demo_pack: Option<DemoPackConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Roots of the two development packs the tool writes into.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub behavior_pack: PathBuf,
    pub resource_pack: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockConfig {
    /// Identifier namespace without the trailing colon, e.g. `ade_career_fair`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Display name of the placeholder block whose texture covers the top and
    /// bottom faces of every generated block.
    #[serde(default = "default_base_name")]
    pub base_name: String,
    #[serde(default = "default_light_emission")]
    pub light_emission: u8,
    #[serde(default = "default_format_version")]
    pub format_version: String,
    #[serde(default = "default_menu_category")]
    pub menu_category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local camera read through an ffmpeg subprocess.
    Device,
    /// HTTP multipart MJPEG stream.
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    /// Half-block preview drawn in the controlling terminal.
    Terminal,
    /// Native window; needs the `window` build feature.
    Window,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_source")]
    pub source: SourceKind,
    #[serde(default = "default_display")]
    pub display: DisplayKind,
    #[serde(default)]
    pub device_index: u32,
    /// ffmpeg demuxer used to open the camera (`v4l2`, `avfoundation`, `dshow`).
    #[serde(default = "default_input_format")]
    pub input_format: String,
    /// Explicit ffmpeg input; derived from `device_index` when unset.
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default = "default_texture_size")]
    pub texture_size: u32,
    #[serde(default = "default_preview_size")]
    pub preview_size: u32,
    #[serde(default = "default_key_wait_ms")]
    pub key_wait_ms: u64,
    #[serde(default = "default_warmup_attempts")]
    pub warmup_attempts: u32,
    #[serde(default = "default_window_title")]
    pub window_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_prompt_title")]
    pub title: String,
    #[serde(default = "default_prompt_message")]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoPackConfig {
    pub textures_dir: PathBuf,
    #[serde(default = "default_demo_target")]
    pub target: String,
    #[serde(default = "default_demo_variants")]
    pub variants: Vec<String>,
    #[serde(default = "default_import_size")]
    pub import_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            base_name: default_base_name(),
            light_emission: default_light_emission(),
            format_version: default_format_version(),
            menu_category: default_menu_category(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            display: default_display(),
            device_index: 0,
            input_format: default_input_format(),
            device: None,
            ffmpeg_bin: default_ffmpeg_bin(),
            stream_url: None,
            texture_size: default_texture_size(),
            preview_size: default_preview_size(),
            key_wait_ms: default_key_wait_ms(),
            warmup_attempts: default_warmup_attempts(),
            window_title: default_window_title(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            title: default_prompt_title(),
            message: default_prompt_message(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let capture = &self.capture;
        if capture.texture_size == 0 || capture.preview_size == 0 {
            return Err(ConfigError::Invalid(
                "capture.texture_size and capture.preview_size must be non-zero".into(),
            ));
        }
        if capture.warmup_attempts == 0 {
            return Err(ConfigError::Invalid(
                "capture.warmup_attempts must be at least 1".into(),
            ));
        }
        if capture.source == SourceKind::Stream && capture.stream_url.is_none() {
            return Err(ConfigError::Invalid(
                "capture.source = \"stream\" requires capture.stream_url".into(),
            ));
        }
        if self.block.namespace.is_empty() || self.block.namespace.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "block.namespace must be non-empty and must not contain ':', got {:?}",
                self.block.namespace
            )));
        }
        Ok(())
    }
}

impl PathsConfig {
    pub fn behavior_blocks_dir(&self) -> PathBuf {
        self.behavior_pack.join("blocks")
    }

    pub fn lang_file(&self) -> PathBuf {
        self.resource_pack.join("texts").join("en_US.lang")
    }

    pub fn texture_dir(&self) -> PathBuf {
        self.resource_pack.join("textures").join("blocks")
    }

    pub fn terrain_manifest(&self) -> PathBuf {
        self.resource_pack.join("textures").join("terrain_texture.json")
    }

    pub fn blocks_manifest(&self) -> PathBuf {
        self.resource_pack.join("blocks.json")
    }
}

impl BlockConfig {
    /// `namespace:` prefix used in identifiers and lang keys.
    pub fn namespace_prefix(&self) -> String {
        format!("{}:", self.namespace)
    }
}

impl CaptureConfig {
    /// The ffmpeg `-i` argument for the configured camera. `None` when the
    /// demuxer cannot address cameras by index (`dshow` wants the device's
    /// friendly name) and no explicit `device` is set.
    pub fn device_input(&self) -> Option<String> {
        if let Some(device) = &self.device {
            return Some(device.clone());
        }
        match self.input_format.as_str() {
            "v4l2" => Some(format!("/dev/video{}", self.device_index)),
            "avfoundation" => Some(format!("{}:none", self.device_index)),
            "dshow" => None,
            _ => Some(self.device_index.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_namespace() -> String {
    "ade_career_fair".into()
}
fn default_base_name() -> String {
    "Eagle".into()
}
fn default_light_emission() -> u8 {
    4
}
fn default_format_version() -> String {
    "1.19.30".into()
}
fn default_menu_category() -> String {
    "construction".into()
}
fn default_source() -> SourceKind {
    SourceKind::Device
}
fn default_display() -> DisplayKind {
    DisplayKind::Terminal
}
fn default_input_format() -> String {
    if cfg!(target_os = "macos") {
        "avfoundation".into()
    } else if cfg!(target_os = "windows") {
        "dshow".into()
    } else {
        "v4l2".into()
    }
}
fn default_ffmpeg_bin() -> String {
    "ffmpeg".into()
}
fn default_texture_size() -> u32 {
    256
}
fn default_preview_size() -> u32 {
    700
}
fn default_key_wait_ms() -> u64 {
    100
}
fn default_warmup_attempts() -> u32 {
    10
}
fn default_window_title() -> String {
    "Webcam".into()
}
fn default_prompt_title() -> String {
    "Create New Minecraft Block".into()
}
fn default_prompt_message() -> String {
    "Please enter your full name".into()
}
fn default_demo_target() -> String {
    "dirt.png".into()
}
fn default_demo_variants() -> Vec<String> {
    vec!["dirt_ben.png".into(), "dirt_green.png".into()]
}
fn default_import_size() -> u32 {
    32
}
fn default_log_level() -> String {
    "info".into()
}
