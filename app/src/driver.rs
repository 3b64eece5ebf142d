use block_portrait_capture::display::{open_display, DisplayError};
use block_portrait_capture::source::device::check_ffmpeg_available;
use block_portrait_capture::source::{open_source, SourceError};
use block_portrait_capture::{CaptureError, CaptureOutcome, CaptureSession, CaptureSettings};
use block_portrait_common::config::{CaptureConfig, Config, PromptConfig, SourceKind};
use block_portrait_common::naming::{BlockName, NameError};
use block_portrait_registrar::demo_pack::{DemoPack, DemoPackError};
use block_portrait_registrar::{reset, AssetRegistrar, RegistrarError};
use tracing::{info, warn};

use crate::cli::{Cli, Command, DemoPackCommand};
use crate::prompt::NamePrompt;

/// Exit status when the user aborts a capture.
pub const ABORT_EXIT_CODE: i32 = 21;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("name prompt cancelled")]
    Cancelled,
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("capture aborted by user")]
    Aborted,
    #[error("failed to open camera: {0}")]
    Source(#[from] SourceError),
    #[error("preview failed: {0}")]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Registrar(#[from] RegistrarError),
    #[error("config has no [demo_pack] section")]
    NoDemoPack,
    #[error(transparent)]
    DemoPack(#[from] DemoPackError),
}

impl From<CaptureError> for AppError {
    fn from(e: CaptureError) -> Self {
        match e {
            CaptureError::Aborted => AppError::Aborted,
            CaptureError::Display(e) => AppError::Display(e),
        }
    }
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Aborted => ABORT_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Takes one photo with the configured camera and preview.
pub type CaptureFn<'a> = dyn FnMut(&CaptureConfig) -> Result<CaptureOutcome, AppError> + 'a;

/// Run the selected command. Returns the display names of the blocks added,
/// sorted, which is empty for reset and demo-pack.
pub fn run(
    cli: &Cli,
    config: &Config,
    prompt: &mut dyn NamePrompt,
    capture: &mut CaptureFn<'_>,
) -> Result<Vec<String>, AppError> {
    if let Some(Command::DemoPack(cmd)) = &cli.command {
        run_demo_pack(cmd, config)?;
        return Ok(Vec::new());
    }
    if cli.reset {
        let report = reset(&config.paths, &config.block)?;
        println!("Removed {} block behavior jsons", report.behavior_files_removed);
        println!("Removed {} block textures", report.textures_removed);
        return Ok(Vec::new());
    }

    let registrar = AssetRegistrar::from_config(config);
    let mut added = Vec::new();
    if let Some(base) = registrar.ensure_base_block()? {
        info!(identifier = base.identifier, "base block registered");
        added.push(base.display_name);
    }

    for n in 1..=cli.count {
        let name = ask_name(prompt, &config.prompt)?;
        info!(block = n, count = cli.count, name = name.display(), "taking portrait");
        match capture(&config.capture)? {
            CaptureOutcome::Accepted(texture) => {
                info!(name = name.display(), "portrait taken");
                let block = registrar.register(&name, &texture, true)?;
                if cli.verbose {
                    println!(
                        "Added new block, give to self with: {}",
                        block.give_command()
                    );
                }
                added.push(block.display_name);
            }
            CaptureOutcome::GaveUp => {
                warn!(name = name.display(), "camera never produced a frame, block skipped");
            }
        }
    }

    added.sort();
    println!("{}", summary(&added));
    Ok(added)
}

fn ask_name(prompt: &mut dyn NamePrompt, config: &PromptConfig) -> Result<BlockName, AppError> {
    let answer = prompt
        .ask(&config.title, &config.message)
        .ok_or(AppError::Cancelled)?;
    Ok(BlockName::new(&answer)?)
}

/// One capture session. The session owns the camera and the preview and has
/// released both by the time this returns, on every path.
pub fn capture_texture(capture: &CaptureConfig) -> Result<CaptureOutcome, AppError> {
    if capture.source == SourceKind::Device {
        check_ffmpeg_available(&capture.ffmpeg_bin);
    }
    let source = open_source(capture)?;
    let display = open_display(capture.display)?;
    let session = CaptureSession::new(source, display, CaptureSettings::from(capture));
    Ok(session.run()?)
}

fn run_demo_pack(cmd: &DemoPackCommand, config: &Config) -> Result<(), AppError> {
    let demo = config.demo_pack.clone().ok_or(AppError::NoDemoPack)?;
    let target = demo.target.clone();
    let pack = DemoPack::new(demo);
    match cmd {
        DemoPackCommand::Swap => {
            let variant = pack.swap()?;
            println!("Set {target} to: {variant}");
        }
        DemoPackCommand::Import { src, name } => {
            let dest = pack.import(src, name)?;
            println!("Imported {} as {}", src.display(), dest.display());
        }
    }
    Ok(())
}

/// `Successfully added N new block(s):` followed by the names as a JSON list
/// with `, ` between entries and non-ASCII characters escaped as `\uXXXX`.
fn summary(names: &[String]) -> String {
    let list = names
        .iter()
        .map(|n| ascii_json(n))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Successfully added {} new block(s):\r\n[{list}]",
        names.len()
    )
}

/// JSON string literal restricted to ASCII; characters outside the BMP
/// become surrogate pairs.
fn ascii_json(s: &str) -> String {
    let quoted = serde_json::Value::from(s).to_string();
    let mut out = String::with_capacity(quoted.len());
    for c in quoted.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
