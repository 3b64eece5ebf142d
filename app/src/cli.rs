use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turn webcam portraits into blocks for the career fair add-on.
#[derive(Parser, Debug)]
#[command(name = "block-portrait", version, about)]
pub struct Cli {
    /// TOML config describing the packs and the camera.
    #[arg(long, default_value = "block-portrait.toml")]
    pub config: PathBuf,
    /// Number of blocks to add.
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=50)
    )]
    pub count: u32,
    /// Remove all blocks and portraits.
    #[arg(short, long, default_value_t = false)]
    pub reset: bool,
    /// Increase output detail.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Manage textures of the demo resource pack.
    #[command(subcommand)]
    DemoPack(DemoPackCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DemoPackCommand {
    /// Install the next texture variant over the target texture.
    Swap,
    /// Copy a square image into the pack as a small texture.
    Import {
        /// Image to import.
        src: PathBuf,
        /// File name inside the pack's texture directory.
        name: String,
    },
}
