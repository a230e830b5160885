//! Command line and config file handling.
//!
//! Precedence: built-in defaults, then the TOML file, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use tui_match3::core::GameConfig;
use tui_match3::types::ColorType;

#[derive(Parser, Debug)]
#[command(name = "tui-match3")]
#[command(version, about = "Match-3 puzzle in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub game: GameArgs,

    /// Log file for play mode (RUST_LOG controls the level)
    #[arg(long, value_name = "FILE", global = true, default_value = "tui-match3.log")]
    pub log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal (default)
    Play {
        /// Keyboard only; do not capture the mouse
        #[arg(long)]
        no_mouse: bool,
    },
    /// Run headless: fill, make up to N swaps, print the final snapshot as JSON
    Simulate {
        #[arg(long, default_value_t = 10)]
        swaps: u32,

        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct GameArgs {
    /// TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub width: Option<u16>,

    #[arg(long, global = true)]
    pub height: Option<u16>,

    #[arg(long, global = true)]
    pub seed: Option<u32>,

    /// Delay between drop sweeps in milliseconds
    #[arg(long, global = true)]
    pub fill_ms: Option<u32>,

    /// Comma-separated spawn colors, e.g. red,blue,green
    #[arg(long, global = true, value_delimiter = ',', value_parser = parse_color)]
    pub palette: Option<Vec<ColorType>>,
}

fn parse_color(s: &str) -> Result<ColorType, String> {
    ColorType::from_str(s.trim()).ok_or_else(|| format!("unknown color '{}'", s))
}

impl GameArgs {
    /// Build the session config from defaults, file and flags, and validate it.
    pub fn resolve(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => GameConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate().context("invalid game configuration")?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut GameConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(fill_ms) = self.fill_ms {
            config.fill_time_ms = fill_ms;
        }
        if let Some(palette) = &self.palette {
            config.palette = palette.clone();
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

pub fn parse_config(text: &str) -> Result<GameConfig> {
    Ok(toml::from_str(text)?)
}
