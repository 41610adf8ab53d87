use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use prettiprint::mask::keep_from_signed;
use prettiprint::{
    mask_secret, BoxStyle, ConsoleConfig, ConsoleUtils, TableOptions, ThemeName, Verbosity,
};

use crate::demo::{self, Section};

#[derive(Parser)]
#[command(name = "prettiprint")]
#[command(author, version, about = "Themed terminal output helpers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./prettiprint.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Theme preset: dark, light or mono
    #[arg(short, long, global = true, env = "PRETTIPRINT_THEME")]
    theme: Option<ThemeName>,

    /// Output verbosity, 0 (silent) to 3 (debug)
    #[arg(short, long, global = true, env = "PRETTIPRINT_VERBOSITY")]
    verbosity: Option<i64>,

    #[arg(long, global = true, default_value_t = false)]
    no_emoji: bool,

    #[arg(long, global = true, default_value_t = false)]
    no_timestamps: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what each output helper looks like
    Demo {
        /// Sections to run; all non-interactive sections by default
        #[arg(short, long, value_enum, value_delimiter = ',')]
        section: Vec<Section>,
    },
    /// Mask a secret, leaving its last characters visible
    Mask {
        secret: String,

        #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
        keep: i64,

        #[arg(short, long, default_value = "*")]
        mask: String,
    },
    /// List theme presets and their styles
    Themes,
}

impl Cli {
    fn console_config(&self) -> Result<ConsoleConfig> {
        let mut config = ConsoleConfig::load(self.config.as_deref())
            .context("Failed to load console configuration")?;

        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(level) = self.verbosity {
            config.verbosity = Verbosity::new(level)?;
        }
        if self.no_emoji {
            config.emoji = false;
        }
        if self.no_timestamps {
            config.timestamps = false;
        }
        Ok(config)
    }

    fn execute_mask(&self, secret: &str, keep: i64, mask: &str) -> Result<()> {
        let keep = keep_from_signed(keep)?;
        println!("{}", mask_secret(secret, keep, mask)?);
        Ok(())
    }

    fn execute_themes(&self, console: &ConsoleUtils) -> Result<()> {
        for name in ThemeName::ALL {
            let preset = prettiprint::theme::preset(name);
            let rows = preset
                .iter()
                .map(|(key, descriptor)| [key.to_string(), descriptor.to_string()]);
            console.table(
                &["Key", "Style"],
                rows,
                TableOptions::default()
                    .title(name.to_string())
                    .box_style(BoxStyle::Simple),
            )?;
        }
        Ok(())
    }

    fn console(&self) -> Result<Arc<ConsoleUtils>> {
        let config = self.console_config()?;
        info!(
            "Console theme: {}, verbosity: {}",
            config.theme, config.verbosity
        );
        let console = Arc::new(ConsoleUtils::new(config));
        console.install_panic_hook();
        Ok(console)
    }

    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Demo { section } => demo::run(&*self.console()?, section),
            Commands::Mask { secret, keep, mask } => self.execute_mask(secret, *keep, mask),
            Commands::Themes => self.execute_themes(&*self.console()?),
        }
    }
}
