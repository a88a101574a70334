//! Command line configuration.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::assets::theme_exists;
use crate::message::Role;

/// Input path that reads the message from stdin.
pub const STDIN_INPUT: &str = "-";

/// Command line configuration for chatmark.
#[derive(Debug, Clone, Parser)]
#[command(name = "chatmark", version, about, long_about = None)]
pub struct Config {
    /// Markdown message file, or `-` for stdin
    #[arg(default_value = STDIN_INPUT)]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    pub output: PathBuf,

    /// Message author
    #[arg(long, value_enum, default_value_t = Role::Assistant)]
    pub role: Role,

    /// Message id carried by the delete control
    #[arg(long, default_value = "message-1")]
    pub id: String,

    /// Avatar image URL
    #[arg(long)]
    pub avatar: Option<String>,

    /// Syntax highlighting theme (base16-ocean.dark, InspiredGitHub, etc.)
    #[arg(long, default_value = "base16-ocean.dark")]
    pub theme: String,

    /// Show the regenerate control
    #[arg(long)]
    pub show_retry: bool,

    /// Print the message HTML to stdout instead of writing a page
    #[arg(long)]
    pub fragment: bool,

    /// Open the generated page in the default browser
    #[arg(long)]
    pub open: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Whether the message is read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input == Path::new(STDIN_INPUT)
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the input file does not exist or the theme is unknown.
    pub fn validate(&self) -> Result<()> {
        if !self.reads_stdin() && !self.input.exists() {
            bail!("Input file does not exist: {}", self.input.display());
        }

        if !theme_exists(&self.theme) {
            bail!("Unknown highlight theme: {}", self.theme);
        }

        Ok(())
    }
}
