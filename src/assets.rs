//! CSS asset bundling

use anyhow::{Context, Result, anyhow};
use std::sync::OnceLock;
use std::{fs, path::Path};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, css_for_theme_with_class_style};

use crate::markdown::CLASS_PREFIX;

const MESSAGE: &str = include_str!("../assets/message.css");

/// Stylesheet holding layout and copy affordance rules.
pub const MESSAGE_CSS: &str = "message.css";

/// Stylesheet holding token colors for the configured theme.
pub const HIGHLIGHT_CSS: &str = "highlight.css";

fn themes() -> &'static ThemeSet {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    THEMES.get_or_init(ThemeSet::load_defaults)
}

/// Whether a bundled highlight theme has this name.
pub fn theme_exists(theme: &str) -> bool {
    themes().themes.contains_key(theme)
}

/// Generates token color rules matching the highlighter's class names.
///
/// # Errors
///
/// Returns error if the theme is unknown or CSS generation fails.
pub fn highlight_css(theme: &str) -> Result<String> {
    let theme_data = themes()
        .themes
        .get(theme)
        .with_context(|| format!("Unknown highlight theme: {}", theme))?;

    css_for_theme_with_class_style(
        theme_data,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    )
    .map_err(|e| anyhow!("Failed to generate CSS for theme {}: {}", theme, e))
}

/// Writes all bundled CSS assets to output directory
///
/// # Errors
///
/// Returns error if the theme is unknown or a file cannot be written.
pub fn write_css_assets(assets_dir: &Path, theme: &str) -> Result<()> {
    write_asset(assets_dir, MESSAGE_CSS, MESSAGE)?;
    write_asset(assets_dir, HIGHLIGHT_CSS, &highlight_css(theme)?)?;
    Ok(())
}

fn write_asset(dir: &Path, name: &str, css: &str) -> Result<()> {
    fs::write(dir.join(name), css)
        .with_context(|| format!("Failed to write CSS asset: {}", name))?;
    Ok(())
}
