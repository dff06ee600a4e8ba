//! Configuration persistence using toml_edit to preserve formatting and comments.

use super::BotConfig;
use crate::reply::DisplayOptions;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use toml_edit::DocumentMut;

/// Rewrite the `[bot]` and `[display]` tables of the config file, leaving
/// every other table (and its comments) untouched.
///
/// A missing file is created with just these two tables.
pub fn update_settings(path: &Path, bot: &BotConfig, display: &DisplayOptions) -> Result<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    let settings_toml = toml::to_string(&SettingsWrapper { bot, display })
        .with_context(|| "Failed to serialize settings")?;
    let settings_doc: DocumentMut = settings_toml
        .parse()
        .with_context(|| "Failed to parse serialized settings")?;

    for table in ["bot", "display"] {
        match settings_doc.get(table) {
            Some(item) => doc[table] = item.clone(),
            None => {
                doc.remove(table);
            }
        }
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

#[derive(Serialize)]
struct SettingsWrapper<'a> {
    bot: &'a BotConfig,
    display: &'a DisplayOptions,
}
