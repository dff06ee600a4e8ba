//! Settings that can change while the bot is running.
//!
//! The admin API edits the `[bot]` and `[display]` sections in place. Lookup
//! jobs read a snapshot at the start of each run.

use std::sync::Arc;

use mediabot_common::{Error, Result};
use mediabot_parser::ContentFilter;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BotConfig, Config, LocaleSettings};
use crate::reply::DisplayOptions;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeSettings {
    pub bot: BotConfig,
    pub display: DisplayOptions,
    pub locale: LocaleSettings,
}

pub type SharedSettings = Arc<RwLock<RuntimeSettings>>;

/// Partial settings change. Only the keys present are modified.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub bot: Map<String, Value>,
    #[serde(default)]
    pub display: Map<String, Value>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.bot.is_empty() && self.display.is_empty()
    }
}

impl RuntimeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bot: config.bot.clone(),
            display: config.display.clone(),
            locale: config.locale.clone(),
        }
    }

    pub fn shared(config: &Config) -> SharedSettings {
        Arc::new(RwLock::new(Self::from_config(config)))
    }

    /// Tag and category gating for topics.
    pub fn content_filter(&self) -> ContentFilter {
        ContentFilter::new(
            self.bot.enabled_tags.clone(),
            self.bot.enabled_categories.clone(),
        )
    }

    /// Apply `update`. Nothing changes unless every key is known and every
    /// value is valid.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Result<()> {
        let bot = overlay(&self.bot, "bot", &update.bot)?;
        let display = overlay(&self.display, "display", &update.display)?;
        self.bot = bot;
        self.display = display;
        Ok(())
    }
}

fn overlay<T>(current: &T, section: &str, patch: &Map<String, Value>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(current)
        .map_err(|e| Error::validation(format!("Cannot read {section} settings: {e}")))?;
    let Value::Object(fields) = &mut value else {
        return Err(Error::validation(format!("{section} settings are not a table")));
    };

    for (key, new_value) in patch {
        match fields.get_mut(key) {
            Some(slot) => *slot = new_value.clone(),
            None => return Err(Error::validation(format!("Unknown {section} setting: {key}"))),
        }
    }

    serde_json::from_value(value)
        .map_err(|e| Error::validation(format!("Invalid {section} settings: {e}")))
}
