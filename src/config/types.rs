use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mediabot_common::{CategoryId, Service};
use serde::{Deserialize, Deserializer, Serialize};

use crate::reply::DisplayOptions;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub forum: ForumConfig,

    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub display: DisplayOptions,

    #[serde(default)]
    pub locale: LocaleSettings,

    #[serde(default)]
    pub services: ServicesConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// API key for the admin routes (used with Authorization: Bearer header).
    /// Admin routes are open when unset.
    #[serde(default)]
    pub admin_api_key: Option<String>,

    /// Shared secret for HMAC-SHA256 webhook signatures. Signatures are not
    /// checked when unset.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Maximum webhook requests accepted per minute (0 = unlimited)
    #[serde(default = "default_webhook_rate")]
    pub webhook_rate_per_minute: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_webhook_rate() -> u32 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_api_key: None,
            webhook_secret: None,
            webhook_rate_per_minute: default_webhook_rate(),
        }
    }
}

/// Connection to the host forum.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForumConfig {
    #[serde(default = "default_forum_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Account replies are posted as.
    #[serde(default = "default_bot_username")]
    pub bot_username: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_forum_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_bot_username() -> String {
    "MediaBot".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            base_url: default_forum_url(),
            api_key: None,
            bot_username: default_bot_username(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bot behavior. These settings are editable through the admin API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Tags that opt a topic in to lookups (comma string or array)
    #[serde(default = "default_enabled_tags", deserialize_with = "comma_list")]
    pub enabled_tags: Vec<String>,

    /// Category allow-list (comma string or array; empty = all categories)
    #[serde(default, deserialize_with = "comma_list")]
    pub enabled_categories: Vec<CategoryId>,

    /// Answer `!movie` / `!tv` commands in replies
    #[serde(default = "default_true")]
    pub inline_commands: bool,

    #[serde(default)]
    pub reply_delay_secs: u64,

    /// Delay before a rate-limited lookup is retried
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_enabled_tags() -> Vec<String> {
    vec!["movie".to_string(), "tv".to_string()]
}
fn default_retry_delay() -> u64 {
    300
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_tags: default_enabled_tags(),
            enabled_categories: Vec::new(),
            inline_commands: true,
            reply_delay_secs: 0,
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl BotConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_secs(self.reply_delay_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Locale used for catalog queries and reply text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocaleSettings {
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Prefer the post author's locale when it is supported
    #[serde(default = "default_true")]
    pub use_user_locale: bool,

    #[serde(default = "default_locale")]
    pub fallback_locale: String,

    #[serde(default = "default_supported_locales", deserialize_with = "comma_list")]
    pub supported_locales: Vec<String>,
}

fn default_locale() -> String {
    "en-US".to_string()
}
fn default_supported_locales() -> Vec<String> {
    [
        "en-US", "es-ES", "fr-FR", "de-DE", "it-IT", "pt-BR", "ru-RU", "ja-JP", "ko-KR", "zh-CN",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            use_user_locale: true,
            fallback_locale: default_locale(),
            supported_locales: default_supported_locales(),
        }
    }
}

impl LocaleSettings {
    /// Pick the locale for a lookup on content written by an author whose
    /// locale is `author_locale`.
    pub fn resolve(&self, author_locale: Option<&str>) -> String {
        if self.use_user_locale {
            if let Some(locale) = author_locale.and_then(|l| self.supported(l)) {
                return locale.to_string();
            }
        }
        if self.supported(&self.default_locale).is_some() {
            return self.default_locale.clone();
        }
        self.fallback_locale.clone()
    }

    fn supported(&self, locale: &str) -> Option<&str> {
        let locale = locale.trim().replace('_', "-");
        self.supported_locales
            .iter()
            .find(|s| s.eq_ignore_ascii_case(&locale))
            .map(String::as_str)
    }
}

/// Per-service catalog settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServicesConfig {
    #[serde(default)]
    pub tmdb: ServiceConfig,

    #[serde(default)]
    pub tvdb: ServiceConfig,
}

impl ServicesConfig {
    pub fn get(&self, service: Service) -> &ServiceConfig {
        match service {
            Service::Tmdb => &self.tmdb,
            Service::Tvdb => &self.tvdb,
        }
    }

    /// Settings for `service` with its defaults filled in.
    pub fn resolve(&self, service: Service) -> ServiceSettings {
        self.get(service).resolve(service)
    }
}

/// Raw per-service table. Unset fields fall back to the service's defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    /// Requests allowed per window
    #[serde(default)]
    pub budget: Option<u32>,

    #[serde(default)]
    pub window_secs: Option<u64>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    pub fn resolve(&self, service: Service) -> ServiceSettings {
        let (base_url, budget, window_secs) = match service {
            Service::Tmdb => ("https://api.themoviedb.org/3", 40, 10),
            Service::Tvdb => ("https://api4.thetvdb.com/v4", 100, 24 * 60 * 60),
        };

        ServiceSettings {
            service,
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| base_url.to_string()),
            budget: self.budget.unwrap_or(budget),
            window: Duration::from_secs(self.window_secs.unwrap_or(window_secs)),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(default_timeout_secs())),
        }
    }
}

/// Fully resolved settings for one catalog service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub service: Service,
    pub api_key: Option<String>,
    pub base_url: String,
    pub budget: u32,
    pub window: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local maps
    #[default]
    Memory,
    /// SQLite file shared between processes
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// SQLite database file (sqlite backend only)
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// How often expired entries are purged
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("mediabot.sqlite")
}
fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}
fn default_purge_interval() -> u64 {
    60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            path: default_cache_path(),
            ttl_secs: default_cache_ttl(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Accept either `"a,b"` or `["a", "b"]`.
fn comma_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString<T> {
        List(Vec<T>),
        Str(String),
    }

    match ListOrString::<T>::deserialize(deserializer)? {
        ListOrString::List(items) => Ok(items),
        ListOrString::Str(s) => mediabot_parser::split_list(&s)
            .iter()
            .map(|item| item.parse().map_err(serde::de::Error::custom))
            .collect(),
    }
}
