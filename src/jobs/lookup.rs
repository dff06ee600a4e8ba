//! One end-to-end lookup: load content, gate, parse, fetch, format, reply.

use std::collections::BTreeMap;
use std::sync::Arc;

use mediabot_common::{ContentKind, ContentRef, ContentSource, Error, ErrorKind};
use mediabot_parser::TitleParser;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{RuntimeSettings, SharedSettings};
use crate::forum::{Forum, Reply};
use crate::metadata::Fetcher;
use crate::monitor::ErrorLog;
use crate::reply::ReplyFormatter;

/// How a lookup attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// Nothing to do: bot disabled, content gone, not eligible, or no title.
    Ignored,
    /// A reply was posted; `found` is false for the "not found" reply.
    Replied { found: bool },
    /// Failed and will not be retried.
    Dropped { kind: ErrorKind },
    /// The service's budget was exhausted before any network call.
    RateLimited { retry_after_secs: u64 },
}

pub struct LookupService {
    forum: Arc<dyn Forum>,
    fetcher: Arc<Fetcher>,
    settings: SharedSettings,
    errors: Arc<ErrorLog>,
    parser: TitleParser,
}

impl LookupService {
    pub fn new(
        forum: Arc<dyn Forum>,
        fetcher: Arc<Fetcher>,
        settings: SharedSettings,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self {
            forum,
            fetcher,
            settings,
            errors,
            parser: TitleParser::new(),
        }
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Run one lookup for `content`. `attempt` starts at 1.
    pub async fn process(&self, content: ContentRef, attempt: u32) -> LookupOutcome {
        let settings = self.settings.read().clone();
        if !settings.bot.enabled {
            debug!(content = %content, "Bot disabled, skipping");
            return LookupOutcome::Ignored;
        }

        let source = match self.forum.fetch_content(content).await {
            Ok(Some(source)) => source,
            Ok(None) => {
                debug!(content = %content, "Content not found, skipping");
                return LookupOutcome::Ignored;
            }
            Err(e) => {
                let context = self.context(content, attempt, []);
                return self.fail(&e, context, &settings.locale.default_locale);
            }
        };

        if !self.is_eligible(&source, &settings) {
            debug!(content = %content, "Content not eligible for lookup");
            return LookupOutcome::Ignored;
        }

        let Some(parsed) = self.parser.parse_source(&source) else {
            debug!(content = %content, "No title reference found");
            return LookupOutcome::Ignored;
        };

        let locale = settings.locale.resolve(source.author_locale());
        let request = parsed.into_request(locale.clone());
        info!(
            content = %content,
            media_type = %request.media_type,
            title = %request.title,
            year = ?request.year,
            locale = %locale,
            attempt,
            "Looking up title"
        );

        let context = self.context(
            content,
            attempt,
            [
                ("media_type", request.media_type.to_string()),
                ("title", request.title.clone()),
            ],
        );

        let record = match self.fetcher.fetch(&request).await {
            Ok(record) => record,
            Err(e) => return self.fail(&e, context, &locale),
        };

        let body = ReplyFormatter::new(settings.display.clone()).format(record.as_ref(), &locale);
        let found = record.is_some();

        match self.forum.create_reply(&Reply::to(&source, body)).await {
            Ok(post_id) => {
                info!(content = %content, post_id = %post_id, found, "Reply posted");
                LookupOutcome::Replied { found }
            }
            Err(e) => self.fail(&e, context, &locale),
        }
    }

    /// Topics are gated by tags and categories. Posts are only answered when
    /// they carry an inline command and inline commands are enabled.
    fn is_eligible(&self, source: &ContentSource, settings: &RuntimeSettings) -> bool {
        match source.kind() {
            ContentKind::Topic => self
                .parser
                .should_process_source(source, &settings.content_filter()),
            ContentKind::Post => {
                settings.bot.inline_commands && self.parser.is_inline_command(source.raw())
            }
        }
    }

    fn fail(&self, error: &Error, context: BTreeMap<String, String>, locale: &str) -> LookupOutcome {
        self.errors.record(error, context, locale);
        match error {
            Error::RateLimit { retry_after, .. } => LookupOutcome::RateLimited {
                retry_after_secs: retry_after.as_secs(),
            },
            other => LookupOutcome::Dropped { kind: other.kind() },
        }
    }

    fn context<const N: usize>(
        &self,
        content: ContentRef,
        attempt: u32,
        extra: [(&str, String); N],
    ) -> BTreeMap<String, String> {
        let mut context = crate::monitor::context([
            ("content", content.to_string()),
            ("attempt", attempt.to_string()),
        ]);
        context.extend(extra.into_iter().map(|(k, v)| (k.to_string(), v)));
        context
    }
}
