//! Renders a media record into reply text.
//!
//! The reply is a sequence of blocks, one per enabled [`Section`], joined by a
//! blank line. A section whose underlying field is missing renders nothing;
//! it never produces a partial line.

use mediabot_common::MediaType;

use super::messages::Messages;
use super::options::{DisplayOptions, Section};
use crate::metadata::{MediaRecord, RecordView};

const MOVIE_EMOJI: &str = "🎬";
const TV_EMOJI: &str = "📺";
const DATE_EMOJI: &str = "📅";
const CAST_EMOJI: &str = "👥";
const RATING_EMOJI: &str = "⭐️";
const GENRES_EMOJI: &str = "🎭";
const RUNTIME_EMOJI: &str = "⏱";
const LINK_EMOJI: &str = "🔗";

#[derive(Debug, Clone, Default)]
pub struct ReplyFormatter {
    options: DisplayOptions,
}

impl ReplyFormatter {
    pub fn new(options: DisplayOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// Render `record`, or the localized "not found" message when there is
    /// none.
    pub fn format(&self, record: Option<&MediaRecord>, locale: &str) -> String {
        let messages = Messages::for_locale(locale);
        let Some(record) = record else {
            return messages.not_found.to_string();
        };

        let view = record.view();
        Section::ORDER
            .iter()
            .filter(|section| self.options.is_enabled(**section))
            .filter_map(|section| self.render(*section, record, &view, messages))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render(
        &self,
        section: Section,
        record: &MediaRecord,
        view: &RecordView<'_>,
        messages: &Messages,
    ) -> Option<String> {
        match section {
            Section::Title => {
                let title = present(Some(view.title))?;
                let emoji = match view.media_type {
                    MediaType::Movie => MOVIE_EMOJI,
                    MediaType::Tv => TV_EMOJI,
                };
                Some(match view.year {
                    Some(year) => format!("{emoji} **{title} ({year})**"),
                    None => format!("{emoji} **{title}**"),
                })
            }
            Section::Poster => {
                let url = present(view.poster_url)?;
                Some(format!("![{}]({url})", messages.poster_alt))
            }
            Section::Overview => {
                let overview = present(view.overview)?;
                Some(format!("*{overview}*"))
            }
            Section::ReleaseDate => {
                let date = present(view.date)?;
                let label = match view.media_type {
                    MediaType::Movie => messages.release_date,
                    MediaType::Tv => messages.first_aired,
                };
                Some(format!("{DATE_EMOJI} {label}: {date}"))
            }
            Section::Cast => {
                let names: Vec<&str> = view
                    .cast
                    .iter()
                    .map(|c| c.name.trim())
                    .filter(|n| !n.is_empty())
                    .take(self.options.max_cast)
                    .collect();
                if names.is_empty() {
                    return None;
                }
                Some(format!("{CAST_EMOJI} {}: {}", messages.cast, names.join(", ")))
            }
            Section::Rating => {
                let rating = view.rating?;
                Some(format!(
                    "{RATING_EMOJI} {}: {}/10",
                    messages.rating,
                    format_rating(rating)
                ))
            }
            Section::Genres => {
                if view.genres.is_empty() {
                    return None;
                }
                Some(format!(
                    "{GENRES_EMOJI} {}: {}",
                    messages.genres,
                    view.genres.join(", ")
                ))
            }
            Section::Runtime => {
                let minutes = view.runtime_minutes.filter(|m| *m > 0)?;
                Some(format!(
                    "{RUNTIME_EMOJI} {}: {minutes} {}",
                    messages.runtime, messages.minutes
                ))
            }
            Section::Links => {
                present(Some(view.external_id))?;
                let label = match view.media_type {
                    MediaType::Movie => messages.view_on_tmdb,
                    MediaType::Tv => messages.view_on_tvdb,
                };
                Some(format!("{LINK_EMOJI} [{label}]({})", record.external_url()))
            }
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One decimal place, dropping a trailing `.0`.
fn format_rating(rating: f64) -> String {
    let rounded = format!("{rating:.1}");
    match rounded.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => rounded,
    }
}
