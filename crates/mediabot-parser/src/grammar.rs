//! Regular expressions for the three title syntaxes.

use std::sync::LazyLock;

use mediabot_common::MediaType;
use regex::Regex;

/// `!movie Title (Year)` at the start of a line.
static COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*!(movie|tv)[ \t]+(\S.*)$").unwrap());

/// `[tv] Title (Year)` at the start of a line.
static BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*\[(movie|tv)\][ \t]*(\S.*)$").unwrap());

/// Any command or bracket marker, with or without a title after it.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:!(?:movie|tv)(?:[ \t]|$)|\[(?:movie|tv)\])").unwrap()
});

/// Command marker followed by whitespace, used to detect explicit intent.
static COMMAND_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*!(?:movie|tv)[ \t]+\S").unwrap());

/// Trailing `(YYYY)` after a title.
static YEAR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<title>.*?)\s*\((?P<year>\d{4})\)\s*$").unwrap());

pub(crate) struct Captured<'a> {
    pub media_type: MediaType,
    pub rest: &'a str,
}

fn capture<'a>(re: &Regex, content: &'a str) -> Option<Captured<'a>> {
    let caps = re.captures(content)?;
    let media_type = caps.get(1)?.as_str().parse().ok()?;
    Some(Captured {
        media_type,
        rest: caps.get(2)?.as_str(),
    })
}

pub(crate) fn command(content: &str) -> Option<Captured<'_>> {
    capture(&COMMAND, content)
}

pub(crate) fn bracket(content: &str) -> Option<Captured<'_>> {
    capture(&BRACKET, content)
}

pub(crate) fn has_marker(content: &str) -> bool {
    MARKER.is_match(content)
}

pub(crate) fn has_command(content: &str) -> bool {
    COMMAND_MARKER.is_match(content)
}

/// Split `Title (Year)` into its parts. Returns `None` for a blank title.
pub(crate) fn title_and_year(text: &str) -> Option<(String, Option<u16>)> {
    let text = text.trim();
    let (title, year) = match YEAR_SUFFIX.captures(text) {
        Some(caps) => {
            let title = caps.name("title").map_or("", |m| m.as_str());
            let year = caps.name("year").and_then(|m| m.as_str().parse().ok());
            (title.trim(), year)
        }
        None => (text, None),
    };

    if title.is_empty() {
        return None;
    }
    Some((title.to_string(), year))
}
