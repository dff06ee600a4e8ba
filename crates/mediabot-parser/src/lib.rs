//! # mediabot-parser
//!
//! Finds movie and TV title references in forum content.
//!
//! Three syntaxes are recognized, first match wins:
//!
//! 1. Inline commands at the start of a line: `!movie The Iron Claw (2023)`
//! 2. Bracketed prefixes: `[tv] Severance (2022)`
//! 3. Tag-derived: content tagged `movie` or `tv` whose first line is the title
//!
//! ```
//! use mediabot_common::{MatchForm, MediaType};
//! use mediabot_parser::TitleParser;
//!
//! let parser = TitleParser::new();
//! let parsed = parser.parse("!movie The Iron Claw (2023)", &[], None).unwrap();
//!
//! assert_eq!(parsed.media_type, MediaType::Movie);
//! assert_eq!(parsed.title, "The Iron Claw");
//! assert_eq!(parsed.year, Some(2023));
//! assert_eq!(parsed.form, MatchForm::Command);
//! ```

mod filter;
mod grammar;

pub use filter::{split_list, ContentFilter};

use mediabot_common::{CategoryId, ContentSource, LookupRequest, MatchForm, MediaType};
use serde::Serialize;

/// A title reference found in content, before a locale is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTitle {
    pub media_type: MediaType,
    pub title: String,
    pub year: Option<u16>,
    pub form: MatchForm,
}

impl ParsedTitle {
    /// Attach a locale, producing the request handed to the fetcher.
    pub fn into_request(self, locale: impl Into<String>) -> LookupRequest {
        LookupRequest::new(self.media_type, self.title, self.year, locale)
    }
}

/// Stateless title extractor and eligibility check.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleParser;

impl TitleParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract a title reference from `content`.
    ///
    /// `category_id` does not influence extraction; it is accepted so callers
    /// can pass the same context to [`parse`](Self::parse) and
    /// [`should_process`](Self::should_process).
    pub fn parse(
        &self,
        content: &str,
        tags: &[String],
        _category_id: Option<CategoryId>,
    ) -> Option<ParsedTitle> {
        if content.trim().is_empty() {
            return None;
        }

        if let Some(found) = grammar::command(content) {
            return Self::build(found.media_type, found.rest, MatchForm::Command);
        }
        if let Some(found) = grammar::bracket(content) {
            return Self::build(found.media_type, found.rest, MatchForm::Bracket);
        }
        // A bare marker with no title is not a tag-derived reference.
        if grammar::has_marker(content) {
            return None;
        }

        let media_type = tags
            .iter()
            .find_map(|tag| tag.trim().parse::<MediaType>().ok())?;
        let line = content.lines().map(str::trim).find(|l| !l.is_empty())?;
        Self::build(media_type, line, MatchForm::Tag)
    }

    /// Parse a resolved content source.
    pub fn parse_source(&self, source: &ContentSource) -> Option<ParsedTitle> {
        self.parse(source.raw(), source.tags(), source.category_id())
    }

    /// Whether `content` is eligible for a lookup.
    ///
    /// Inline commands are always eligible. Otherwise the content needs at
    /// least one enabled tag and, when a category allow-list is configured, a
    /// category in that list.
    pub fn should_process(
        &self,
        content: &str,
        tags: &[String],
        category_id: Option<CategoryId>,
        filter: &ContentFilter,
    ) -> bool {
        if content.trim().is_empty() {
            return false;
        }
        if grammar::has_command(content) {
            return true;
        }
        if tags.is_empty() || !filter.matches_tags(tags) {
            return false;
        }
        filter.allows_category(category_id)
    }

    pub fn should_process_source(&self, source: &ContentSource, filter: &ContentFilter) -> bool {
        self.should_process(source.raw(), source.tags(), source.category_id(), filter)
    }

    /// Whether `content` carries an explicit inline command.
    pub fn is_inline_command(&self, content: &str) -> bool {
        grammar::has_command(content)
    }

    fn build(media_type: MediaType, text: &str, form: MatchForm) -> Option<ParsedTitle> {
        let (title, year) = grammar::title_and_year(text)?;
        Some(ParsedTitle {
            media_type,
            title,
            year,
            form,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediabot_common::{PostContent, PostId, TopicContent, TopicId};

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn movie_tv_filter() -> ContentFilter {
        ContentFilter::new(tags(&["movie", "tv"]), vec![])
    }

    #[test]
    fn inline_movie_command() {
        let parsed = TitleParser::new()
            .parse("!movie The Iron Claw (2023)", &[], None)
            .unwrap();
        assert_eq!(parsed.media_type, MediaType::Movie);
        assert_eq!(parsed.title, "The Iron Claw");
        assert_eq!(parsed.year, Some(2023));
        assert_eq!(parsed.form, MatchForm::Command);
    }

    #[test]
    fn inline_tv_command_is_case_insensitive() {
        let parsed = TitleParser::new()
            .parse("!TV   Breaking Bad (2008)  ", &[], None)
            .unwrap();
        assert_eq!(parsed.media_type, MediaType::Tv);
        assert_eq!(parsed.title, "Breaking Bad");
        assert_eq!(parsed.year, Some(2008));
    }

    #[test]
    fn command_without_year() {
        let parsed = TitleParser::new().parse("!tv Severance", &[], None).unwrap();
        assert_eq!(parsed.title, "Severance");
        assert_eq!(parsed.year, None);
    }

    #[test]
    fn year_is_only_read_as_a_suffix() {
        let parser = TitleParser::new();
        let parsed = parser.parse("!movie Heat (1995) is great", &[], None).unwrap();
        assert_eq!(parsed.title, "Heat (1995) is great");
        assert_eq!(parsed.year, None);

        let parsed = parser.parse("!movie 1917 (2019)", &[], None).unwrap();
        assert_eq!(parsed.title, "1917");
        assert_eq!(parsed.year, Some(2019));
    }

    #[test]
    fn command_on_later_line() {
        let content = "Has anyone seen this?\n!movie Past Lives (2023)\nThoughts?";
        let parsed = TitleParser::new().parse(content, &[], None).unwrap();
        assert_eq!(parsed.title, "Past Lives");
        assert_eq!(parsed.year, Some(2023));
    }

    #[test]
    fn command_takes_precedence_over_bracket() {
        let content = "[tv] Severance\n!movie Heat (1995)";
        let parsed = TitleParser::new().parse(content, &[], None).unwrap();
        assert_eq!(parsed.media_type, MediaType::Movie);
        assert_eq!(parsed.form, MatchForm::Command);
    }

    #[test]
    fn bracket_form() {
        let parsed = TitleParser::new()
            .parse("[movie] The Iron Claw (2023)", &tags(&["tv"]), None)
            .unwrap();
        assert_eq!(parsed.media_type, MediaType::Movie);
        assert_eq!(parsed.title, "The Iron Claw");
        assert_eq!(parsed.form, MatchForm::Bracket);
    }

    #[test]
    fn tag_form_uses_first_matching_tag() {
        let parsed = TitleParser::new()
            .parse(
                "Breaking Bad (2008)\n\nBest show ever.",
                &tags(&["drama", "TV", "movie"]),
                None,
            )
            .unwrap();
        assert_eq!(parsed.media_type, MediaType::Tv);
        assert_eq!(parsed.title, "Breaking Bad");
        assert_eq!(parsed.year, Some(2008));
        assert_eq!(parsed.form, MatchForm::Tag);
    }

    #[test]
    fn tag_form_skips_leading_blank_lines() {
        let parsed = TitleParser::new()
            .parse("\n   \nDune", &tags(&["movie"]), None)
            .unwrap();
        assert_eq!(parsed.title, "Dune");
    }

    #[test]
    fn no_marker_and_no_tag_is_none() {
        let parser = TitleParser::new();
        assert_eq!(parser.parse("The Iron Claw (2023)", &[], None), None);
        assert_eq!(
            parser.parse("The Iron Claw (2023)", &tags(&["wrestling"]), None),
            None
        );
    }

    #[test]
    fn blank_content_is_none() {
        assert_eq!(TitleParser::new().parse("  \n ", &tags(&["movie"]), None), None);
    }

    #[test]
    fn bare_marker_is_none() {
        let parser = TitleParser::new();
        assert_eq!(parser.parse("!movie", &tags(&["movie"]), None), None);
        assert_eq!(parser.parse("[tv]   ", &tags(&["tv"]), None), None);
        assert_eq!(parser.parse("!movie (2023)", &[], None), None);
    }

    #[test]
    fn mid_line_command_is_not_a_command() {
        let parser = TitleParser::new();
        assert_eq!(parser.parse("I typed !movie Heat once", &[], None), None);
    }

    #[test]
    fn into_request_attaches_locale() {
        let request = TitleParser::new()
            .parse("!movie The Iron Claw (2023)", &[], None)
            .unwrap()
            .into_request("es");
        assert_eq!(
            request,
            LookupRequest::new(MediaType::Movie, "The Iron Claw", Some(2023), "es")
        );
    }

    #[test]
    fn should_process_inline_ignores_gating() {
        let parser = TitleParser::new();
        let closed = ContentFilter::new(tags(&["movie"]), vec![CategoryId::new(999)]);
        assert!(parser.should_process("!movie The Iron Claw", &[], None, &closed));
        assert!(parser.should_process("!tv Breaking Bad", &tags(&["other"]), None, &closed));
    }

    #[test]
    fn should_process_requires_tags() {
        let parser = TitleParser::new();
        assert!(!parser.should_process("The Iron Claw", &[], None, &movie_tv_filter()));
    }

    #[test]
    fn should_process_enabled_tag() {
        let parser = TitleParser::new();
        assert!(parser.should_process(
            "The Iron Claw",
            &tags(&["movie"]),
            None,
            &movie_tv_filter()
        ));
    }

    #[test]
    fn should_process_disabled_tag() {
        let parser = TitleParser::new();
        let filter = ContentFilter::new(tags(&["movie"]), vec![]);
        assert!(!parser.should_process("Breaking Bad", &tags(&["tv"]), None, &filter));
    }

    #[test]
    fn should_process_category_allow_list() {
        let parser = TitleParser::new();
        let filter = ContentFilter::new(tags(&["movie"]), vec![CategoryId::new(7)]);
        let movie = tags(&["movie"]);
        assert!(parser.should_process("Heat", &movie, Some(CategoryId::new(7)), &filter));
        assert!(!parser.should_process("Heat", &movie, Some(CategoryId::new(999)), &filter));
        assert!(!parser.should_process("Heat", &movie, None, &filter));
    }

    #[test]
    fn should_process_blank_content() {
        let parser = TitleParser::new();
        assert!(!parser.should_process("", &tags(&["movie"]), None, &movie_tv_filter()));
    }

    #[test]
    fn source_helpers() {
        let parser = TitleParser::new();
        let topic = ContentSource::Topic(TopicContent {
            id: TopicId::new(1),
            raw: "Severance (2022)".into(),
            tags: tags(&["tv"]),
            category_id: None,
            author_locale: None,
        });
        assert_eq!(parser.parse_source(&topic).unwrap().title, "Severance");
        assert!(parser.should_process_source(&topic, &movie_tv_filter()));

        let post = ContentSource::Post(PostContent {
            id: PostId::new(2),
            topic_id: TopicId::new(1),
            post_number: 3,
            raw: "what about !tv Lost".into(),
            tags: vec![],
            category_id: None,
            author_locale: None,
        });
        assert_eq!(parser.parse_source(&post), None);
        assert!(!parser.is_inline_command(post.raw()));
    }
}
