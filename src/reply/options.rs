//! Per-section display toggles for replies.
//!
//! Every section can be switched off independently; `max_cast` caps how many
//! cast names are listed.

use serde::{Deserialize, Serialize};

/// One block of a reply, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Title,
    Poster,
    Overview,
    ReleaseDate,
    Cast,
    Rating,
    Genres,
    Runtime,
    Links,
}

impl Section {
    pub const ORDER: [Section; 9] = [
        Section::Title,
        Section::Poster,
        Section::Overview,
        Section::ReleaseDate,
        Section::Cast,
        Section::Rating,
        Section::Genres,
        Section::Runtime,
        Section::Links,
    ];
}

/// Which reply sections are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default = "enabled", alias = "show_title")]
    pub title: bool,
    #[serde(default = "enabled", alias = "show_poster")]
    pub poster: bool,
    #[serde(default = "enabled", alias = "show_overview")]
    pub overview: bool,
    #[serde(default = "enabled", alias = "show_release_date")]
    pub release_date: bool,
    #[serde(default = "enabled", alias = "show_cast")]
    pub cast: bool,
    #[serde(default = "enabled", alias = "show_rating")]
    pub rating: bool,
    #[serde(default = "enabled", alias = "show_genres")]
    pub genres: bool,
    #[serde(default = "enabled", alias = "show_runtime")]
    pub runtime: bool,
    #[serde(default = "enabled", alias = "show_links")]
    pub links: bool,
    /// Leading cast names listed
    #[serde(default = "default_max_cast")]
    pub max_cast: usize,
}

fn enabled() -> bool {
    true
}
fn default_max_cast() -> usize {
    3
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            title: true,
            poster: true,
            overview: true,
            release_date: true,
            cast: true,
            rating: true,
            genres: true,
            runtime: true,
            links: true,
            max_cast: default_max_cast(),
        }
    }
}

impl DisplayOptions {
    pub fn is_enabled(&self, section: Section) -> bool {
        match section {
            Section::Title => self.title,
            Section::Poster => self.poster,
            Section::Overview => self.overview,
            Section::ReleaseDate => self.release_date,
            Section::Cast => self.cast,
            Section::Rating => self.rating,
            Section::Genres => self.genres,
            Section::Runtime => self.runtime,
            Section::Links => self.links,
        }
    }

    pub fn set(&mut self, section: Section, enabled: bool) {
        let flag = match section {
            Section::Title => &mut self.title,
            Section::Poster => &mut self.poster,
            Section::Overview => &mut self.overview,
            Section::ReleaseDate => &mut self.release_date,
            Section::Cast => &mut self.cast,
            Section::Rating => &mut self.rating,
            Section::Genres => &mut self.genres,
            Section::Runtime => &mut self.runtime,
            Section::Links => &mut self.links,
        };
        *flag = enabled;
    }
}
