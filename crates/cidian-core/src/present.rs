//! Turning entries and fields into presentable rows.

use cidian_types::{ItemAction, ResultItem};

use crate::dictionary::Entry;
use crate::lookup::LookupOptions;
use crate::query::RetrievalMode;

/// Builds rows for one query
pub struct Presenter<'a> {
    options: &'a LookupOptions,
    keyword: Option<&'a str>,
}

impl<'a> Presenter<'a> {
    pub fn new(options: &'a LookupOptions, keyword: Option<&'a str>) -> Self {
        Self { options, keyword }
    }

    /// Query text that opens `word` in `mode`
    pub fn pivot_text(&self, word: &str, mode: RetrievalMode) -> String {
        match self.keyword {
            Some(keyword) => format!("{keyword} {word}{}", mode.marker()),
            None => format!("{word}{}", mode.marker()),
        }
    }

    pub fn pivot(&self, word: &str, mode: RetrievalMode) -> ItemAction {
        ItemAction::ChangeQuery(self.pivot_text(word, mode))
    }

    /// Opens the configured word website, if any
    pub fn website(&self, word: &str) -> ItemAction {
        if self.options.word_website.is_empty() {
            return ItemAction::None;
        }
        ItemAction::OpenUrl(self.options.word_website.replace("{}", word))
    }

    /// Row for a whole entry, selecting it opens the detailed view
    pub fn word(&self, entry: &Entry) -> ResultItem {
        let senses = if self.options.show_english_definition {
            &entry.definition
        } else {
            &entry.translation
        };

        let mut subtitle = String::new();
        if !entry.phonetic.trim().is_empty() {
            subtitle.push_str(&format!("/{}/ ", entry.phonetic));
        }
        subtitle.push_str(&joined(senses));

        ResultItem::new(
            entry.key.clone(),
            subtitle,
            self.pivot(&entry.key, RetrievalMode::Detailed),
        )
    }

    /// Plain informational row about `word`
    pub fn info(&self, title: impl Into<String>, subtitle: impl Into<String>, word: &str) -> ResultItem {
        ResultItem::new(title, subtitle, self.website(word))
    }
}

/// Newline separated senses, `\r` tolerated
pub fn senses(field: &str) -> impl Iterator<Item = &str> {
    field
        .split('\n')
        .map(|sense| sense.trim_end_matches('\r'))
        .filter(|sense| !sense.trim().is_empty())
}

/// Senses on one line
pub fn joined(field: &str) -> String {
    senses(field).collect::<Vec<_>>().join("; ")
}
