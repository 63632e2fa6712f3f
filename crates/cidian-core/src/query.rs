/// Marker that selects the detailed view of a word
pub const DETAIL_MARKER: char = '!';

/// Two-character markers for the single-purpose views
const FIELD_MARKERS: [(&str, RetrievalMode); 4] = [
    ("!d", RetrievalMode::DefinitionsOnly),
    ("!t", RetrievalMode::TranslationsOnly),
    ("!e", RetrievalMode::ExchangesOnly),
    ("!s", RetrievalMode::SynonymsOnly),
];

/// A raw query plus the presentation context it was typed in
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub text: String,
    /// Keyword the query was typed after, reused when an item rewrites the query
    pub action_keyword: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action_keyword: None,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.action_keyword = (!keyword.is_empty()).then_some(keyword);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalMode {
    FirstLevel,
    Detailed,
    TranslationsOnly,
    DefinitionsOnly,
    ExchangesOnly,
    SynonymsOnly,
    CrossLanguage,
}

impl RetrievalMode {
    /// Suffix that selects this mode when appended to a word
    pub fn marker(self) -> &'static str {
        match self {
            RetrievalMode::FirstLevel | RetrievalMode::CrossLanguage => "",
            RetrievalMode::Detailed => "!",
            RetrievalMode::TranslationsOnly => "!t",
            RetrievalMode::DefinitionsOnly => "!d",
            RetrievalMode::ExchangesOnly => "!e",
            RetrievalMode::SynonymsOnly => "!s",
        }
    }
}

/// A classified query: the mode and the word it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    pub mode: RetrievalMode,
    pub word: &'a str,
}

/// Pick the retrieval mode from the shape of the query.
///
/// Markers win over script, script wins over length: a lone ideograph is a
/// cross-language query.
pub fn classify(raw: &str) -> Classified<'_> {
    for (marker, mode) in FIELD_MARKERS {
        if let Some(word) = raw.strip_suffix(marker) {
            return Classified { mode, word };
        }
    }

    if let Some(word) = raw.strip_suffix(DETAIL_MARKER) {
        return Classified {
            mode: RetrievalMode::Detailed,
            word,
        };
    }

    if raw.chars().any(is_cjk_ideograph) {
        return Classified {
            mode: RetrievalMode::CrossLanguage,
            word: raw,
        };
    }

    Classified {
        mode: RetrievalMode::FirstLevel,
        word: raw,
    }
}

pub fn is_cjk_ideograph(c: char) -> bool {
    matches!(c,
        '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{323AF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_markers() {
        assert_eq!(
            classify("apple!t"),
            Classified { mode: RetrievalMode::TranslationsOnly, word: "apple" }
        );
        assert_eq!(classify("apple!d").mode, RetrievalMode::DefinitionsOnly);
        assert_eq!(classify("apple!e").mode, RetrievalMode::ExchangesOnly);
        assert_eq!(classify("apple!s").mode, RetrievalMode::SynonymsOnly);
    }

    #[test]
    fn detail_marker() {
        assert_eq!(
            classify("hte!"),
            Classified { mode: RetrievalMode::Detailed, word: "hte" }
        );
        // Unknown two-character suffix falls through to the detail check
        assert_eq!(classify("apple!x").mode, RetrievalMode::FirstLevel);
    }

    #[test]
    fn bare_markers_strip_to_empty() {
        assert_eq!(classify("!").word, "");
        assert_eq!(classify("!").mode, RetrievalMode::Detailed);
        assert_eq!(classify("!t").word, "");
        assert_eq!(classify("!s").mode, RetrievalMode::SynonymsOnly);
    }

    #[test]
    fn single_characters() {
        assert_eq!(classify("a").mode, RetrievalMode::FirstLevel);
        assert_eq!(classify("t").mode, RetrievalMode::FirstLevel);
        assert_eq!(
            classify("书"),
            Classified { mode: RetrievalMode::CrossLanguage, word: "书" }
        );
    }

    #[test]
    fn cjk_anywhere_is_cross_language() {
        assert_eq!(classify("快乐").mode, RetrievalMode::CrossLanguage);
        assert_eq!(classify("a快").mode, RetrievalMode::CrossLanguage);
        // Markers still take precedence
        assert_eq!(classify("快乐!").mode, RetrievalMode::Detailed);
    }

    #[test]
    fn kana_is_not_an_ideograph() {
        assert_eq!(classify("かな").mode, RetrievalMode::FirstLevel);
    }

    #[test]
    fn markers_round_trip_through_classify() {
        for mode in [
            RetrievalMode::Detailed,
            RetrievalMode::TranslationsOnly,
            RetrievalMode::DefinitionsOnly,
            RetrievalMode::ExchangesOnly,
            RetrievalMode::SynonymsOnly,
        ] {
            let text = format!("word{}", mode.marker());
            assert_eq!(classify(&text), Classified { mode, word: "word" });
        }
    }

    #[test]
    fn empty_keyword_is_dropped() {
        assert_eq!(Query::new("x").with_keyword("").action_keyword, None);
        assert_eq!(
            Query::new("x").with_keyword("d").action_keyword.as_deref(),
            Some("d")
        );
    }
}
