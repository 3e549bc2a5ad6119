//! Language-tagged strings.
//!
//! Labels, definitions and descriptions are stored as sets of strings, one per
//! language. Cached copies collapse each set to a single string with
//! [`select_language`].

use serde::{Deserialize, Serialize};

use crate::constants::LANGUAGE_DEFAULT;

/// A string in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageString {
    /// Language code, or [`LANGUAGE_DEFAULT`] for language-independent text
    #[serde(rename = "lang")]
    pub language: String,
    /// The text itself
    pub text: String,
}

impl LanguageString {
    /// Create a string in the given language.
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }

    /// Create a language-independent string.
    pub fn neutral(text: impl Into<String>) -> Self {
        Self::new(LANGUAGE_DEFAULT, text)
    }
}

/// Pick the entry of `set` to show for `language`.
///
/// The exact language wins; failing that, the language-independent entry; failing
/// that, the first entry. An empty set yields `None`.
pub fn select_language<'a>(set: &'a [LanguageString], language: &str) -> Option<&'a str> {
    set.iter()
        .find(|s| s.language == language)
        .or_else(|| set.iter().find(|s| s.language == LANGUAGE_DEFAULT))
        .or_else(|| set.first())
        .map(|s| s.text.as_str())
}
