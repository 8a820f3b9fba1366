//! Case- and diacritic-insensitive text matching
//!
//! Header titles, header tokens and classification keywords are all compared
//! in folded form: Unicode-decomposed, combining marks removed, lower-cased.
//! `"Bắt đầu"` folds to `"bat dau"`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a string for comparison: trim, strip diacritics, lower-case
pub fn fold(s: &str) -> String {
    s.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            // Stroked d has no decomposition
            'đ' | 'Đ' => 'd',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split folded text into alphanumeric words
pub fn words(s: &str) -> Vec<String> {
    fold(s)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// A pre-folded word sequence matched as a contiguous run of words
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    words: Vec<String>,
}

impl Phrase {
    pub fn new(s: &str) -> Self {
        Self { words: words(s) }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True when the phrase appears as a contiguous run inside `haystack`
    pub fn occurs_in(&self, haystack: &[String]) -> bool {
        if self.words.is_empty() || self.words.len() > haystack.len() {
            return false;
        }
        haystack
            .windows(self.words.len())
            .any(|window| window == self.words.as_slice())
    }

    /// True when the text, with separators removed, begins with the phrase.
    ///
    /// Matches run-together titles such as `TaskName` or `Start_Date`.
    pub fn leads(&self, haystack: &[String]) -> bool {
        !self.words.is_empty() && haystack.concat().starts_with(&self.words.concat())
    }
}
