//! Text normalization for semantic matching.
//!
//! Queries and snippet descriptions go through the same deterministic pipeline before
//! they are embedded, so that surface noise (case, markup, URLs, inflection, filler words)
//! does not move vectors apart:
//!
//! 1. lower-case and trim
//! 2. decode HTML entities
//! 3. strip URLs
//! 4. replace everything except word characters, whitespace and `.,-]` with spaces
//! 5. collapse whitespace
//! 6. tokenize into numbers, word runs and single punctuation marks
//! 7. lemmatize every token
//! 8. drop stopwords, punctuation, single characters and short numbers, unless allowlisted
//! 9. de-duplicate in first-occurrence order and join with single spaces
//!
//! The output is a fixed point of the pipeline: normalizing normalized text returns it
//! unchanged.
//!
//! ```
//! use snipmatch_text::normalize;
//!
//! assert_eq!(
//!     normalize("How do I drop the rows with missing values in a DataFrame?"),
//!     "drop row missing value in dataframe"
//! );
//! assert_eq!(normalize(""), "");
//! ```

use crate::lemma::lemmatize;
use crate::vocab::{KEPT_SINGLE_LETTERS, is_domain_keyword, is_stopword};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const URL_PATTERN: &str = r"http\S+|www\.\S+";
const DISALLOWED_CHARS_PATTERN: &str = r"[^\w\s.,\-\]]";
const WHITESPACE_PATTERN: &str = r"\s+";
const TOKEN_PATTERN: &str = r"\d+(?:[.,]\d+)*|\w+|[^\w\s]";

/// Separator placed between a snippet's title and summary before normalization.
pub const TITLE_SUMMARY_SEPARATOR: &str = " : ";

static DEFAULT_NORMALIZER: LazyLock<TextNormalizer> = LazyLock::new(TextNormalizer::new);

/// Compiled normalization pipeline.
///
/// Construction compiles a handful of regular expressions; reuse one instance (or the
/// free [`normalize`] function, which shares a process-wide instance).
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url: Regex,
    disallowed: Regex,
    whitespace: Regex,
    token: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Creates a normalizer with the built-in patterns.
    pub fn new() -> Self {
        Self {
            url: Regex::new(URL_PATTERN).unwrap(),
            disallowed: Regex::new(DISALLOWED_CHARS_PATTERN).unwrap(),
            whitespace: Regex::new(WHITESPACE_PATTERN).unwrap(),
            token: Regex::new(TOKEN_PATTERN).unwrap(),
        }
    }

    /// Normalizes `text` into a space-separated list of unique lemmas.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let lowered = text.to_lowercase();
        let decoded = html_escape::decode_html_entities(lowered.trim());
        let without_urls = self.url.replace_all(&decoded, "");
        let cleaned = self.disallowed.replace_all(&without_urls, " ");
        let collapsed = self.whitespace.replace_all(&cleaned, " ");

        let mut seen = HashSet::new();
        let mut kept: Vec<String> = Vec::new();
        for token in self.token.find_iter(&collapsed).map(|m| m.as_str()) {
            let lemma = lemmatize(token);
            let lemma = lemma.trim();
            if lemma.is_empty() || !Self::should_keep(token, lemma) {
                continue;
            }
            if seen.insert(lemma.to_string()) {
                kept.push(lemma.to_string());
            }
        }

        let normalized = kept.join(" ");
        tracing::debug!("Normalized '{}' -> '{}'", collapsed, normalized);
        normalized
    }

    /// Normalizes an optional string; `None` yields an empty string.
    pub fn normalize_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.normalize(t)).unwrap_or_default()
    }

    /// Normalizes a JSON value; anything other than a string yields an empty string.
    pub fn normalize_value(&self, value: &serde_json::Value) -> String {
        self.normalize_opt(value.as_str())
    }

    /// Decides whether a token survives, given its lemma.
    ///
    /// Allowlisted lemmas are always kept. Otherwise the token is dropped if the token or
    /// its lemma is a stopword, if it is punctuation, if the lemma is a single character
    /// other than `x`/`y`/`z`, or if it is a number shorter than three characters.
    fn should_keep(token: &str, lemma: &str) -> bool {
        if is_domain_keyword(lemma) {
            return true;
        }
        let token = token.to_lowercase();
        if is_stopword(&token) || is_stopword(lemma) {
            return false;
        }
        if is_punctuation(lemma) {
            return false;
        }
        if lemma.chars().count() < 2 && !KEPT_SINGLE_LETTERS.contains(&lemma) {
            return false;
        }
        if is_number_like(lemma) && lemma.chars().count() < 3 {
            return false;
        }
        true
    }
}

fn is_punctuation(s: &str) -> bool {
    !s.chars().any(|c| c.is_alphanumeric() || c == '_')
}

fn is_number_like(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Normalizes `text` with the shared default [`TextNormalizer`].
pub fn normalize(text: &str) -> String {
    DEFAULT_NORMALIZER.normalize(text)
}

/// Normalizes an optional string with the shared default [`TextNormalizer`].
pub fn normalize_opt(text: Option<&str>) -> String {
    DEFAULT_NORMALIZER.normalize_opt(text)
}

/// Normalizes a JSON value with the shared default [`TextNormalizer`].
pub fn normalize_value(value: &serde_json::Value) -> String {
    DEFAULT_NORMALIZER.normalize_value(value)
}

/// Builds the text that represents a snippet before normalization: `"{title} : {summary}"`.
pub fn snippet_embedding_text(title: &str, summary: &str) -> String {
    format!("{title}{TITLE_SUMMARY_SEPARATOR}{summary}")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_basic_query() {
        assert_eq!(
            normalize("How do I drop the rows with missing values in a DataFrame?"),
            "drop row missing value in dataframe"
        );
    }

    #[test]
    fn test_keywords_survive_stopword_filter() {
        // `for`, `in` and `from` are stopwords but also allowlisted
        assert_eq!(
            normalize("import pandas as pd, loop for each row in df"),
            "import pandas as pd loop for row in df"
        );
    }

    #[test]
    fn test_html_entities_and_urls() {
        assert_eq!(
            normalize("Scatter &amp; histogram, see https://example.com/docs?x=1 or www.foo.org"),
            "scatter histogram"
        );
        assert_eq!(normalize("&lt;b&gt;Heatmap&lt;/b&gt;"), "heatmap");
    }

    #[test]
    fn test_special_characters_become_spaces() {
        assert_eq!(normalize("df.groupby('city')['sales'].sum()"), "df groupby city sale sum");
    }

    #[test]
    fn test_numbers_and_single_letters() {
        // short numbers are dropped, long ones kept; x/y/z survive as single letters
        assert_eq!(normalize("plot x vs y for 10 points, 1.5 and 2024"), "plot x vs y for point 1.5 2024");
        assert_eq!(normalize("a b c"), "");
    }

    #[test]
    fn test_inflections_share_normalized_text() {
        assert_eq!(normalize("Normalized columns"), normalize("normalize column"));
        assert_eq!(normalize("Normalized columns"), "normalize column");
        assert_eq!(normalize("scaling the features"), normalize("Scale feature"));
        assert_eq!(normalize("Standardized, sampled data"), "standardize sample data");
        assert_eq!(normalize("visualizing biases"), "visualize bias");
    }

    #[test]
    fn test_deduplicates_in_first_occurrence_order() {
        assert_eq!(normalize("columns column COLUMN rows"), "column row");
    }

    #[test]
    fn test_absent_and_non_string_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t"), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_value(&json!(null)), "");
        assert_eq!(normalize_value(&json!(42)), "");
        assert_eq!(normalize_value(&json!(["drop"])), "");
        assert_eq!(normalize_value(&json!("Dropping rows")), "drop row");
    }

    #[test]
    fn test_snippet_embedding_text() {
        assert_eq!(
            snippet_embedding_text("dropna", "Drop rows with missing values"),
            "dropna : Drop rows with missing values"
        );
        assert_eq!(snippet_embedding_text("dropna", ""), "dropna :");
        assert_eq!(
            normalize(&snippet_embedding_text("dropna", "Drop rows with missing values")),
            "dropna drop row missing value"
        );
    }

    #[test]
    fn test_idempotent_on_examples() {
        for text in [
            "How do I drop the rows with missing values in a DataFrame?",
            "Train a Random Forest classifier & evaluate accuracy (sklearn)",
            "1,000 rows, 12.5% missing -- see http://x.y",
            "&amp;amp; ]] -- ,,, ..",
            "Normalizing and scaling sampled species",
        ] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once, "input: {text}");
        }
    }

    proptest! {
        #[test]
        fn proptest_normalize_is_idempotent(text in "[a-zA-Z0-9 .,;:&#_\\-\\]\\[()/!?'\"]{0,120}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn proptest_output_is_single_spaced(text in "\\PC{0,80}") {
            let out = normalize(&text);
            prop_assert!(!out.starts_with(' '));
            prop_assert!(!out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }
    }
}
