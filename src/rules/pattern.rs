//! Precompiled pattern collections used by classification rules.

use regex::{Regex, RegexBuilder};

/// An ordered collection of compiled regular expressions.
///
/// Matching is a search anywhere in the text, not a full-string match.
/// An empty set never matches; callers decide what "empty" means for them.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles the given pattern strings in order.
    ///
    /// When `ignore_case` is set every pattern is compiled case-insensitively;
    /// otherwise case handling is left to inline flags such as `(?i)`.
    ///
    /// # Errors
    ///
    /// Returns the offending pattern together with its [`regex::Error`] on the
    /// first pattern that fails to compile.
    pub fn compile<S: AsRef<str>>(
        patterns: &[S],
        ignore_case: bool,
    ) -> Result<Self, (String, regex::Error)> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                RegexBuilder::new(pattern)
                    .case_insensitive(ignore_case)
                    .build()
                    .map_err(|error| (pattern.to_string(), error))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if at least one pattern finds a match in `text`.
    #[must_use]
    pub fn matches_any(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }

    /// Returns the number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the set holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
