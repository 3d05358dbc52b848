//! Error types for rule table compilation.

use thiserror::Error;

/// Errors raised while compiling a rule table.
///
/// Every variant is a configuration problem: the table is rejected as a whole
/// and nothing is sent to the API.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A pattern in the rule failed to compile as a regular expression.
    #[error("rule '{rule}' has an invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Name of the rule that owns the pattern.
        rule: String,
        /// The pattern text as written in the rule table.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The rule would apply an empty tag.
    #[error("rule '{rule}' has an empty tag")]
    EmptyLabel {
        /// Name of the offending rule.
        rule: String,
    },

    /// The tag contains a character qBittorrent treats as a tag separator.
    #[error("rule '{rule}' has an invalid tag '{tag}': tags must not contain ','")]
    InvalidLabel {
        /// Name of the offending rule.
        rule: String,
        /// The tag as written in the rule table.
        tag: String,
    },
}

impl RuleError {
    /// Creates an invalid pattern error.
    pub fn invalid_pattern(
        rule: impl Into<String>,
        pattern: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        Self::InvalidPattern {
            rule: rule.into(),
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates an empty label error.
    pub fn empty_label(rule: impl Into<String>) -> Self {
        Self::EmptyLabel { rule: rule.into() }
    }

    /// Creates an invalid label error.
    pub fn invalid_label(rule: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::InvalidLabel {
            rule: rule.into(),
            tag: tag.into(),
        }
    }
}
