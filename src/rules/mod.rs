//! Rule-based classification of torrent names.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s. Each rule pairs an
//! inclusion [`PatternSet`], an exclusion [`PatternSet`] and a tag. Resolution
//! walks the rules in declared order and the first rule that survives its own
//! exclusions and matches its inclusions wins:
//!
//! 1. Disabled rules are skipped.
//! 2. If any exclusion pattern matches, the rule is skipped.
//! 3. A rule with no inclusion patterns is a catch-all and matches.
//! 4. Otherwise the rule matches if any inclusion pattern matches.
//!
//! Order is a priority: place specific rules first and a catch-all last.
//!
//! # Example
//!
//! ```
//! use auto_tagger_core::rules::{RuleSet, default_rules};
//!
//! let rules = RuleSet::compile(&default_rules()).unwrap();
//! assert_eq!(rules.resolve("Show.Name.S02E05.1080p"), Some("Episode"));
//! assert_eq!(rules.resolve("Show.Name.Season.02.Complete"), Some("Season"));
//! assert_eq!(rules.resolve("Some.Documentary.1080p"), Some("Unmatched"));
//! ```

mod error;
mod pattern;

pub use error::RuleError;
pub use pattern::PatternSet;

use serde::Deserialize;
use tracing::{debug, trace};

/// Episode-shaped names: `S01E02` or dated releases like `2023.04.05`.
const EPISODE_PATTERNS: [&str; 2] = [r"(?i)S\d{1,3}E\d{1,3}", r"\b\d{4}\D+\d{2}\D+\d{2}\b"];

/// Season-shaped names: `S03` or `Season 3` / `Season.3`.
const SEASON_PATTERN: &str = r"(?i)(?:S\d{1,3}|Season[\s\.]\d{1,3})";

/// Separator qBittorrent uses between tags.
const TAG_SEPARATOR: char = ',';

/// Rule definition as it appears in configuration, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Diagnostic name, used only in logs and errors.
    pub name: String,
    /// Disabled rules never produce a tag.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Tag applied when the rule matches.
    #[serde(alias = "label")]
    pub tag: String,
    /// Inclusion patterns. Empty means the rule is a catch-all.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Exclusion patterns, checked before inclusion.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Compile every pattern of this rule case-insensitively.
    #[serde(default)]
    pub ignore_case: bool,
}

fn default_enabled() -> bool {
    true
}

impl RuleSpec {
    /// Creates an enabled rule specification.
    #[must_use]
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            tag: tag.into(),
            patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            ignore_case: false,
        }
    }

    /// Sets the inclusion patterns.
    #[must_use]
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the exclusion patterns.
    #[must_use]
    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Returns the built-in rule table: Episode, then Season, then an Unmatched catch-all.
#[must_use]
pub fn default_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("Episode", "Episode").with_patterns(EPISODE_PATTERNS),
        RuleSpec::new("Season", "Season")
            .with_patterns([SEASON_PATTERN])
            .with_exclude_patterns([EPISODE_PATTERNS[0]]),
        RuleSpec::new("Unmatched", "Unmatched").with_exclude_patterns([
            EPISODE_PATTERNS[0],
            EPISODE_PATTERNS[1],
            SEASON_PATTERN,
        ]),
    ]
}

/// A compiled classification rule. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    enabled: bool,
    tag: String,
    include: PatternSet,
    exclude: PatternSet,
}

impl Rule {
    /// Compiles a rule from its specification.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::EmptyLabel`] for a blank tag,
    /// [`RuleError::InvalidLabel`] for a tag containing the `,` separator and
    /// [`RuleError::InvalidPattern`] for the first pattern that fails to compile.
    pub fn compile(spec: &RuleSpec) -> Result<Self, RuleError> {
        let tag = spec.tag.trim();
        if tag.is_empty() {
            return Err(RuleError::empty_label(&spec.name));
        }
        // qBittorrent splits tag fields on ','
        if tag.contains(TAG_SEPARATOR) {
            return Err(RuleError::invalid_label(&spec.name, tag));
        }

        let include = PatternSet::compile(&spec.patterns, spec.ignore_case)
            .map_err(|(pattern, source)| RuleError::invalid_pattern(&spec.name, pattern, source))?;
        let exclude = PatternSet::compile(&spec.exclude_patterns, spec.ignore_case)
            .map_err(|(pattern, source)| RuleError::invalid_pattern(&spec.name, pattern, source))?;

        Ok(Self {
            name: spec.name.clone(),
            enabled: spec.enabled,
            tag: tag.to_string(),
            include,
            exclude,
        })
    }

    /// Diagnostic name of the rule.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag applied when the rule matches.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether the rule takes part in resolution.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if the rule has no inclusion patterns.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.include.is_empty()
    }

    /// Evaluates the rule against a name, ignoring the enabled flag.
    ///
    /// Exclusion takes precedence over inclusion.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if !self.exclude.is_empty() && self.exclude.matches_any(name) {
            return false;
        }
        self.include.is_empty() || self.include.matches_any(name)
    }
}

/// Ordered rule list; first satisfying rule wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compiles every rule specification, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] encountered. No partial rule set is produced.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        let rules = specs.iter().map(Rule::compile).collect::<Result<Vec<_>, _>>()?;
        debug!(rules = rules.len(), "Compiled rule table");
        Ok(Self { rules })
    }

    /// Resolves the tag for a torrent name, or `None` if no rule matches.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.resolve_rule(name).map(Rule::tag)
    }

    /// Returns the first enabled rule that matches the name.
    #[must_use]
    pub fn resolve_rule(&self, name: &str) -> Option<&Rule> {
        let matched = self
            .rules
            .iter()
            .filter(|rule| rule.is_enabled())
            .find(|rule| {
                let hit = rule.matches(name);
                trace!(rule = rule.name(), hit, "Evaluated rule");
                hit
            });
        match matched {
            Some(rule) => {
                debug!(
                    rule = rule.name(),
                    tag = rule.tag(),
                    torrent = name,
                    "Rule matched"
                );
            }
            None => {
                debug!(torrent = name, "No rule matched");
            }
        }
        matched
    }

    /// Returns the rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Returns the number of rules, enabled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
