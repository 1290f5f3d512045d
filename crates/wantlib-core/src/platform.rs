//! Platform Dependency Tables
//!
//! Declarative per-platform tables mapping header glob patterns to the flags
//! (or pkg-config packages) that satisfy them. Tables are YAML documents
//! embedded in this crate, one per supported platform, and are matched with
//! fnmatch-style globs where `*` crosses directory separators.

use globset::{Glob, GlobMatcher};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{Error, Result};

/// Rule key delegating resolution to pkg-config.
const PKG_CONFIG_KEY: &str = "pkg-config";

/// Marker prefix for rule values that refer to a sibling key.
const REFERENCE_MARKER: char = '$';

/// Embedded dependency tables, keyed by platform identifier.
const PLATFORMS: &[(&str, &str)] = &[
    ("linux", include_str!("../platforms/linux.yml")),
    ("darwin", include_str!("../platforms/darwin.yml")),
    ("win32", include_str!("../platforms/win32.yml")),
];

/// A rule value: either a literal flag string or a reference to another key
/// within the same rule. References resolve exactly one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue<'a> {
    /// The value is used as-is.
    Literal(&'a str),
    /// The value names a sibling key whose value is used instead.
    Reference(&'a str),
}

impl<'a> RuleValue<'a> {
    /// Parse a raw rule value, recognizing the `$name` reference form.
    pub fn parse(value: &'a str) -> Self {
        if value.starts_with(REFERENCE_MARKER) {
            RuleValue::Reference(value.trim_start_matches(REFERENCE_MARKER))
        } else {
            RuleValue::Literal(value)
        }
    }
}

/// The contribution a matched rule makes for a given compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction<'a> {
    /// A literal flag string to tokenize and classify.
    Flags(&'a str),
    /// Delegate to pkg-config for this package.
    PkgConfig(&'a str),
}

/// One dependency rule: option values keyed by compiler name, the literal
/// `pkg-config`, or fallback names used only via indirection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRule {
    options: BTreeMap<String, String>,
}

impl DependencyRule {
    /// Build a rule from its raw option map.
    pub fn new(options: BTreeMap<String, String>) -> Self {
        Self { options }
    }

    /// What this rule contributes for `compiler`: a flag string (after one
    /// level of `$name` indirection) if the compiler is named, else a
    /// pkg-config delegation if the rule carries one, else nothing.
    pub fn action_for(&self, compiler: &str) -> Option<RuleAction<'_>> {
        if let Some(value) = self.options.get(compiler) {
            return match RuleValue::parse(value) {
                RuleValue::Literal(flags) => Some(RuleAction::Flags(flags)),
                RuleValue::Reference(key) => match self.options.get(key) {
                    Some(target) => Some(RuleAction::Flags(target)),
                    None => {
                        warn!("rule option {value:?} for {compiler} names no key; ignoring");
                        None
                    }
                },
            };
        }
        self.options
            .get(PKG_CONFIG_KEY)
            .map(|package| RuleAction::PkgConfig(package))
    }
}

/// A compiled pattern/rule pair.
#[derive(Debug, Clone)]
struct PatternRule {
    pattern: String,
    matcher: GlobMatcher,
    rule: DependencyRule,
}

/// A parsed per-platform dependency table.
#[derive(Debug, Clone, Default)]
pub struct PlatformTable {
    rules: Vec<PatternRule>,
}

impl PlatformTable {
    /// Load the embedded table for a platform identifier.
    ///
    /// Fails with [`Error::PlatformNotSupported`] if no table is embedded
    /// for the platform.
    pub fn load(platform: &str) -> Result<Self> {
        let text = PLATFORMS
            .iter()
            .find(|(name, _)| *name == platform)
            .map(|(_, text)| *text)
            .ok_or_else(|| Error::PlatformNotSupported(platform.to_string()))?;
        Self::parse(text)
    }

    /// Parse a dependency table from YAML text.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, String>> =
            serde_yaml::from_str(text).map_err(|e| Error::Table(e.to_string()))?;

        let mut rules = Vec::with_capacity(raw.len());
        for (pattern, options) in raw {
            let matcher = Glob::new(&pattern)
                .map_err(|e| Error::Pattern {
                    pattern: pattern.clone(),
                    detail: e.to_string(),
                })?
                .compile_matcher();
            rules.push(PatternRule {
                pattern,
                matcher,
                rule: DependencyRule::new(options),
            });
        }
        Ok(Self { rules })
    }

    /// Number of pattern rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the table holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules whose pattern matches the given header name. Every match
    /// contributes independently; there is no precedence among patterns.
    pub fn matching<'a>(&'a self, header: &'a str) -> impl Iterator<Item = &'a DependencyRule> {
        self.rules
            .iter()
            .filter(move |entry| entry.matcher.is_match(header))
            .map(|entry| &entry.rule)
    }

    /// The patterns in this table, for diagnostics.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|entry| entry.pattern.as_str())
    }

    /// Identifiers of the platforms with embedded tables.
    pub fn supported_platforms() -> impl Iterator<Item = &'static str> {
        PLATFORMS.iter().map(|(name, _)| *name)
    }
}
