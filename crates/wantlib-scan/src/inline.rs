//! Inline Flag Overrides
//!
//! Sources may pin extra flags directly with `// gcc: <flags>` and
//! `// ldd: <flags>` comment lines. These bypass the dependency tables and
//! the classifier entirely: the tokens land verbatim in the compile-flag and
//! link-flag sets respectively.

use regex::Regex;
use tracing::warn;
use wantlib_core::FlagSet;

/// Scanner for inline override comments.
pub struct OverrideScanner {
    cflag_pattern: Regex,
    lflag_pattern: Regex,
}

impl OverrideScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self {
            cflag_pattern: Regex::new(r"(?i)^//\s*gcc\s*:\s*(.+)$").unwrap(),
            lflag_pattern: Regex::new(r"(?i)^//\s*ldd\s*:\s*(.+)$").unwrap(),
        }
    }

    /// Merge every override found in `source` into `flags`.
    ///
    /// Flag text is split with shell-quoting rules; a directive whose text
    /// cannot be tokenized (unbalanced quoting) is skipped with a warning.
    pub fn scan(&self, source: &str, flags: &mut FlagSet) {
        for line in source.lines() {
            if let Some(caps) = self.cflag_pattern.captures(line) {
                match shlex::split(caps[1].trim()) {
                    Some(tokens) => flags
                        .cflags
                        .extend(tokens.into_iter().filter(|t| !t.is_empty())),
                    None => warn!("unparseable inline gcc directive: {line:?}"),
                }
            }
            if let Some(caps) = self.lflag_pattern.captures(line) {
                match shlex::split(caps[1].trim()) {
                    Some(tokens) => flags
                        .lflags
                        .extend(tokens.into_iter().filter(|t| !t.is_empty())),
                    None => warn!("unparseable inline ldd directive: {line:?}"),
                }
            }
        }
    }
}

impl Default for OverrideScanner {
    fn default() -> Self {
        Self::new()
    }
}
