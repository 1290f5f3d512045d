//! Static Include Scanning
//!
//! Extracts `#include <...>` directives from source text without running the
//! preprocessor. Fast and approximate: conditional compilation is not
//! evaluated and quoted includes are ignored. The compiler-assisted path in
//! [`crate::toolchain`] is the authoritative alternative.

use regex::Regex;
use std::path::Path;
use wantlib_core::Result;

/// Read a source file, substituting undecodable bytes.
///
/// Source files occasionally carry stray non-UTF-8 bytes in comments; those
/// must never abort discovery.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scanner for angle-bracket include directives.
pub struct IncludeScanner {
    pattern: Regex,
}

impl IncludeScanner {
    /// Create a scanner.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^\s*#include\s*<([^>]+)>\s*$").unwrap(),
        }
    }

    /// Iterate the headers named by `#include <...>` lines, in order of
    /// appearance. Duplicates are kept; callers deduplicate.
    pub fn scan<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        source.lines().filter_map(move |line| {
            self.pattern
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
    }
}

impl Default for IncludeScanner {
    fn default() -> Self {
        Self::new()
    }
}
