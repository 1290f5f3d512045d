//! Flag Classification
//!
//! Partitions raw flag token streams into compile-flag and link-flag sets,
//! following GCC-style flag conventions. Library flags must land in the link
//! set and nowhere else; a `-L` silently dropped into the compile set breaks
//! the consumer's link step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Accumulated compile and link flags for one resolution run.
///
/// Set semantics: duplicates collapse, order is irrelevant. `BTreeSet` keeps
/// rendering deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    /// Flags for the compile step (`-I`, `-D`, ...).
    pub cflags: BTreeSet<String>,
    /// Flags for the link step (`-l`, `-L`, ...).
    pub lflags: BTreeSet<String>,
}

/// Where a classified token (and possibly its argument) lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dest {
    /// Token and the following argument both go to link flags.
    LinkPair,
    /// Token goes to link flags alone.
    Link,
    /// Token goes to both sets.
    Both,
    /// Token and the following argument both go to compile flags.
    CompilePair,
    /// Token goes to compile flags alone.
    Compile,
}

/// One classification rule: a predicate over the token and whether a
/// following argument token exists, and the destination when it matches.
type Rule = (fn(&str, bool) -> bool, Dest);

/// The fixed classification rules, checked top to bottom per token position.
/// First match wins, so new rules must be inserted with the ordering in mind.
const RULES: [Rule; 5] = [
    (|tok, next| (tok == "-l" || tok == "-L") && next, Dest::LinkPair),
    (
        |tok, _| tok.starts_with("-l") || tok.starts_with("-L"),
        Dest::Link,
    ),
    (|tok, _| tok == "-pthread", Dest::Both),
    (
        |tok, next| tok.len() == 2 && tok.starts_with('-') && next,
        Dest::CompilePair,
    ),
    (|_, _| true, Dest::Compile),
];

impl FlagSet {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if both sets are empty.
    pub fn is_empty(&self) -> bool {
        self.cflags.is_empty() && self.lflags.is_empty()
    }

    /// Merge another flag set into this one.
    pub fn merge(&mut self, other: FlagSet) {
        self.cflags.extend(other.cflags);
        self.lflags.extend(other.lflags);
    }

    /// Classify an ordered token stream into the two sets.
    ///
    /// Consumes one or two tokens per step depending on the matched rule.
    /// Empty tokens are skipped; the sets never hold empty entries.
    pub fn classify<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let mut pos = 0;
        while pos < tokens.len() {
            let tok = tokens[pos].as_ref();
            if tok.is_empty() {
                pos += 1;
                continue;
            }
            let has_next = pos + 1 < tokens.len();
            let dest = RULES
                .iter()
                .find(|(matches, _)| matches(tok, has_next))
                .map_or(Dest::Compile, |(_, dest)| *dest);

            match dest {
                Dest::LinkPair => {
                    self.lflags.insert(tok.to_string());
                    self.lflags.insert(tokens[pos + 1].as_ref().to_string());
                    pos += 1;
                }
                Dest::Link => {
                    self.lflags.insert(tok.to_string());
                }
                Dest::Both => {
                    self.cflags.insert(tok.to_string());
                    self.lflags.insert(tok.to_string());
                }
                Dest::CompilePair => {
                    self.cflags.insert(tok.to_string());
                    self.cflags.insert(tokens[pos + 1].as_ref().to_string());
                    pos += 1;
                }
                Dest::Compile => {
                    self.cflags.insert(tok.to_string());
                }
            }
            pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(tokens: &[&str]) -> FlagSet {
        let mut flags = FlagSet::new();
        flags.classify(tokens);
        flags
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_lib_flags_consume_argument() {
        let flags = classify(&["-l", "m", "-L", "/opt/lib"]);
        assert_eq!(flags.lflags, set(&["-l", "m", "-L", "/opt/lib"]));
        assert!(flags.cflags.is_empty());
    }

    #[test]
    fn attached_lib_flags_go_to_link() {
        let flags = classify(&["-lm", "-L/opt/lib", "-lssl"]);
        assert_eq!(flags.lflags, set(&["-lm", "-L/opt/lib", "-lssl"]));
        assert!(flags.cflags.is_empty());
    }

    #[test]
    fn pthread_lands_in_both_sets() {
        let flags = classify(&["-pthread"]);
        assert_eq!(flags.cflags, set(&["-pthread"]));
        assert_eq!(flags.lflags, set(&["-pthread"]));
    }

    #[test]
    fn short_flag_consumes_argument_into_cflags() {
        let flags = classify(&["-I", "/usr/include/foo", "-D", "BAR=1"]);
        assert_eq!(
            flags.cflags,
            set(&["-I", "/usr/include/foo", "-D", "BAR=1"])
        );
        assert!(flags.lflags.is_empty());
    }

    #[test]
    fn attached_short_flags_go_to_cflags_alone() {
        let flags = classify(&["-I/usr/include", "-DNDEBUG", "-O2", "-Wall"]);
        assert_eq!(
            flags.cflags,
            set(&["-I/usr/include", "-DNDEBUG", "-O2", "-Wall"])
        );
        assert!(flags.lflags.is_empty());
    }

    #[test]
    fn no_token_is_dropped() {
        let tokens = [
            "-I/inc", "-lfoo", "-L", "/lib", "-pthread", "-DX=1", "-O2", "plain",
        ];
        let flags = classify(&tokens);
        let mut all: BTreeSet<String> = flags.cflags.clone();
        all.extend(flags.lflags.clone());
        for tok in tokens {
            assert!(all.contains(tok), "token {tok:?} was dropped");
        }
    }

    #[test]
    fn classification_is_idempotent() {
        let tokens = ["-lz", "-L", "/lib", "-pthread", "-I", "/inc", "-O2"];
        let once = classify(&tokens);
        let mut twice = once.clone();
        twice.classify(&tokens);
        assert_eq!(once, twice);
    }

    #[test]
    fn trailing_bare_lib_flag_stays_in_link_set() {
        // A dangling `-l` has no argument to pair with; it still must not
        // end up in the compile set.
        let flags = classify(&["-l"]);
        assert_eq!(flags.lflags, set(&["-l"]));
        assert!(flags.cflags.is_empty());
    }

    #[test]
    fn trailing_short_flag_goes_to_cflags_alone() {
        let flags = classify(&["-I"]);
        assert_eq!(flags.cflags, set(&["-I"]));
        assert!(flags.lflags.is_empty());
    }

    #[test]
    fn empty_tokens_are_skipped() {
        let flags = classify(&["", "-lm", ""]);
        assert_eq!(flags.lflags, set(&["-lm"]));
        assert!(flags.cflags.is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let flags = classify(&["-lm", "-lm", "-O2", "-O2"]);
        assert_eq!(flags.lflags.len(), 1);
        assert_eq!(flags.cflags.len(), 1);
    }

    #[test]
    fn merge_unions_both_sets() {
        let mut a = classify(&["-lm"]);
        let b = classify(&["-I/inc", "-lz"]);
        a.merge(b);
        assert_eq!(a.cflags, set(&["-I/inc"]));
        assert_eq!(a.lflags, set(&["-lm", "-lz"]));
    }
}
