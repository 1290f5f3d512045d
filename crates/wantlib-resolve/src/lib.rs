//! Wantlib Resolver
//!
//! Ties header discovery, the platform dependency tables, and flag
//! classification together into the public resolution entry point: given
//! source files, a platform, and a compiler, produce the compile and link
//! flags their external header dependencies require.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

use wantlib_core::{PlatformTable, Result, RuleAction};
use wantlib_scan::{
    compiler_headers, read_source, CompilerDriver, IncludeScanner, OverrideScanner, PackageQuery,
    PkgConfigClient, PreprocessorService,
};

pub use wantlib_core::{Error, FlagSet};

/// Parameters for one resolution call.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Platform identifier naming the dependency table to use.
    pub platform: String,
    /// Compiler the flags are resolved for.
    pub compiler: String,
    /// Macro definitions for compiler-assisted discovery (`NAME` or
    /// `NAME=VALUE`, passed as `-D` flags).
    pub macros: Vec<String>,
    /// Discover headers with the real preprocessor instead of a text scan.
    pub compiler_discovery: bool,
    /// Honor `// gcc:` / `// ldd:` override comments.
    pub inline_overrides: bool,
    /// Request compile flags from pkg-config.
    pub want_cflags: bool,
    /// Request link flags from pkg-config.
    pub want_lflags: bool,
}

impl ResolveOptions {
    /// Options with the default switches: static discovery, no inline
    /// overrides, both flag sets requested.
    pub fn new(platform: impl Into<String>, compiler: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            compiler: compiler.into(),
            macros: Vec::new(),
            compiler_discovery: false,
            inline_overrides: false,
            want_cflags: true,
            want_lflags: true,
        }
    }
}

/// The resolver, holding the bridges to the external tools.
#[derive(Debug, Clone, Default)]
pub struct Resolver<P = CompilerDriver, Q = PkgConfigClient> {
    preprocessor: P,
    packages: Q,
}

impl Resolver {
    /// Resolver backed by the real compiler and pkg-config.
    pub fn new() -> Self {
        Self {
            preprocessor: CompilerDriver,
            packages: PkgConfigClient,
        }
    }
}

impl<P: PreprocessorService, Q: PackageQuery> Resolver<P, Q> {
    /// Resolver with custom tool bridges.
    pub fn with_services(preprocessor: P, packages: Q) -> Self {
        Self {
            preprocessor,
            packages,
        }
    }

    /// Resolve the compile and link flags required by `sources`.
    ///
    /// Any failure aborts the whole call; the flag sets are never returned
    /// partially populated.
    pub fn resolve(&self, sources: &[PathBuf], opts: &ResolveOptions) -> Result<FlagSet> {
        let include_scanner = IncludeScanner::new();
        let override_scanner = OverrideScanner::new();

        let mut flags = FlagSet::new();
        let mut headers: BTreeSet<String> = BTreeSet::new();

        for source in sources {
            if opts.compiler_discovery {
                headers.extend(compiler_headers(
                    &self.preprocessor,
                    &opts.compiler,
                    source,
                    &opts.macros,
                )?);
                if opts.inline_overrides {
                    let text = read_source(source)?;
                    override_scanner.scan(&text, &mut flags);
                }
            } else {
                let text = read_source(source)?;
                headers.extend(include_scanner.scan(&text).map(str::to_string));
                if opts.inline_overrides {
                    override_scanner.scan(&text, &mut flags);
                }
            }
        }
        debug!("Discovered {} distinct headers", headers.len());

        let table = PlatformTable::load(&opts.platform)?;
        for header in &headers {
            for rule in table.matching(header) {
                match rule.action_for(&opts.compiler) {
                    Some(RuleAction::Flags(value)) => {
                        let tokens: Vec<&str> = value.split_whitespace().collect();
                        flags.classify(&tokens);
                    }
                    Some(RuleAction::PkgConfig(package)) => {
                        let tokens =
                            self.packages
                                .query(package, opts.want_cflags, opts.want_lflags)?;
                        flags.classify(&tokens);
                    }
                    None => {}
                }
            }
        }

        Ok(flags)
    }
}

/// Resolve flags for `sources` with the real compiler and pkg-config.
pub fn resolve(sources: &[PathBuf], opts: &ResolveOptions) -> Result<FlagSet> {
    Resolver::new().resolve(sources, opts)
}
