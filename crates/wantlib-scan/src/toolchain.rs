//! Compiler-Assisted Header Discovery
//!
//! Wraps the real compiler to discover the authoritative header set for a
//! source file: one run in verbose-preprocess mode to learn the system
//! include search path, one run in make-rule dependency mode to list every
//! header the file pulls in after macro expansion and conditional
//! compilation.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;
use wantlib_core::{Error, Result};

/// Marker line opening the search-path listing in verbose preprocessor output.
const SEARCH_START: &str = "#include <...> search starts here:";

/// Marker line closing the listing.
const SEARCH_END: &str = "End of search list.";

/// External preprocessor capability.
///
/// The resolver depends on the compiler only through this interface, so
/// tests can drive it with canned output instead of real subprocesses.
pub trait PreprocessorService {
    /// Verbose-preprocess empty input and return the combined diagnostic
    /// output, which carries the include search path listing.
    fn probe(&self, compiler: &str) -> Result<String>;

    /// Run the compiler's make-rule dependency mode on `source` with the
    /// given macro definitions and return the raw rule output.
    fn dependencies(&self, compiler: &str, source: &Path, macros: &[String]) -> Result<String>;
}

/// Subprocess-backed implementation of [`PreprocessorService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilerDriver;

impl PreprocessorService for CompilerDriver {
    fn probe(&self, compiler: &str) -> Result<String> {
        let args = ["-xc", "-E", "-v", "-"];
        invoke(compiler, args.iter().map(|s| s.to_string()), true)
    }

    fn dependencies(&self, compiler: &str, source: &Path, macros: &[String]) -> Result<String> {
        let mut args = vec!["-M".to_string()];
        args.extend(macros.iter().map(|m| format!("-D{m}")));
        args.push(source.display().to_string());
        invoke(compiler, args.into_iter(), false)
    }
}

/// Run a tool to completion with empty stdin.
///
/// A launch failure or non-zero exit is fatal; the tool's stderr is
/// preserved in the error. With `merge_stderr`, diagnostic output is
/// appended to stdout (the search-path listing arrives on stderr).
fn invoke(
    tool: &str,
    args: impl Iterator<Item = String>,
    merge_stderr: bool,
) -> Result<String> {
    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::toolchain(tool, e.to_string()))?;

    if !output.status.success() {
        return Err(Error::toolchain(
            tool,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if merge_stderr {
        text.push_str(&String::from_utf8_lossy(&output.stderr));
    }
    Ok(text)
}

/// Extract the include search directories from verbose preprocessor output.
///
/// The contract is a line exactly matching the start marker, one directory
/// per line, and a line exactly matching the end marker. Output with no
/// markers yields an empty list.
pub fn parse_search_dirs(output: &str) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut in_list = false;
    for line in output.lines() {
        if line == SEARCH_START {
            in_list = true;
        } else if line == SEARCH_END {
            break;
        } else if in_list {
            dirs.push(PathBuf::from(line.trim()));
        }
    }
    dirs
}

/// Parse make-rule dependency output into header names.
///
/// Everything after the first `:` is treated as a whitespace and
/// line-continuation separated token list. The source file itself is
/// skipped. Tokens under a search directory are rewritten relative to it
/// (first directory that applies wins); anything else is kept as-is. The
/// parse is best-effort token by token, with no structural validation.
pub fn parse_dependency_rule(output: &str, source: &Path, search_dirs: &[PathBuf]) -> Vec<String> {
    let rhs = output
        .split_once(':')
        .map_or(output, |(_, rest)| rest);

    let mut headers = Vec::new();
    for line in rhs.lines() {
        for token in line.trim().trim_end_matches('\\').split_whitespace() {
            let path = Path::new(token);
            if path == source {
                continue;
            }
            let name = search_dirs
                .iter()
                .find_map(|dir| path.strip_prefix(dir).ok())
                .map_or_else(|| token.to_string(), |rel| rel.display().to_string());
            headers.push(name);
        }
    }
    headers
}

/// Discover the headers `source` actually pulls in by invoking the compiler.
pub fn compiler_headers<P: PreprocessorService>(
    service: &P,
    compiler: &str,
    source: &Path,
    macros: &[String],
) -> Result<Vec<String>> {
    let probe = service.probe(compiler)?;
    let search_dirs = parse_search_dirs(&probe);
    debug!(
        "Discovered {} include search dirs for {}",
        search_dirs.len(),
        compiler
    );

    let deps = service.dependencies(compiler, source, macros)?;
    Ok(parse_dependency_rule(&deps, source, &search_dirs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROBE_OUTPUT: &str = "\
ignoring nonexistent directory \"/usr/local/include/x86_64-linux-gnu\"
#include \"...\" search starts here:
#include <...> search starts here:
 /usr/lib/gcc/x86_64-linux-gnu/12/include
 /usr/local/include
 /usr/include
End of search list.
# 1 \"<stdin>\"
";

    #[test]
    fn search_dirs_are_read_between_markers() {
        let dirs = parse_search_dirs(PROBE_OUTPUT);
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/usr/lib/gcc/x86_64-linux-gnu/12/include"),
                PathBuf::from("/usr/local/include"),
                PathBuf::from("/usr/include"),
            ]
        );
    }

    #[test]
    fn missing_markers_yield_no_dirs() {
        assert!(parse_search_dirs("nothing to see here\n").is_empty());
    }

    #[test]
    fn end_marker_without_start_stops_the_scan() {
        let output = "End of search list.\n#include <...> search starts here:\n /usr/include\n";
        assert!(parse_search_dirs(output).is_empty());
    }

    #[test]
    fn dependency_rule_tokens_are_relativized() {
        let output = "\
main.o: main.c /usr/include/stdio.h \\
 /usr/include/bits/types.h \\
 /opt/vendor/special.h
";
        let dirs = vec![PathBuf::from("/usr/include")];
        let headers = parse_dependency_rule(output, Path::new("main.c"), &dirs);
        assert_eq!(
            headers,
            vec!["stdio.h", "bits/types.h", "/opt/vendor/special.h"]
        );
    }

    #[test]
    fn first_matching_search_dir_wins() {
        let output = "main.o: main.c /usr/include/sys/types.h";
        let dirs = vec![
            PathBuf::from("/usr/include/sys"),
            PathBuf::from("/usr/include"),
        ];
        let headers = parse_dependency_rule(output, Path::new("main.c"), &dirs);
        assert_eq!(headers, vec!["types.h"]);
    }

    #[test]
    fn output_without_colon_is_parsed_as_a_whole() {
        let output = "/usr/include/stdio.h\n";
        let headers = parse_dependency_rule(output, Path::new("main.c"), &[]);
        assert_eq!(headers, vec!["/usr/include/stdio.h"]);
    }

    #[test]
    fn the_source_file_is_not_a_header() {
        let output = "main.o: main.c /usr/include/stdio.h";
        let headers = parse_dependency_rule(output, Path::new("main.c"), &[]);
        assert_eq!(headers, vec!["/usr/include/stdio.h"]);
    }

    struct CannedPreprocessor {
        probe: &'static str,
        deps: &'static str,
    }

    impl PreprocessorService for CannedPreprocessor {
        fn probe(&self, _compiler: &str) -> Result<String> {
            Ok(self.probe.to_string())
        }

        fn dependencies(&self, _compiler: &str, _source: &Path, _macros: &[String]) -> Result<String> {
            Ok(self.deps.to_string())
        }
    }

    #[test]
    fn compiler_headers_composes_probe_and_dependency_runs() {
        let service = CannedPreprocessor {
            probe: PROBE_OUTPUT,
            deps: "app.o: app.c /usr/include/pthread.h /usr/include/sys/epoll.h",
        };
        let headers =
            compiler_headers(&service, "gcc", Path::new("app.c"), &[]).unwrap();
        assert_eq!(headers, vec!["pthread.h", "sys/epoll.h"]);
    }
}
