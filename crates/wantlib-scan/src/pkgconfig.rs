//! pkg-config Bridge
//!
//! Queries the external `pkg-config` tool for the compile and link flags of
//! a named package.

use std::process::{Command, Stdio};
use wantlib_core::{Error, Result};

/// External package-query capability.
///
/// Like the preprocessor bridge, this is a narrow interface so resolution
/// logic can be tested with fakes returning canned flag lists.
pub trait PackageQuery {
    /// Query flags for `package`. `cflags` and `libs` independently select
    /// which flag sets are requested.
    fn query(&self, package: &str, cflags: bool, libs: bool) -> Result<Vec<String>>;
}

/// Subprocess-backed pkg-config client.
#[derive(Debug, Clone, Copy, Default)]
pub struct PkgConfigClient;

/// Build the pkg-config argument list for a query.
fn query_args<'a>(package: &'a str, cflags: bool, libs: bool) -> Vec<&'a str> {
    let mut args = Vec::with_capacity(3);
    if cflags {
        args.push("--cflags");
    }
    if libs {
        args.push("--libs");
    }
    args.push(package);
    args
}

impl PackageQuery for PkgConfigClient {
    fn query(&self, package: &str, cflags: bool, libs: bool) -> Result<Vec<String>> {
        let output = Command::new("pkg-config")
            .args(query_args(package, cflags, libs))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::toolchain("pkg-config", e.to_string()))?;

        if !output.status.success() {
            return Err(Error::toolchain(
                "pkg-config",
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}
