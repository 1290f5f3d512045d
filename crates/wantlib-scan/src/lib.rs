//! Wantlib Scan
//!
//! Header discovery and flag extraction from C sources: static include
//! scanning, inline flag overrides, the compiler toolchain bridge, and the
//! pkg-config bridge.
//!
//! ## Modules
//!
//! - `extract` - Static `#include <...>` scanning
//! - `inline` - `// gcc:` / `// ldd:` override comments
//! - `toolchain` - Compiler-assisted header discovery
//! - `pkgconfig` - pkg-config queries

pub mod extract;
pub mod inline;
pub mod pkgconfig;
pub mod toolchain;

pub use extract::{read_source, IncludeScanner};
pub use inline::OverrideScanner;
pub use pkgconfig::{PackageQuery, PkgConfigClient};
pub use toolchain::{compiler_headers, CompilerDriver, PreprocessorService};
