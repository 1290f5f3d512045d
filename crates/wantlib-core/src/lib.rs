//! Wantlib Core
//!
//! Core types for the wantlib dependency resolver: flag classification,
//! per-platform dependency tables, and shared error types.

pub mod error;
pub mod flags;
pub mod platform;

pub use error::{Error, Result};
pub use flags::FlagSet;
pub use platform::{DependencyRule, PlatformTable, RuleAction, RuleValue};

/// Crate version, for consumers that report it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
