//! Wantlib CLI
//!
//! Command-line frontend for the dependency resolver: scans the given
//! sources and prints the compile and link flags their external headers
//! require.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use wantlib_resolve::{resolve, FlagSet, ResolveOptions};

#[derive(Parser)]
#[command(name = "wantlib")]
#[command(author, version, about = "Resolve compiler and linker flags for external header dependencies", long_about = None)]
struct Cli {
    /// Source files to scan
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Platform dependency table to use
    #[arg(long, default_value_t = default_platform())]
    platform: String,

    /// Compiler the flags are resolved for
    #[arg(long = "cc", value_name = "COMPILER", default_value = "gcc")]
    compiler: String,

    /// Macro definition (NAME or NAME=VALUE), repeatable
    #[arg(short = 'D', long = "define", value_name = "MACRO")]
    defines: Vec<String>,

    /// Ask the real preprocessor for the header list instead of scanning text
    #[arg(long)]
    compiler_deps: bool,

    /// Honor `// gcc:` and `// ldd:` override comments
    #[arg(long)]
    inline: bool,

    /// Print compile flags only
    #[arg(long)]
    cflags: bool,

    /// Print link flags only
    #[arg(long)]
    libs: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

/// The platform identifier matching the host.
fn default_platform() -> String {
    if cfg!(target_os = "macos") {
        "darwin".to_string()
    } else if cfg!(windows) {
        "win32".to_string()
    } else {
        "linux".to_string()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // pkg-config convention: either selector alone restricts the output,
    // neither means both.
    let want_cflags = cli.cflags || !cli.libs;
    let want_lflags = cli.libs || !cli.cflags;

    let mut opts = ResolveOptions::new(cli.platform, cli.compiler);
    opts.macros = cli.defines;
    opts.compiler_discovery = cli.compiler_deps;
    opts.inline_overrides = cli.inline;
    opts.want_cflags = want_cflags;
    opts.want_lflags = want_lflags;

    let flags = resolve(&cli.files, &opts)?;

    match cli.format.as_str() {
        "json" => print_json(&flags, want_cflags, want_lflags)?,
        _ => print_text(&flags, want_cflags, want_lflags),
    }

    Ok(())
}

fn print_text(flags: &FlagSet, want_cflags: bool, want_lflags: bool) {
    let cflags = join(&flags.cflags);
    let lflags = join(&flags.lflags);

    match (want_cflags, want_lflags) {
        (true, false) => println!("{cflags}"),
        (false, true) => println!("{lflags}"),
        _ => {
            println!("cflags: {cflags}");
            println!("lflags: {lflags}");
        }
    }
}

fn print_json(flags: &FlagSet, want_cflags: bool, want_lflags: bool) -> Result<()> {
    let mut result = serde_json::Map::new();
    if want_cflags {
        result.insert("cflags".to_string(), serde_json::json!(&flags.cflags));
    }
    if want_lflags {
        result.insert("lflags".to_string(), serde_json::json!(&flags.lflags));
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn join(tokens: &std::collections::BTreeSet<String>) -> String {
    tokens.iter().cloned().collect::<Vec<_>>().join(" ")
}
