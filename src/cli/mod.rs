//! CLI subcommand implementations for the `jetutil` binary.
//!
//! Each subcommand module follows the same pattern: an `Options` struct
//! holding the parsed arguments and a `pub fn execute(opts, writer) ->
//! Result<(), JetError>` entry point. The `writer: &mut dyn Write` parameter
//! allows output to be captured in tests or redirected to a file via the
//! global `--output` flag.
//!
//! # Subcommands
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `jetutil info` | [`info`] | Format version, page size, table count |
//! | `jetutil tables` | [`tables`] | List user tables |
//! | `jetutil schema` | [`schema`] | Show a table's columns and indexes |
//! | `jetutil dump-page` | [`dump_page`] | Hex dump of a raw page |
//! | `jetutil validate` | [`validate`] | Validate every index's invariants |
//! | `jetutil export` | [`export`] | Dump a table's rows as JSON lines |

pub mod app;
pub mod dump_page;
pub mod export;
pub mod info;
pub mod schema;
pub mod tables;
pub mod validate;

/// Write a line to the given writer, converting io::Error to JetError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::JetError::IoFailure(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::JetError::IoFailure(e.to_string()))
    };
}

pub(crate) use wprintln;
