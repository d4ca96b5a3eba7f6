//! Jet database file format engine.
//!
//! The `jetbase` crate (library name `jet`) provides Rust types and functions
//! for opening, reading, and writing files in the Jet family of desktop
//! database formats (versions 3 through 5, commonly carrying the extensions
//! `.mdb` and `.accdb`), while preserving strict binary compatibility with
//! files produced by the original product.
//!
//! # CLI Reference
//!
//! Install the `jetutil` binary and use its subcommands to inspect Jet files
//! from the command line.
//!
//! ## Subcommands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`jetutil info`](cli::app::Commands::Info) | Show format version, page size, table count |
//! | [`jetutil tables`](cli::app::Commands::Tables) | List user tables |
//! | [`jetutil schema`](cli::app::Commands::Schema) | Show a table's columns and indexes |
//! | [`jetutil dump-page`](cli::app::Commands::DumpPage) | Hex dump of a raw page |
//! | [`jetutil validate`](cli::app::Commands::Validate) | Validate index invariants |
//! | [`jetutil export`](cli::app::Commands::Export) | Dump a table's rows as JSON lines |
//!
//! ## Global options
//!
//! All subcommands accept `--color <auto|always|never>` and `--output <file>`.
//! Most accept `--json` for machine-readable output.
//!
//! # Library API
//!
//! ```no_run
//! use jet::jet::database::Database;
//! use jet::jet::database::OpenOptions;
//!
//! let mut db = Database::open("Northwind.mdb", OpenOptions::default()).unwrap();
//! for name in db.table_names() {
//!     println!("{name}");
//! }
//! let mut cursor = db.cursor("Customers").unwrap();
//! while let Some(row) = cursor.move_next_row().unwrap() {
//!     println!("{row:?}");
//! }
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`jet::format`] | Format version descriptors (page size, charset, header mask) |
//! | [`jet::channel`] | Paged file I/O, header masking, codec delegation |
//! | [`jet::codec`] | `CodecHandler` plug-in contract and built-in codecs |
//! | [`jet::usage_map`] | Sparse page-number bitmaps (inline/reference) |
//! | [`jet::value`] | Per-datatype value encode/decode |
//! | [`jet::charset`] | Text index-key per-character encoding tables |
//! | [`jet::row`] | Data page layout, row packing, long values, `RowId` |
//! | [`jet::index`] | B-tree index storage, key encoding, insert/delete |
//! | [`jet::table`] | Table metadata, row CRUD, auto-number, indexes |
//! | [`jet::cursor`] | Table-scan and index cursors |
//! | [`jet::catalog`] | System catalog table |
//! | [`jet::database`] | Top-level `Database` entry point |
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | on | Builds the `jetutil` binary (`clap` + `colored`). |

pub mod cli;
pub mod jet;
pub mod util;

use thiserror::Error;

/// Errors returned by `jet` operations.
#[derive(Error, Debug)]
pub enum JetError {
    /// On-disk bytes violate a format invariant.
    #[error("corrupted format: {0}")]
    CorruptedFormat(String),

    /// Recognized format but the operation is not permitted (e.g. write on a
    /// read-only legacy format).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Underlying read/write failed.
    #[error("I/O error: {0}")]
    IoFailure(String),

    /// Index uniqueness broken by an attempted insert/update.
    #[error("uniqueness violation: {0}")]
    UniquenessViolation(String),

    /// Foreign-key target missing or child rows orphaned.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrityViolation(String),

    /// Explicit auto-number insert refused.
    #[error("auto-number conflict: {0}")]
    AutoNumberConflict(String),

    /// Value does not fit the declared column.
    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    /// Caller supplied a sentinel or pattern inconsistent with the schema.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Benign terminal condition: iteration exhausted.
    #[error("end of file")]
    Eof,

    /// Benign terminal condition: lookup failed.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for JetError {
    fn from(e: std::io::Error) -> Self {
        JetError::IoFailure(e.to_string())
    }
}
