use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "jetutil")]
#[command(about = "Jet/Access database file inspection toolkit")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show format version, page size, and table count
    Info {
        /// Path to a .mdb or .accdb file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List user tables
    Tables {
        /// Path to a .mdb or .accdb file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show a table's columns and indexes
    Schema {
        /// Path to a .mdb or .accdb file
        #[arg(short, long)]
        file: String,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Hex dump of a raw page
    DumpPage {
        /// Path to a .mdb or .accdb file
        #[arg(short, long)]
        file: String,

        /// Page number to dump
        #[arg(short, long)]
        page: u64,
    },

    /// Validate every index's ordering and uniqueness invariants
    Validate {
        /// Path to a .mdb or .accdb file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Dump a table's rows as JSON lines
    Export {
        /// Path to a .mdb or .accdb file
        #[arg(short, long)]
        file: String,

        /// Table name
        #[arg(short, long)]
        table: String,
    },
}
