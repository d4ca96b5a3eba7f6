#[cfg(not(feature = "cli"))]
compile_error!("The `jetutil` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use jet::cli;
use jet::cli::app::{Cli, ColorMode, Commands};
use jet::JetError;

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, JetError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| JetError::IoFailure(format!("cannot create {}: {e}", path))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Info { file, json } => cli::info::execute(&cli::info::InfoOptions { file, json }, &mut writer),

        Commands::Tables { file, json } => cli::tables::execute(&cli::tables::TablesOptions { file, json }, &mut writer),

        Commands::Schema { file, table, json } => {
            cli::schema::execute(&cli::schema::SchemaOptions { file, table, json }, &mut writer)
        }

        Commands::DumpPage { file, page } => {
            cli::dump_page::execute(&cli::dump_page::DumpPageOptions { file, page }, &mut writer)
        }

        Commands::Validate { file, json } => {
            cli::validate::execute(&cli::validate::ValidateOptions { file, json }, &mut writer)
        }

        Commands::Export { file, table } => cli::export::execute(&cli::export::ExportOptions { file, table }, &mut writer),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
