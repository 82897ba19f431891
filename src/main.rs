//! `indexdb <database_name>` - interactive student database shell.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use indexdb::{Database, Shell};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <database_filename>", args[0]);
        return ExitCode::FAILURE;
    }

    let result = Database::open(&args[1]).and_then(|db| {
        let stdin = io::stdin();
        Shell::new(stdin.lock(), BufWriter::new(io::stdout())).run(db)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error accessing the database: {}", err);
            ExitCode::FAILURE
        }
    }
}
