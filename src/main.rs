//! docshelf - a markdown document shelf with split blob/metadata storage
//!
//! This is the main entry point for the docshelf command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use docshelf::shelf::{Browser, ConsoleNotifier, Shelf, ShelfConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut path = PathBuf::from(".docshelf");
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--dir" => {
                i += 1;
                if i < args.len() {
                    path = PathBuf::from(&args[i]);
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("docshelf v0.1.0");
                return ExitCode::SUCCESS;
            }
            arg => {
                // Treat as shelf path if no flag.
                if !arg.starts_with('-') {
                    path = PathBuf::from(arg);
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    init_tracing(verbose);

    // Open shelf.
    let config = ShelfConfig::new(&path)
        .create_if_missing(true)
        .verbose(verbose);

    let shelf = match Shelf::open_with_config(config, Arc::new(ConsoleNotifier)) {
        Ok(shelf) => shelf,
        Err(e) => {
            eprintln!("Error opening shelf: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut browser = Browser::new(shelf);
    match browser.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!("docshelf - a markdown document shelf with split blob/metadata storage");
    println!();
    println!("Usage: docshelf [OPTIONS] [SHELF]");
    println!();
    println!("Options:");
    println!("  -d, --dir PATH         Path to shelf directory (default: .docshelf)");
    println!("  -v, --verbose          Enable verbose output");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  docshelf                       Browse the default shelf");
    println!("  docshelf mynotes               Browse the 'mynotes' shelf");
    println!("  RUST_LOG=debug docshelf -v     Browse with debug logging");
}
