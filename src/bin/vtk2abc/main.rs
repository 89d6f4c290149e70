//! vtk2abc - convert a VTK time series (.pvd) into an Alembic archive.

use std::env;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use vtk2abc::convert::{self, ConvertConfig};

const LOG_QUIET: &str = "error";
const LOG_INFO: &str = "info";
const LOG_DEBUG: &str = "debug";
const LOG_TRACE: &str = "trace";

fn print_usage() {
    eprintln!("vtk2abc - convert VTK time series to Alembic");
    eprintln!();
    eprintln!("Usage: vtk2abc [options] <input.pvd> <output.abc>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose        Debug output");
    eprintln!("  -vv, --trace         Trace output");
    eprintln!("  -q, --quiet          Errors only");
    eprintln!("  -c, --config <file>  JSON conversion settings");
    eprintln!();
    eprintln!("RUST_LOG overrides the log level.");
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut level = LOG_INFO;
    let mut config_path: Option<&str> = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => level = LOG_DEBUG,
            "-vv" | "--trace" => level = LOG_TRACE,
            "-q" | "--quiet" => level = LOG_QUIET,
            "-c" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path.as_str()),
                None => {
                    eprintln!("Error: {} needs a file argument", arg);
                    print_usage();
                    return ExitCode::FAILURE;
                }
            },
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            _ => positional.push(arg.as_str()),
        }
    }

    if positional.len() != 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    init_logging(level);

    let config = match config_path {
        Some(path) => match ConvertConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => ConvertConfig::default(),
    };

    let (input, output) = (Path::new(positional[0]), Path::new(positional[1]));
    match convert::run(input, output, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
