//! Gridcalc - recompute a spreadsheet snapshot from the command line

mod config;

use anyhow::{Context, Result};
use gridcalc_core::Workbook;
use gridcalc_engine::engine::CellRef;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet snapshot to recompute (.grd)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate one formula against FILE and print it");
    eprintln!("  --config <FILE>           Load engine settings from a TOML file");
    eprintln!("  --no-config               Ignore the default config file");
    eprintln!("  -h, --help                Print help");
}

struct Args {
    file_path: Option<PathBuf>,
    command: Option<String>,
    config_file: Option<PathBuf>,
    no_config: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();

    let mut parsed = Args {
        file_path: None,
        command: None,
        config_file: None,
        no_config: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a formula");
                    std::process::exit(1);
                }
                parsed.command = Some(args[i].to_string());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                parsed.config_file = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => parsed.no_config = true,
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if parsed.file_path.is_none() {
                    parsed.file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    parsed
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config_file.as_deref(), args.no_config)?;

    let mut workbook = match &args.file_path {
        Some(path) => Workbook::with_file(path.clone(), config.engine)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Workbook::with_config(config.engine),
    };

    if let Some(formula) = &args.command {
        println!("{}", workbook.evaluate(formula));
        return Ok(());
    }

    if args.file_path.is_none() {
        print_usage();
        std::process::exit(1);
    }

    let display = workbook.display_map().clone();
    for (key, _) in workbook.cells_sorted() {
        let shown = display.get(&key).map(String::as_str).unwrap_or_default();
        println!("{}: {}", CellRef::from(key), shown);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
