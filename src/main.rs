use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use ecma_interpreter as ecma;

use ecma::error::JsError;
use ecma::interpreter::Interpreter;
use ecma::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "ECMAScript parser and interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a source file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses a source file and prints its syntax tree as JSON
    Parse { filename: Option<PathBuf> },

    /// Parses a source file and prints it back minified
    Print { filename: Option<PathBuf> },

    /// Runs a source file and prints the value of its last statement
    Run { filename: Option<PathBuf> },
}

/// Maps the file read-only and decodes it as UTF-8.
fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let length = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero-length files cannot be mapped.
    if length == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read-only and dropped before this function returns.
    let map = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {:?}", filename))?;

    let source = std::str::from_utf8(&map)
        .map_err(JsError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("ecma_interpreter::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Report an engine error and exit with the matching status.
fn fail(error: &JsError) -> ! {
    debug!("Failure: {:?}", error);
    eprintln!("{}", error);

    match error {
        JsError::Lex { .. } | JsError::Syntax { .. } => std::process::exit(65),
        _ => std::process::exit(70),
    }
}

fn no_input(command: &str) {
    info!("No filepath provided for {}", command);
    println!("No input filepath was provided. Exiting...");
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            let Some(filename) = filename else {
                no_input("Tokenize");
                return Ok(());
            };

            info!("Running Tokenize subcommand");
            let source = read_file(&filename)?;

            for token in Scanner::new(&source) {
                match token {
                    Ok(token) => println!("{}", token),
                    Err(e) => fail(&e),
                }
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            let Some(filename) = filename else {
                no_input("Parse");
                return Ok(());
            };

            info!("Running Parse subcommand");
            let source = read_file(&filename)?;
            let name = filename.display().to_string();

            match ecma::parse(&source, Some(&name)) {
                Ok(program) => {
                    let json = serde_json::to_string_pretty(&program).context("Failed to serialize syntax tree")?;
                    println!("{}", json);
                }
                Err(e) => fail(&e),
            }

            info!("Parse subcommand completed");
        }

        Commands::Print { filename } => {
            let Some(filename) = filename else {
                no_input("Print");
                return Ok(());
            };

            info!("Running Print subcommand");
            let source = read_file(&filename)?;
            let name = filename.display().to_string();

            match ecma::parse(&source, Some(&name)) {
                Ok(program) => println!("{}", ecma::printer::print(&program)),
                Err(e) => fail(&e),
            }
        }

        Commands::Run { filename } => {
            let Some(filename) = filename else {
                no_input("Run");
                return Ok(());
            };

            info!("Running Run subcommand");
            let source = read_file(&filename)?;
            let name = filename.display().to_string();

            let program = match ecma::parse(&source, Some(&name)) {
                Ok(program) => program,
                Err(e) => fail(&e),
            };

            info!("Parsed {} statements", program.body.len());

            let mut interpreter = Interpreter::new();

            match interpreter.run_program(&program) {
                Ok(value) => {
                    let rendered = interpreter.to_string(&value).unwrap_or_else(|_| value.to_string());
                    println!("{}", rendered);
                    info!("Program executed successfully");
                }
                Err(e) => fail(&e),
            }
        }
    }

    Ok(())
}
