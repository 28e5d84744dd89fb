//! CQL command-line interface

use caduceus_cql::elm::AstToElmConverter;
use caduceus_cql::eval::{CqlEngine, EvaluationContext, EvaluationOptions};
use caduceus_cql::types::CqlDateTime;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// CQL command-line tool
#[derive(Parser)]
#[command(name = "cql")]
#[command(author, version, about = "Clinical Quality Language (CQL) tools", long_about = None)]
struct Cli {
    /// Path to a caduceus.toml config file (defaults to ./caduceus.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, translate, and evaluate a CQL library's public definitions
    Run {
        /// CQL file to evaluate
        file: PathBuf,
    },
    /// Parse and type-check CQL files without evaluating them
    Validate {
        /// CQL files to validate
        files: Vec<PathBuf>,
    },
    /// Start an interactive expression-evaluation REPL
    Repl,
}

/// Retriever/terminology endpoint configuration (`caduceus.toml`)
#[derive(Debug, Default, Deserialize)]
struct CaduceusConfig {
    #[serde(default)]
    retriever_endpoint: Option<String>,
    #[serde(default)]
    terminology_endpoint: Option<String>,
}

fn load_config(path: Option<&Path>) -> CaduceusConfig {
    let path = path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("caduceus.toml"));
    match fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("{}: {e}", "warning: malformed caduceus.toml".yellow());
            CaduceusConfig::default()
        }),
        Err(_) => CaduceusConfig::default(),
    }
}

/// The evaluation timestamp every CLI invocation pins runs to. Fixed rather
/// than wall-clock so `cql run`/`cql validate` output is reproducible.
fn fixed_now() -> CqlDateTime {
    CqlDateTime::new(2024, 1, 1, 0, 0, 0, 0, None)
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    if config.retriever_endpoint.is_some() || config.terminology_endpoint.is_some() {
        eprintln!("{}", "using caduceus.toml endpoint configuration".dimmed());
    }

    let exit_code = match cli.command {
        Commands::Run { file } => cmd_run(&file),
        Commands::Validate { files } => cmd_validate(&files),
        Commands::Repl => cmd_repl(),
    };

    std::process::exit(exit_code);
}

fn cmd_run(file: &Path) -> i32 {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {}: {e}", "error:".red().bold(), file.display());
            return 1;
        }
    };

    let ast_library = match caduceus_cql::parse(&source) {
        Ok(lib) => lib,
        Err(e) => {
            eprintln!("{} {}", "parse error:".red().bold(), e.to_diagnostic());
            return 1;
        }
    };

    let mut converter = AstToElmConverter::new();
    let elm_library = converter.convert_library(&ast_library);

    let engine = CqlEngine::new();
    let options = EvaluationOptions { evaluation_timestamp: fixed_now(), return_private_defs: false };
    let mut ctx = EvaluationContext::from_options(options);

    match engine.evaluate_library(&elm_library, &mut ctx) {
        Ok(results) => {
            for (name, value) in &results {
                println!("{}: {value}", name.cyan());
            }
            0
        }
        Err(e) => {
            let diag = caduceus_cql::CqlError::from(e).to_diagnostic();
            eprintln!("{} {diag}", "evaluation error:".red().bold());
            1
        }
    }
}

fn cmd_validate(files: &[PathBuf]) -> i32 {
    let mut failures = 0;
    for file in files {
        let source = match fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{} {}: {e}", "error:".red().bold(), file.display());
                failures += 1;
                continue;
            }
        };

        match caduceus_cql::parse(&source) {
            Ok(_) => println!("{} {}", "ok".green(), file.display()),
            Err(e) => {
                println!("{} {}: {}", "failed".red(), file.display(), e.to_diagnostic());
                failures += 1;
            }
        }
    }

    if failures > 0 { 1 } else { 0 }
}

fn cmd_repl() -> i32 {
    println!("caduceus-cql repl. Enter a CQL expression, or :quit to exit.");
    let engine = CqlEngine::new();
    let options = EvaluationOptions { evaluation_timestamp: fixed_now(), return_private_defs: false };
    let mut ctx = EvaluationContext::from_options(options);
    let converter = AstToElmConverter::new();

    let mut line = String::new();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return 1;
        }
        line.clear();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == ":quit" || input == ":q" {
            break;
        }

        match caduceus_cql::parser::parse_expression(input) {
            Ok(spanned) => {
                let elm_expr = converter.convert_expression(&spanned);
                match engine.evaluate(&elm_expr, &mut ctx) {
                    Ok(value) => println!("{value}"),
                    Err(e) => {
                        let diag = caduceus_cql::CqlError::from(e).to_diagnostic();
                        eprintln!("{} {diag}", "error:".red().bold());
                    }
                }
            }
            Err(e) => eprintln!("{} {}", "parse error:".red().bold(), e.to_diagnostic()),
        }
    }

    0
}
