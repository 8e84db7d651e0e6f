mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "texel")]
#[command(about = "Lex, parse and check LaTeX sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a file
    Tokens {
        /// Path to the .tex file, or `-` for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Emit JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },
    /// Print the syntax tree of a file
    Tree {
        /// Path to the .tex file, or `-` for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Emit a nested JSON tree instead of the debug dump
        #[arg(long)]
        json: bool,
    },
    /// Report syntax errors; exits non-zero if there are any
    Check {
        /// Path to the .tex file, or `-` for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Emit JSON instead of one `line:col: message` per error
        #[arg(long)]
        json: bool,
    },
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Tokens { path, json } => {
            let source = read_source(path)?;
            let tokens = render::tokens(&source);
            if *json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                for token in &tokens {
                    println!("{token}");
                }
            }
        }
        Commands::Tree { path, json } => {
            let source = read_source(path)?;
            let result = texel_syntax::parse(&source);
            if *json {
                let tree = render::tree(&result.syntax());
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print!("{:#?}", result.syntax());
            }
        }
        Commands::Check { path, json } => {
            let source = read_source(path)?;
            let result = texel_syntax::parse(&source);
            let diagnostics = render::diagnostics(&source, &result.errors);
            if *json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            } else {
                for diagnostic in &diagnostics {
                    println!("{}:{diagnostic}", path.display());
                }
            }
            if !diagnostics.is_empty() {
                anyhow::bail!(
                    "{} syntax error(s) in {}",
                    diagnostics.len(),
                    path.display()
                );
            }
            log::info!("{} is well-formed", path.display());
        }
    }
    Ok(())
}
