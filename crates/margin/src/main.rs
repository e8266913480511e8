//! Margin CLI - djot blog renderer.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "margin")]
#[command(about = "Render djot blog posts to HTML")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to margin.toml config file
    #[arg(short, long, default_value = "margin.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one djot JSON AST file and print the post record
    Render {
        /// AST file produced by the djot parser
        file: PathBuf,

        /// Publication date (defaults to the file name's date prefix)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Render every post and write the static site
    Build {
        /// Directory of AST files (defaults to config or "posts")
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Highlight a source file and print the HTML
    Highlight {
        /// Source file
        file: PathBuf,

        /// Language tag (defaults to the file extension)
        #[arg(short, long)]
        lang: Option<String>,

        /// Lines to mark, e.g. "2,4-5"
        #[arg(long)]
        lines: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Render { file, date } => {
            commands::render::run(&config, &file, date)?;
        }
        Commands::Build { input, output } => {
            commands::build::run(&config, input, output)?;
        }
        Commands::Highlight { file, lang, lines } => {
            commands::highlight::run(&config, &file, lang.as_deref(), lines.as_deref())?;
        }
    }

    Ok(())
}
