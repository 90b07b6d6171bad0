use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tree-census")]
#[command(about = "Load a street tree census CSV and report species popularity by region")]
pub struct Cli {
    /// Comma-delimited census dataset; the first line is a header.
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Answer these keywords and exit instead of prompting.
    #[arg(short = 'q', long = "query", value_name = "KEYWORD")]
    pub queries: Vec<String>,

    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Abort loading on the first row with an invalid status, health, region or number.
    #[arg(long)]
    pub strict: bool,

    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
