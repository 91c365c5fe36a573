//! tally CLI binary.
//!
//! Runs pipeline files over CSV input and counts column values.

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use commands::Format;
use std::path::PathBuf;
use std::process;
use tally::Preset;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "tally: categorical re-coding and frequency summaries", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline stages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline file over a CSV file
    Summarize {
        /// Input CSV file
        input: PathBuf,

        /// Pipeline file (TOML)
        #[arg(long)]
        config: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Count the values of one column
    Count {
        /// Input CSV file
        input: PathBuf,

        /// Column to count
        #[arg(long)]
        column: String,

        /// Lump values with fewer records into Other
        #[arg(long, conflicts_with = "top")]
        min_count: Option<u64>,

        /// Keep only the most frequent values, lump the rest into Other
        #[arg(long)]
        top: Option<usize>,

        /// Re-code with a built-in preset first (currency, job-title)
        #[arg(long)]
        preset: Option<Preset>,
    },

    /// List built-in presets and their labels
    Presets,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Summarize {
            input,
            config,
            format,
            output,
        } => {
            commands::summarize(&input, &config, format, output.as_ref())?;
        }
        Commands::Count {
            input,
            column,
            min_count,
            top,
            preset,
        } => {
            commands::count(&input, &column, min_count, top, preset)?;
        }
        Commands::Presets => commands::list_presets(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summarize() {
        let cli = Cli::try_parse_from([
            "tally",
            "-v",
            "summarize",
            "survey.csv",
            "--config",
            "pipeline.toml",
            "--format",
            "markdown",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Summarize { format, output, .. } => {
                assert_eq!(format, Format::Markdown);
                assert!(output.is_none());
            }
            _ => panic!("expected summarize"),
        }
    }

    #[test]
    fn test_parse_count_with_preset() {
        let cli = Cli::try_parse_from([
            "tally",
            "count",
            "survey.csv",
            "--column",
            "currency",
            "--top",
            "5",
            "--preset",
            "currency",
        ])
        .unwrap();

        match cli.command {
            Commands::Count { top, preset, .. } => {
                assert_eq!(top, Some(5));
                assert_eq!(preset, Some(Preset::Currency));
            }
            _ => panic!("expected count"),
        }
    }

    #[test]
    fn test_min_count_conflicts_with_top() {
        let result = Cli::try_parse_from([
            "tally",
            "count",
            "survey.csv",
            "--column",
            "c",
            "--min-count",
            "3",
            "--top",
            "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
