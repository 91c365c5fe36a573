//! Subcommand implementations.

use clap::ValueEnum;
use std::error::Error;
use std::path::{Path, PathBuf};
use tally::data::Table;
use tally::output::{ExportFormat, Exporter, FrequencySummary, Render};
use tally::recode::{LumpRule, column_frequencies, lump};
use tally::{Pipeline, PipelineOutput, Preset};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Output format for `summarize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Plain-text tables
    Text,
    /// Markdown tables
    Markdown,
    /// Grouped summary as CSV (frequency table when ungrouped)
    Csv,
    /// Full report as JSON
    Json,
}

pub(crate) fn summarize(
    input: &Path,
    config: &Path,
    format: Format,
    output: Option<&PathBuf>,
) -> CliResult<()> {
    let pipeline = Pipeline::from_path(config)?;
    tracing::debug!(config = %config.display(), "loaded pipeline");

    let table = pipeline.load(input)?;
    tracing::info!(rows = table.len(), columns = table.width(), "loaded input");

    let result = pipeline.run(&table)?;

    match (format, output) {
        (Format::Json, Some(path)) => {
            let source = input.display().to_string();
            result
                .report(pipeline.config(), Some(source.as_str()))?
                .write_json(path)?;
            tracing::info!(path = %path.display(), "wrote report");
        }
        (_, Some(path)) => {
            std::fs::write(path, render(&pipeline, &result, format, input)?)?;
            tracing::info!(path = %path.display(), "wrote summary");
        }
        (_, None) => print!("{}", render(&pipeline, &result, format, input)?),
    }
    Ok(())
}

pub(crate) fn render(
    pipeline: &Pipeline,
    result: &PipelineOutput,
    format: Format,
    input: &Path,
) -> CliResult<String> {
    let content = match format {
        Format::Text => result.to_ascii_table(),
        Format::Markdown => result.to_markdown(),
        Format::Csv => match &result.grouped {
            Some(grouped) => grouped.export_to_string(ExportFormat::Csv)?,
            None => result.frequency.export_to_string(ExportFormat::Csv)?,
        },
        Format::Json => {
            let source = input.display().to_string();
            result.report(pipeline.config(), Some(source.as_str()))?.to_json()?
        }
    };
    Ok(content)
}

pub(crate) fn count(
    input: &Path,
    column: &str,
    min_count: Option<u64>,
    top: Option<usize>,
    preset: Option<Preset>,
) -> CliResult<()> {
    let table = Table::from_path(input)?;

    let mut freq = match preset {
        Some(preset) => {
            let map = preset.rule_set().category_map()?;
            map.frequencies(table.column_values(column)?.flatten())
        }
        None => column_frequencies(&table, column, None)?.0,
    };

    let rule = match (min_count, top) {
        (Some(n), _) => Some(LumpRule::MinCount(n)),
        (None, Some(n)) => Some(LumpRule::TopN(n)),
        (None, None) => None,
    };
    if let Some(rule) = rule {
        freq = lump(&freq, rule);
    }

    let missing = table.column_values(column)?.filter(Option::is_none).count();
    print!("{}", FrequencySummary::new(column, freq).to_ascii_table());
    if missing > 0 {
        println!("Missing: {missing}");
    }
    Ok(())
}

pub(crate) fn list_presets() {
    println!("Presets:");
    println!("========\n");

    for preset in Preset::all() {
        println!("{:<10} {}", preset.name(), preset.description());
        println!("{:<10} {}\n", "", preset.rule_set().labels().join(", "));
    }
}
