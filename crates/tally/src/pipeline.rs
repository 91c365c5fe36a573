//! Declarative pipelines.
//!
//! A [`PipelineConfig`] describes one summary: which column to re-code and
//! how, whether to lump rare labels, and how to group the result. A
//! [`Pipeline`] runs it over a [`Table`] in fixed stages:
//! screen, recode, lump, count, group.

use crate::error::{PipelineError, Result};
use crate::presets::Preset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_data::{AnomalyPolicy, CsvOptions, Diagnostics, Table};
use tally_output::{FrequencySummary, Render, Report, ReportBuilder};
use tally_recode::{
    CategoryMap, FrequencyTable, GroupBy, GroupedSummary, LumpRule, OTHER, OrdinalScale,
    Partition, Rule, column_frequencies, lump_column_into,
};

/// A numeric column checked before re-coding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenConfig {
    /// Column name.
    pub column: String,

    /// Flag negative values too.
    #[serde(default)]
    pub non_negative: bool,
}

/// Settings for one pipeline run, usually read from TOML.
///
/// ```toml
/// title = "Salary currency by industry"
/// source = "currency"
/// preset = "currency"
/// group_by = ["industry", "currency"]
/// within = ["industry"]
/// policy = "drop"
/// lump = { min_count = 10 }
///
/// [[screen]]
/// column = "salary"
/// non_negative = true
///
/// [[rules]]
/// pattern = { any_of = ["usd", "dollars"] }
/// label = "USD"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Report title; defaults to the target column name.
    #[serde(default)]
    pub title: Option<String>,

    /// Column holding the raw answers.
    pub source: String,

    /// Column for the canonical labels; defaults to `source` (in place).
    #[serde(default)]
    pub target: Option<String>,

    /// Built-in rules tried after `rules`.
    #[serde(default)]
    pub preset: Option<Preset>,

    /// Custom rules, tried first.
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Label for unmatched and lumped values.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Rare-label lumping applied to the target column.
    #[serde(default)]
    pub lump: Option<LumpRule>,

    /// Grouping keys for the grouped summary; none means no grouped summary.
    #[serde(default)]
    pub group_by: Vec<String>,

    /// Keys whose combinations proportions are normalized within.
    #[serde(default)]
    pub within: Vec<String>,

    /// Count column to sum instead of counting rows.
    #[serde(default)]
    pub weight: Option<String>,

    /// Level order for ordinal targets, lowest first. Orders the frequency
    /// table and the last grouping key, and adds cumulative proportions.
    #[serde(default)]
    pub levels: Option<OrdinalScale>,

    /// Numeric columns screened before re-coding.
    #[serde(default)]
    pub screen: Vec<ScreenConfig>,

    /// What to do with rows that fail a screen.
    #[serde(default)]
    pub policy: AnomalyPolicy,

    /// How to read the input file.
    #[serde(default)]
    pub csv: CsvOptions,
}

fn default_fallback() -> String {
    OTHER.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: None,
            source: String::new(),
            target: None,
            preset: None,
            rules: Vec::new(),
            fallback: default_fallback(),
            lump: None,
            group_by: Vec::new(),
            within: Vec::new(),
            weight: None,
            levels: None,
            screen: Vec::new(),
            policy: AnomalyPolicy::default(),
            csv: CsvOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML pipeline file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Column the canonical labels end up in.
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.source)
    }

    /// Report title.
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.target().to_string())
    }

    /// Check settings that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(PipelineError::Invalid("source column is empty".into()));
        }
        if self.fallback.trim().is_empty() {
            return Err(PipelineError::Invalid("fallback label is empty".into()));
        }
        for key in &self.within {
            if !self.group_by.contains(key) {
                return Err(PipelineError::Invalid(format!(
                    "'{key}' is in within but not in group_by"
                )));
            }
        }
        if let Some(rule) = &self.lump {
            rule.validate()?;
        }
        Ok(())
    }

    /// Custom rules followed by the preset's rules.
    pub fn all_rules(&self) -> Vec<Rule> {
        let mut rules = self.rules.clone();
        if let Some(preset) = self.preset {
            rules.extend(preset.rule_set().rules());
        }
        rules
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Report title.
    pub title: String,

    /// Screened table with the re-coded (and lumped) target column.
    pub table: Table,

    /// Label counts of the target column.
    pub frequency: FrequencyTable,

    /// Grouped summary, when grouping keys were given.
    pub grouped: Option<GroupedSummary>,

    /// Row issues found along the way.
    pub diagnostics: Diagnostics,

    ordinal: bool,
}

impl PipelineOutput {
    /// Frequency table with its title.
    pub fn frequency_summary(&self) -> FrequencySummary {
        let summary = FrequencySummary::new(self.title.clone(), self.frequency.clone());
        if self.ordinal {
            summary.with_cumulative()
        } else {
            summary
        }
    }

    /// Report with `frequency`, `grouped` and `diagnostics` sections.
    pub fn report(&self, config: &PipelineConfig, source: Option<&str>) -> Result<Report> {
        let mut builder = ReportBuilder::new()
            .title(self.title.clone())
            .section("config", config)?
            .section("frequency", &self.frequency)?;
        if let Some(grouped) = &self.grouped {
            builder = builder.section("grouped", grouped)?;
        }
        builder = builder.section("diagnostics", &self.diagnostics)?;
        if let Some(source) = source {
            builder = builder.source(source);
        }
        Ok(builder.build()?)
    }
}

impl Render for PipelineOutput {
    fn to_ascii_table(&self) -> String {
        let mut output = self.frequency_summary().to_ascii_table();
        if let Some(grouped) = &self.grouped {
            output.push_str(&grouped.to_ascii_table());
        }
        output.push_str(&self.diagnostics.to_ascii_table());
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = self.frequency_summary().to_markdown();
        if let Some(grouped) = &self.grouped {
            output.push('\n');
            output.push_str(&grouped.to_markdown());
        }
        output.push('\n');
        output.push_str(&self.diagnostics.to_markdown());
        output
    }
}

/// A validated pipeline with its rules compiled.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    map: Option<CategoryMap>,
}

impl Pipeline {
    /// Validate the config and compile its rules.
    ///
    /// With no rules and no preset the target column is counted as is.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.all_rules();
        let map = if rules.is_empty() {
            None
        } else {
            Some(CategoryMap::with_fallback(rules, config.fallback.clone())?)
        };
        Ok(Self { config, map })
    }

    /// Read, validate and compile a TOML pipeline file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(PipelineConfig::from_path(path)?)
    }

    /// Settings.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compiled rules, if any.
    pub const fn category_map(&self) -> Option<&CategoryMap> {
        self.map.as_ref()
    }

    /// Read the input file with the pipeline's CSV options.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Table> {
        Ok(Table::from_path_with(path, &self.config.csv)?)
    }

    /// Run every stage over `input`.
    pub fn run(&self, input: &Table) -> Result<PipelineOutput> {
        let config = &self.config;
        let source = config.source.as_str();
        let target = config.target();
        let mut diagnostics = Diagnostics::new();

        let mut table = input.clone();
        for screen in &config.screen {
            let (screened, issues) =
                table.screen_numeric(&screen.column, screen.non_negative, config.policy)?;
            tracing::debug!(
                column = %screen.column,
                issues = issues.len(),
                rows = screened.len(),
                "screened numeric column"
            );
            table = screened;
            diagnostics.extend(issues);
        }

        let (screened, issues) = table.screen_present(source, config.policy)?;
        table = screened;
        diagnostics.extend(issues);

        match &self.map {
            Some(map) => {
                let (recoded, issues) = map.recode_column(&table, source, target)?;
                table = recoded;
                diagnostics.extend(issues);
            }
            None if target != source => {
                let values = table
                    .column_values(source)?
                    .map(|v| v.map(str::to_string))
                    .collect();
                table = table.with_column(target, values)?;
            }
            None => {}
        }

        if let Some(rule) = config.lump {
            table = lump_column_into(&table, target, rule, &config.fallback)?;
        }

        let (mut frequency, issues) = column_frequencies(&table, target, config.weight.as_deref())?;
        diagnostics.extend(issues);
        if let Some(levels) = &config.levels {
            frequency = frequency.with_levels(levels);
        }

        let grouped = if config.group_by.is_empty() {
            None
        } else {
            let partition = if config.within.is_empty() {
                Partition::Overall
            } else {
                Partition::within(config.within.iter().cloned())
            };
            let mut group = GroupBy::new(config.group_by.iter().cloned()).partition(partition);
            if let Some(weight) = &config.weight {
                group = group.weighted(weight.clone());
            }
            if let Some(levels) = &config.levels {
                group = group.ordinal(levels.clone());
            }
            let (summary, issues) = group.run(&table)?;
            diagnostics.extend(issues);
            Some(summary)
        };

        tracing::info!(
            rows = table.len(),
            categories = frequency.len(),
            groups = grouped.as_ref().map_or(0, GroupedSummary::len),
            issues = diagnostics.len(),
            "pipeline finished"
        );

        Ok(PipelineOutput {
            title: config.title(),
            table,
            frequency,
            grouped,
            diagnostics,
            ordinal: config.levels.is_some(),
        })
    }
}
