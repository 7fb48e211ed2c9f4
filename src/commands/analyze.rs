use crate::cli::{AnalysisOverrides, OutputFormat};
use crate::config::{self, GrowthmapConfig};
use crate::io::{self, output};
use crate::observability::set_current_input;
use crate::pipeline::{AnalysisReport, Pipeline};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub overrides: AnalysisOverrides,
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let settings = config::load_config();
    let source = io::read_source(&config.path)?;
    let _input = set_current_input(config.path.display().to_string());

    let report = run_analysis(&source, &settings, &config.overrides)
        .with_context(|| format!("Failed to analyze {}", config.path.display()))?;

    let sink: Box<dyn Write> = match &config.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = output::create_writer(config.format, sink);
    writer.write_report(&report)?;
    Ok(())
}

/// Layer CLI overrides over the loaded settings and run the pipeline.
pub fn run_analysis(
    source: &str,
    settings: &GrowthmapConfig,
    overrides: &AnalysisOverrides,
) -> crate::errors::Result<AnalysisReport> {
    let options = overrides.apply(settings.analysis.clone());
    tracing::debug!(
        sampling = options.enable_sampling,
        sizes = ?options.sample_sizes,
        seed = ?options.seed,
        "resolved analysis options"
    );
    Pipeline::new(options)
        .with_thresholds(settings.thresholds.clone())
        .run(source)
}
