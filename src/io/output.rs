use crate::cli::OutputFormat;
use crate::core::CaseSplit;
use crate::pipeline::AnalysisReport;
use crate::reconcile::{AgreementLevel, FinalVerdict};
use colored::*;
use std::io::Write;

pub trait OutputWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        self.write_header(&report.verdict)?;
        self.write_stages(report)?;
        self.write_matches(report)?;
        self.write_notes(&report.verdict)?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, verdict: &FinalVerdict) -> anyhow::Result<()> {
        writeln!(self.writer, "# Growthmap Report")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(self.writer, "| Time | {} |", verdict.time)?;
        writeln!(self.writer, "| Space | {} |", verdict.space)?;
        writeln!(self.writer, "| Confidence | {:.0}% |", verdict.confidence * 100.0)?;
        writeln!(self.writer, "| Agreement | {} |", verdict.agreement)?;
        if let Some(cases) = verdict.cases {
            writeln!(self.writer, "| Cases | {} |", case_line(cases))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_stages(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let diagnostics = &report.diagnostics;
        writeln!(self.writer, "## Stages")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "- Structure: {} ({} functions, {} loops, depth {})",
            diagnostics.structural.tree_class,
            diagnostics.tree.functions,
            diagnostics.tree.loops,
            diagnostics.tree.max_loop_depth
        )?;
        match diagnostics.regression.as_ref().and_then(|r| r.best.as_ref()) {
            Some(best) => writeln!(
                self.writer,
                "- Measured: {} (R² {:.3}, {} samples)",
                best.class,
                best.r_squared,
                diagnostics.samples.len()
            )?,
            None => writeln!(self.writer, "- Measured: none")?,
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_matches(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        if report.diagnostics.matches.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Recognized Algorithms")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Algorithm | Time | Confidence |")?;
        writeln!(self.writer, "|-----------|------|------------|")?;
        for m in &report.diagnostics.matches {
            writeln!(
                self.writer,
                "| {} | {} | {:.0}% |",
                m.name,
                m.time,
                m.confidence * 100.0
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_notes(&mut self, verdict: &FinalVerdict) -> anyhow::Result<()> {
        if !verdict.warnings.is_empty() {
            writeln!(self.writer, "## Warnings")?;
            writeln!(self.writer)?;
            for warning in &verdict.warnings {
                writeln!(self.writer, "- {warning}")?;
            }
            writeln!(self.writer)?;
        }
        if !verdict.recommendations.is_empty() {
            writeln!(self.writer, "## Recommendations")?;
            writeln!(self.writer)?;
            for recommendation in &verdict.recommendations {
                writeln!(self.writer, "- {recommendation}")?;
            }
        }
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        self.print_header()?;
        self.print_verdict(&report.verdict)?;
        self.print_evidence(report)?;
        self.print_notes(&report.verdict)?;
        Ok(())
    }
}

impl<W: Write> TerminalWriter<W> {
    fn print_header(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Growthmap Report".bold().blue())?;
        writeln!(self.writer, "{}", "================".blue())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_verdict(&mut self, verdict: &FinalVerdict) -> anyhow::Result<()> {
        writeln!(self.writer, "  Time:       {}", verdict.time.to_string().bold())?;
        writeln!(self.writer, "  Space:      {}", verdict.space)?;
        writeln!(
            self.writer,
            "  Confidence: {}",
            colored_confidence(verdict.confidence)
        )?;
        writeln!(
            self.writer,
            "  Agreement:  {}",
            colored_agreement(verdict.agreement)
        )?;
        if let Some(cases) = verdict.cases {
            writeln!(self.writer, "  Cases:      {}", case_line(cases))?;
        }
        writeln!(
            self.writer,
            "  Reliability: {:.2}",
            verdict.validation.reliability
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_evidence(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let diagnostics = &report.diagnostics;
        writeln!(self.writer, "{}", "Evidence:".bold())?;
        writeln!(
            self.writer,
            "  Structure: {} ({} loops, max depth {})",
            diagnostics.structural.tree_class, diagnostics.tree.loops, diagnostics.tree.max_loop_depth
        )?;
        for m in &diagnostics.matches {
            writeln!(
                self.writer,
                "  Pattern:   {} {} ({:.0}%)",
                m.name.yellow(),
                m.time,
                m.confidence * 100.0
            )?;
        }
        match diagnostics.regression.as_ref().and_then(|r| r.best.as_ref()) {
            Some(best) => writeln!(
                self.writer,
                "  Measured:  {} (R² {:.3} over {} samples)",
                best.class,
                best.r_squared,
                diagnostics.samples.len()
            )?,
            None => writeln!(self.writer, "  Measured:  {}", "none".dimmed())?,
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn print_notes(&mut self, verdict: &FinalVerdict) -> anyhow::Result<()> {
        for warning in &verdict.warnings {
            writeln!(self.writer, "  {} {}", "warning:".yellow().bold(), warning)?;
        }
        for recommendation in &verdict.recommendations {
            writeln!(self.writer, "  {} {}", "hint:".cyan(), recommendation)?;
        }
        Ok(())
    }
}

fn case_line(cases: CaseSplit) -> String {
    format!(
        "best {}, average {}, worst {}",
        cases.best, cases.average, cases.worst
    )
}

fn colored_confidence(confidence: f64) -> ColoredString {
    let text = format!("{:.0}%", confidence * 100.0);
    if confidence >= 0.8 {
        text.green()
    } else if confidence >= 0.5 {
        text.yellow()
    } else {
        text.red()
    }
}

fn colored_agreement(level: AgreementLevel) -> ColoredString {
    let text = level.to_string();
    match level {
        AgreementLevel::High => text.green(),
        AgreementLevel::Medium => text.normal(),
        AgreementLevel::Low => text.yellow(),
        AgreementLevel::Conflict => text.red().bold(),
    }
}

pub fn create_writer(format: OutputFormat, sink: Box<dyn Write>) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink)),
    }
}
