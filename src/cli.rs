use crate::complexity::PatternPrecedence;
use crate::config::AnalysisOptions;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "growthmap")]
#[command(about = "Asymptotic complexity estimator for source snippets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the time and space growth of a source file
    Analyze {
        /// File to analyze, or `-` for stdin
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: AnalysisOverrides,
    },

    /// Write a default .growthmap.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

/// Command-line settings layered over the loaded config file.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct AnalysisOverrides {
    /// Skip empirical sampling and rely on structure alone
    #[arg(long = "no-sampling")]
    pub no_sampling: bool,

    /// Input sizes to sample at, ascending (e.g. 10,100,1000)
    #[arg(long, value_delimiter = ',')]
    pub sizes: Option<Vec<usize>>,

    /// Fixed seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sampling wall-clock ceiling in milliseconds
    #[arg(long = "ceiling-ms")]
    pub ceiling_ms: Option<u64>,

    /// Omit best/average/worst case analysis
    #[arg(long = "no-cases")]
    pub no_cases: bool,

    /// How pattern matches weigh against the syntax tree
    /// (pattern-first, structure-first, strongest)
    #[arg(long)]
    pub precedence: Option<PatternPrecedence>,

    /// Largest accepted input in bytes
    #[arg(long = "max-bytes")]
    pub max_bytes: Option<usize>,
}

impl AnalysisOverrides {
    pub fn apply(&self, mut options: AnalysisOptions) -> AnalysisOptions {
        if self.no_sampling {
            options.enable_sampling = false;
        }
        if let Some(sizes) = &self.sizes {
            options.sample_sizes = sizes.clone();
        }
        if let Some(seed) = self.seed {
            options.seed = Some(seed);
        }
        if let Some(ceiling) = self.ceiling_ms {
            options.sampling_time_ceiling_ms = ceiling;
        }
        if self.no_cases {
            options.include_case_analysis = false;
        }
        if let Some(precedence) = self.precedence {
            options.precedence = precedence;
        }
        if let Some(max_bytes) = self.max_bytes {
            options.max_input_bytes = max_bytes;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_overrides(args: &[&str]) -> AnalysisOverrides {
        let mut argv = vec!["growthmap", "analyze", "sort.py"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Analyze { overrides, .. } => overrides,
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["growthmap", "analyze", "-"]).unwrap();
        assert_eq!(cli.verbosity, 0);
        match cli.command {
            Commands::Analyze {
                path,
                format,
                output,
                overrides,
            } => {
                assert_eq!(path, PathBuf::from("-"));
                assert_eq!(format, OutputFormat::Terminal);
                assert!(output.is_none());
                assert_eq!(overrides, AnalysisOverrides::default());
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_sizes_are_comma_separated() {
        let overrides = analyze_overrides(&["--sizes", "10,100,1000"]);
        assert_eq!(overrides.sizes, Some(vec![10, 100, 1000]));
    }

    #[test]
    fn test_precedence_parses_kebab_case() {
        let overrides = analyze_overrides(&["--precedence", "structure-first"]);
        assert_eq!(overrides.precedence, Some(PatternPrecedence::StructureFirst));
        assert!(Cli::try_parse_from([
            "growthmap",
            "analyze",
            "a.py",
            "--precedence",
            "loudest"
        ])
        .is_err());
    }

    #[test]
    fn test_overrides_layer_over_options() {
        let overrides = analyze_overrides(&["--no-sampling", "--no-cases", "--seed", "9"]);
        let options = overrides.apply(AnalysisOptions::default());
        assert!(!options.enable_sampling);
        assert!(!options.include_case_analysis);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.sample_sizes, AnalysisOptions::default().sample_sizes);
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::try_parse_from(["growthmap", "-vv", "init", "--force"]).unwrap();
        assert_eq!(cli.verbosity, 2);
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
