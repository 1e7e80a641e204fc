use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "reco")]
#[command(author, version, about = "Recommendation letter generation and rubric scoring", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Runtime config file (YAML or JSON); defaults apply when omitted
    #[arg(short, long, global = true, env = "RECO_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the paragraph plan for a target length
    Plan {
        /// Target body length in characters (default 1000)
        target_length: Option<u32>,
    },

    /// List the available tones
    Tones,

    /// List the LLM providers compiled into this build
    Providers,

    /// Print the generation prompt for a request without calling a provider
    Prompt {
        /// Request file (.yaml, .yml or .json)
        request: PathBuf,

        /// Date printed in the letter (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Generate a letter from a request
    Generate {
        /// Request file (.yaml, .yml or .json)
        request: PathBuf,

        /// Date printed in the letter (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Score the generated letter as well
        #[arg(long)]
        evaluate: bool,
    },

    /// Rework an edited letter according to improvement notes
    Refine {
        /// Current letter text
        letter: PathBuf,

        /// Improvements to apply
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Tone name (English or Korean label)
        #[arg(short, long, default_value = "Formal")]
        tone: String,
    },

    /// Extract a writing-style profile from a sample
    AnalyzeStyle {
        /// Sample of the recommender's own writing
        sample: PathBuf,
    },

    /// Score one or more letters against the rubric
    Evaluate {
        /// Letter files
        #[arg(required = true)]
        letters: Vec<PathBuf>,
    },

    /// Score a saved judge response without calling a provider
    Score {
        /// Judge response file
        response: PathBuf,
    },
}
