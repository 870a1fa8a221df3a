use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::llm_client::{DRAFTING_MODEL, EVALUATION_MODEL};

/// Drafts personal injury demand letters and scores them against a rubric.
#[derive(Debug, Parser)]
#[command(name = "demand", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a demand letter from files in a directory
    Draft {
        /// Directory containing the input files
        input_dir: PathBuf,
        /// Path to save the output markdown file
        output_file: PathBuf,
        #[arg(long, default_value = DRAFTING_MODEL)]
        model: String,
        /// Skip comparable-case research even when a search model is configured
        #[arg(long)]
        no_research: bool,
    },
    /// Evaluate every letter in the demand letters folder
    Evaluate {
        /// Re-extract case facts even if a cached copy exists
        #[arg(long)]
        reprocess: bool,
        /// Model used for evaluation
        #[arg(long, default_value = EVALUATION_MODEL)]
        model: String,
        /// Write a cross-letter comparison report
        #[arg(long)]
        compare: bool,
    },
}
