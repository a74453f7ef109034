//! CLI interface for the resume matcher

use crate::matching::Strategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Rank resumes against a job description")]
#[command(
    long_about = "Score structured resumes against a job description using semantic, lexical, \
                  supervised, reranking and generative strategies, or compare strategies against \
                  each other"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank resumes against one job with a single strategy
    Match {
        /// JSON file holding an array of resumes
        #[arg(short, long)]
        resumes: PathBuf,

        /// JSON file holding one job
        #[arg(short, long)]
        job: PathBuf,

        /// Matching strategy
        #[arg(short, long, value_enum, default_value_t = Strategy::Lexical)]
        strategy: Strategy,

        /// Number of top candidates to return
        #[arg(short = 'n', long, default_value_t = 5)]
        top_n: usize,

        /// Use the batch-optimized scoring path
        #[arg(long)]
        optimized: bool,

        /// Emit JSON instead of the console table
        #[arg(long)]
        json: bool,
    },

    /// Run several strategies over the same inputs and report agreement
    Compare {
        /// JSON file holding an array of resumes
        #[arg(short, long)]
        resumes: PathBuf,

        /// JSON file holding one job
        #[arg(short, long)]
        job: PathBuf,

        /// Strategies to compare (two or more)
        #[arg(short, long, value_enum, num_args = 1.., default_values_t = [Strategy::Semantic, Strategy::Lexical])]
        strategies: Vec<Strategy>,

        /// Number of top candidates to return
        #[arg(short = 'n', long, default_value_t = 5)]
        top_n: usize,

        /// Emit JSON instead of the console table
        #[arg(long)]
        json: bool,
    },
}
