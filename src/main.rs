//! Resume matcher: rank structured resumes against a job description

mod cli;
mod config;
mod error;
mod matching;
mod models;
mod output;
mod text;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{MatcherError, Result};
use log::{error, info};
use matching::{AnyMatcher, Matcher, MatcherComparison, Strategy};
use models::{Job, Resume};
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config) {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Match {
            resumes,
            job,
            strategy,
            top_n,
            optimized,
            json,
        } => {
            let resumes = load_resumes(&resumes)?;
            let job = load_job(&job)?;
            info!(
                "Matching {} resumes against '{}' with the {} strategy",
                resumes.len(),
                job.id,
                strategy
            );

            let matcher = AnyMatcher::build(strategy, &config);
            let results = if optimized {
                matcher.match_many_optimized(&resumes, &job, top_n)
            } else {
                matcher.match_many(&resumes, &job, top_n)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let stats = matching::stats(&results);
                println!("{}", output::render_results(&results, stats.as_ref()));
            }
            Ok(())
        }

        Commands::Compare {
            resumes,
            job,
            strategies,
            top_n,
            json,
        } => {
            let resumes = load_resumes(&resumes)?;
            let job = load_job(&job)?;
            let strategies = dedup_strategies(strategies);
            info!(
                "Comparing {} strategies over {} resumes",
                strategies.len(),
                resumes.len()
            );

            let harness = MatcherComparison::new(&strategies, &config);
            let comparisons = harness.compare_many(&resumes, &job, top_n);
            let wins = MatcherComparison::get_best_matcher(&comparisons);
            let correlations = MatcherComparison::calculate_correlation(&comparisons);

            if json {
                println!("{}", serde_json::to_string_pretty(&comparisons)?);
            } else {
                println!(
                    "{}",
                    output::render_comparisons(&comparisons, &wins, &correlations)
                );
            }
            Ok(())
        }
    }
}

fn load_resumes(path: &Path) -> Result<Vec<Resume>> {
    let content = std::fs::read_to_string(path)?;
    let resumes: Vec<Resume> = serde_json::from_str(&content)?;
    if resumes.is_empty() {
        return Err(MatcherError::InvalidInput(format!(
            "no resumes in {}",
            path.display()
        )));
    }
    Ok(resumes)
}

fn load_job(path: &Path) -> Result<Job> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn dedup_strategies(strategies: Vec<Strategy>) -> Vec<Strategy> {
    let mut seen = Vec::new();
    for strategy in strategies {
        if !seen.contains(&strategy) {
            seen.push(strategy);
        }
    }
    seen
}
