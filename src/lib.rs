//! Resume matcher library
//!
//! Candidate-to-job relevance ranking: five interchangeable scoring
//! strategies over structured Resume/Job values, with score fusion,
//! graceful degradation and a cross-strategy comparison harness.

pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod output;
pub mod text;

pub use config::Config;
pub use error::{MatcherError, Result};
pub use matching::{AnyMatcher, Matcher, MatcherComparison, Strategy};
pub use models::{Job, MatchResult, Resume};
