//! Password audit library
//!
//! Scores a password against five criteria, checks it against a
//! common-password blocklist and a k-anonymity breach range endpoint, and
//! produces fast digests plus bcrypt and argon2id hashes.
//!
//! # Features
//!
//! - `async` (default): Enables cancellable analysis and channel delivery
//! - `tracing`: Enables logging via tracing crate. The password is never logged.
//!
//! # Environment Variables
//!
//! - `PWD_BLOCKLIST_PATH`: Custom path to the blocklist file
//!   (default: the embedded list)
//! - `PWD_BCRYPT_COST`, `PWD_ARGON2_*`, `PWD_BREACH_*`: see [`AnalyzerConfig::from_env`]
//!
//! # Example
//!
//! ```rust,no_run
//! use pwd_audit::{init_blocklist, Analyzer, AnalyzerConfig};
//! use secrecy::SecretString;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize blocklist (call once at startup)
//! let blocklist = init_blocklist()?;
//! let analyzer = Analyzer::new(AnalyzerConfig::from_env()?, blocklist)?;
//!
//! let password = SecretString::new("MyP@ssw0rd!".into());
//! let result = analyzer.analyze(&password).await?;
//!
//! println!("Score: {}/5", result.score.value());
//! println!("Strength: {}", result.level.label());
//! println!("Breach: {:?}", result.breach);
//! # Ok(())
//! # }
//! ```

// Internal modules
mod analyzer;
mod blocklist;
mod breach;
mod config;
mod digest;
mod evaluator;
mod hasher;
mod sections;

// Public API
pub use analyzer::{AnalysisError, AnalysisResult, Analyzer, HashBundle};
pub use blocklist::{
    Blocklist, BlocklistError, get_blocklist_path, global_blocklist, init_blocklist,
    init_blocklist_from_path,
};
pub use breach::{
    BreachFailure, BreachLookup, BreachResult, BreachStatus, HttpRangeClient, RangeClient,
    UnknownReason, find_suffix,
};
pub use config::{
    AnalyzerConfig, BreachConfig, ConfigError, ConfigOverrides, CriteriaPolicy, HasherConfig,
    SymbolSet,
};
pub use digest::{FastDigests, fast_digests};
pub use evaluator::{
    Evaluation, OverrideReason, StrengthLevel, StrengthScore, Verdict, apply_overrides, evaluate,
    suggestions,
};
pub use hasher::{AdaptiveHashes, HashError, PasswordHasher};
pub use sections::{Criterion, CriterionResult, MIN_LENGTH};
