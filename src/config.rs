//! Analyzer configuration.
//!
//! Every tunable is validated when the configuration is built, so an
//! out-of-range cost can never be discovered halfway through a request.
//!
//! # Environment Variables
//!
//! - `PWD_BCRYPT_COST`: bcrypt cost factor (default 12, range 4..=16)
//! - `PWD_ARGON2_MEMORY_KIB`: argon2 memory cost in KiB (default 19456)
//! - `PWD_ARGON2_TIME_COST`: argon2 iterations (default 2, range 1..=10)
//! - `PWD_ARGON2_PARALLELISM`: argon2 lanes (default 1, range 1..=16)
//! - `PWD_BREACH_TIMEOUT_MS`: breach lookup timeout (default 3000)
//! - `PWD_BREACH_ENDPOINT`: range endpoint base URL
//! - `PWD_BREACH_CHECK`: `false`, `0` or `off` disables the breach lookup

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const MIN_BCRYPT_COST: u32 = 4;
/// Upper bound on the bcrypt cost. Each step doubles the work.
pub const MAX_BCRYPT_COST: u32 = 16;

pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19_456;
pub const MAX_ARGON2_MEMORY_KIB: u32 = 262_144;
pub const DEFAULT_ARGON2_TIME_COST: u32 = 2;
pub const MAX_ARGON2_TIME_COST: u32 = 10;
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;
pub const MAX_ARGON2_PARALLELISM: u32 = 16;

pub const DEFAULT_BREACH_ENDPOINT: &str = "https://api.pwnedpasswords.com/range";
pub const DEFAULT_BREACH_TIMEOUT: Duration = Duration::from_secs(3);
pub const MIN_BREACH_TIMEOUT: Duration = Duration::from_millis(100);
pub const MAX_BREACH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bcrypt cost {0} outside 4..=16")]
    BcryptCostOutOfRange(u32),
    #[error("argon2 memory cost {value} KiB outside {min}..=262144")]
    Argon2MemoryOutOfRange { value: u32, min: u32 },
    #[error("argon2 time cost {0} outside 1..=10")]
    Argon2TimeCostOutOfRange(u32),
    #[error("argon2 parallelism {0} outside 1..=16")]
    Argon2ParallelismOutOfRange(u32),
    #[error("argon2 rejected parameters: {0}")]
    Argon2Params(String),
    #[error("breach timeout {0:?} outside 100ms..=30s")]
    TimeoutOutOfRange(Duration),
    #[error("breach endpoint must be an http(s) URL: {0}")]
    InvalidEndpoint(String),
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Characters that satisfy the symbol criterion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SymbolSet {
    /// The 32 ASCII punctuation characters: ``!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~``.
    /// This is a superset of `!@#$%^&*`.
    #[default]
    AsciiPunctuation,
    /// Anything that is not a letter or a digit, including spaces and non-ASCII.
    AnyNonAlphanumeric,
    /// An explicit list. An empty list means no password ever has a symbol.
    Custom(String),
}

impl SymbolSet {
    pub fn contains(&self, c: char) -> bool {
        match self {
            SymbolSet::AsciiPunctuation => c.is_ascii_punctuation(),
            SymbolSet::AnyNonAlphanumeric => !c.is_alphanumeric(),
            SymbolSet::Custom(chars) => chars.contains(c),
        }
    }
}

/// Per-criterion character policy.
///
/// Minimum length and level thresholds are fixed constants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CriteriaPolicy {
    pub symbols: SymbolSet,
    /// When set, any Unicode lowercase/uppercase letter counts, not only ASCII.
    pub unicode_case: bool,
}

/// Adaptive hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    pub bcrypt_cost: u32,
    pub argon2_memory_kib: u32,
    pub argon2_time_cost: u32,
    pub argon2_parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            argon2_memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            argon2_time_cost: DEFAULT_ARGON2_TIME_COST,
            argon2_parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }
}

impl HasherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::BcryptCostOutOfRange(self.bcrypt_cost));
        }
        if !(1..=MAX_ARGON2_PARALLELISM).contains(&self.argon2_parallelism) {
            return Err(ConfigError::Argon2ParallelismOutOfRange(
                self.argon2_parallelism,
            ));
        }
        if !(1..=MAX_ARGON2_TIME_COST).contains(&self.argon2_time_cost) {
            return Err(ConfigError::Argon2TimeCostOutOfRange(self.argon2_time_cost));
        }
        // argon2 needs at least 8 KiB per lane
        let min_memory = 8 * self.argon2_parallelism;
        if !(min_memory..=MAX_ARGON2_MEMORY_KIB).contains(&self.argon2_memory_kib) {
            return Err(ConfigError::Argon2MemoryOutOfRange {
                value: self.argon2_memory_kib,
                min: min_memory,
            });
        }
        Ok(())
    }
}

/// Breach lookup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachConfig {
    pub enabled: bool,
    /// Base URL; the 5-character prefix is appended as the last path segment.
    pub endpoint: String,
    pub timeout: Duration,
    /// Ask the endpoint to pad responses with zero-count decoy suffixes.
    pub add_padding: bool,
    pub user_agent: String,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_BREACH_ENDPOINT.to_string(),
            timeout: DEFAULT_BREACH_TIMEOUT,
            add_padding: true,
            user_agent: concat!("pwd-audit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BreachConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BREACH_TIMEOUT..=MAX_BREACH_TIMEOUT).contains(&self.timeout) {
            return Err(ConfigError::TimeoutOutOfRange(self.timeout));
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        Ok(())
    }
}

/// Complete analyzer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalyzerConfig {
    pub hasher: HasherConfig,
    pub breach: BreachConfig,
    pub criteria: CriteriaPolicy,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hasher.validate()?;
        self.breach.validate()
    }

    /// Builds a configuration from defaults overlaid with `PWD_*` variables.
    ///
    /// The result is validated before it is returned.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(cost) = env_parse::<u32>("PWD_BCRYPT_COST")? {
            config.hasher.bcrypt_cost = cost;
        }
        if let Some(memory) = env_parse::<u32>("PWD_ARGON2_MEMORY_KIB")? {
            config.hasher.argon2_memory_kib = memory;
        }
        if let Some(time_cost) = env_parse::<u32>("PWD_ARGON2_TIME_COST")? {
            config.hasher.argon2_time_cost = time_cost;
        }
        if let Some(lanes) = env_parse::<u32>("PWD_ARGON2_PARALLELISM")? {
            config.hasher.argon2_parallelism = lanes;
        }
        if let Some(ms) = env_parse::<u64>("PWD_BREACH_TIMEOUT_MS")? {
            config.breach.timeout = Duration::from_millis(ms);
        }
        if let Ok(endpoint) = std::env::var("PWD_BREACH_ENDPOINT") {
            config.breach.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Ok(flag) = std::env::var("PWD_BREACH_CHECK") {
            config.breach.enabled = match flag.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => false,
                "1" | "true" | "on" | "yes" => true,
                _ => {
                    return Err(ConfigError::InvalidEnvVar {
                        name: "PWD_BREACH_CHECK",
                        value: flag,
                    });
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with the caller's overrides applied, validated.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = self.clone();
        if let Some(cost) = overrides.bcrypt_cost {
            config.hasher.bcrypt_cost = cost;
        }
        if let Some(memory) = overrides.argon2_memory_kib {
            config.hasher.argon2_memory_kib = memory;
        }
        if let Some(time_cost) = overrides.argon2_time_cost {
            config.hasher.argon2_time_cost = time_cost;
        }
        if let Some(lanes) = overrides.argon2_parallelism {
            config.hasher.argon2_parallelism = lanes;
        }
        if let Some(timeout) = overrides.breach_timeout {
            config.breach.timeout = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Optional per-caller overrides of hash cost and breach timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub bcrypt_cost: Option<u32>,
    pub argon2_memory_kib: Option<u32>,
    pub argon2_time_cost: Option<u32>,
    pub argon2_parallelism: Option<u32>,
    pub breach_timeout: Option<Duration>,
}

fn env_parse<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar { name, value: raw }),
        Err(_) => Ok(None),
    }
}
