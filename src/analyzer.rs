//! Analysis orchestrator - the single entry point for callers.
//!
//! One call scores the password, checks the blocklist and the breach
//! endpoint, applies overrides and produces every digest. Nothing is
//! shared between calls except the read-only blocklist and configuration.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

#[cfg(feature = "async")]
use tokio::sync::mpsc;
#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::blocklist::Blocklist;
use crate::breach::{BreachLookup, BreachStatus, HttpRangeClient, RangeClient};
use crate::config::{AnalyzerConfig, ConfigError, ConfigOverrides};
use crate::digest::{FastDigests, fast_digests};
use crate::evaluator::{
    OverrideReason, StrengthLevel, StrengthScore, apply_overrides, evaluate, suggestions,
};
use crate::hasher::{AdaptiveHashes, HashError, PasswordHasher};
use crate::sections::CriterionResult;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Hashing(#[from] HashError),
    #[error("hashing worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashBundle {
    pub fast: FastDigests,
    pub adaptive: AdaptiveHashes,
}

/// Everything known about one password. Holds no copy of the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub criteria: CriterionResult,
    pub score: StrengthScore,
    /// Level implied by the score alone.
    pub computed_level: StrengthLevel,
    /// Level after blocklist and breach overrides.
    pub level: StrengthLevel,
    pub override_reason: Option<OverrideReason>,
    pub is_common: bool,
    pub breach: BreachStatus,
    pub hashes: HashBundle,
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    pub fn was_overridden(&self) -> bool {
        self.override_reason.is_some()
    }
}

pub struct Analyzer<C = HttpRangeClient> {
    config: AnalyzerConfig,
    blocklist: Arc<Blocklist>,
    breach: BreachLookup<C>,
    hasher: PasswordHasher,
}

impl Analyzer<HttpRangeClient> {
    /// Builds an analyzer that queries the configured HTTPS range endpoint.
    ///
    /// # Errors
    ///
    /// Any out-of-range parameter is rejected here, before a request runs.
    pub fn new(config: AnalyzerConfig, blocklist: Arc<Blocklist>) -> Result<Self, ConfigError> {
        let client = HttpRangeClient::new(&config.breach)?;
        Self::with_client(config, blocklist, Arc::new(client))
    }
}

impl<C: RangeClient> Analyzer<C> {
    pub fn with_client(
        config: AnalyzerConfig,
        blocklist: Arc<Blocklist>,
        client: Arc<C>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let hasher = PasswordHasher::new(&config.hasher)?;
        let breach = BreachLookup::new(client, &config.breach);
        Ok(Self {
            config,
            blocklist,
            breach,
            hasher,
        })
    }

    /// Derives an analyzer with per-caller overrides, sharing the blocklist
    /// and the transport.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config = self.config.with_overrides(overrides)?;
        let hasher = PasswordHasher::new(&config.hasher)?;
        let breach = self.breach.reconfigured(&config.breach);
        Ok(Self {
            config,
            blocklist: Arc::clone(&self.blocklist),
            breach,
            hasher,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one password.
    ///
    /// Breach lookup failures never surface here; they become
    /// [`BreachStatus::Unknown`]. The only errors come from the hashing worker.
    pub async fn analyze(&self, password: &SecretString) -> Result<AnalysisResult, AnalysisError> {
        self.run(password, self.breach.check(password)).await
    }

    /// Like [`analyze`](Self::analyze), abandoning the breach lookup on cancellation.
    #[cfg(feature = "async")]
    pub async fn analyze_cancellable(
        &self,
        password: &SecretString,
        token: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.run(password, self.breach.check_cancellable(password, token))
            .await
    }

    /// Async version that sends the analysis result via channel.
    #[cfg(feature = "async")]
    pub async fn analyze_tx(
        &self,
        password: &SecretString,
        token: CancellationToken,
        tx: mpsc::Sender<Result<AnalysisResult, AnalysisError>>,
    ) {
        #[cfg(feature = "tracing")]
        tracing::info!("analysis is about to start...");

        let result = self.analyze_cancellable(password, &token).await;

        if let Err(_e) = tx.send(result).await {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to send password analysis result: receiver dropped");
        }
    }

    async fn run<F>(
        &self,
        password: &SecretString,
        breach: F,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        F: Future<Output = BreachStatus>,
    {
        let evaluation = evaluate(password, &self.config.criteria);
        let is_common = self.blocklist.is_common(password.expose_secret());
        let fast = fast_digests(password);

        // adaptive hashing blocks for its full cost, run it on the blocking pool
        let hasher = self.hasher.clone();
        let owned = SecretString::new(password.expose_secret().into());
        let adaptive = tokio::task::spawn_blocking(move || hasher.adaptive_hashes(&owned));

        let (breach, adaptive) = tokio::join!(breach, adaptive);
        let adaptive = adaptive??;

        let verdict = apply_overrides(evaluation.level, is_common, &breach);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Analysis done: score={} computed={:?} level={:?} override={:?} breach_known={}",
            evaluation.score.value(),
            evaluation.level,
            verdict.level,
            verdict.override_reason,
            breach.is_known()
        );

        Ok(AnalysisResult {
            criteria: evaluation.criteria,
            score: evaluation.score,
            computed_level: evaluation.level,
            level: verdict.level,
            override_reason: verdict.override_reason,
            is_common,
            breach,
            hashes: HashBundle { fast, adaptive },
            suggestions: suggestions(&evaluation.criteria),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breach::tests::{StubRangeClient, listing_with_123456, serve_once_after};
    use crate::breach::{BreachFailure, BreachResult, UnknownReason};
    use crate::config::HasherConfig;
    use std::time::Duration;

    const CLEAN_LISTING: &str = "0018A45C4D1DEF81644B54AB7F969B88D65:3\n";

    fn fast_config() -> AnalyzerConfig {
        AnalyzerConfig {
            hasher: HasherConfig {
                bcrypt_cost: 4,
                argon2_memory_kib: 64,
                argon2_time_cost: 1,
                argon2_parallelism: 1,
            },
            ..Default::default()
        }
    }

    fn analyzer(client: StubRangeClient, blocklist: &str) -> Analyzer<StubRangeClient> {
        Analyzer::with_client(
            fast_config(),
            Arc::new(Blocklist::from_lines(blocklist)),
            Arc::new(client),
        )
        .unwrap()
    }

    fn secret(pwd: &str) -> SecretString {
        SecretString::new(pwd.into())
    }

    #[tokio::test]
    async fn test_strong_password() {
        let analyzer = analyzer(StubRangeClient::answering(CLEAN_LISTING), "password\n");
        let pwd = secret("MyS3cur3P@ssw0rd!2025");
        let result = analyzer.analyze(&pwd).await.unwrap();

        assert_eq!(result.score.value(), 5);
        assert_eq!(result.computed_level, StrengthLevel::Strong);
        assert_eq!(result.level, StrengthLevel::Strong);
        assert!(!result.was_overridden());
        assert!(!result.is_common);
        assert_eq!(
            result.breach,
            BreachStatus::Known(BreachResult {
                is_breached: false,
                occurrence_count: 0,
            })
        );
        assert!(result.suggestions.is_empty());
        assert_eq!(result.hashes.fast.md5, "b0f0216eb702658e6dcc662bbf88b9a8");
        assert!(PasswordHasher::verify_bcrypt(&pwd, &result.hashes.adaptive.bcrypt).unwrap());
        assert!(PasswordHasher::verify_argon2(&pwd, &result.hashes.adaptive.argon2).unwrap());
    }

    #[tokio::test]
    async fn test_empty_password() {
        let analyzer = analyzer(StubRangeClient::answering(CLEAN_LISTING), "password\n");
        let result = analyzer.analyze(&secret("")).await.unwrap();

        assert_eq!(result.score.value(), 0);
        assert_eq!(result.level, StrengthLevel::Weak);
        assert_eq!(result.criteria, CriterionResult::default());
        assert_eq!(result.suggestions.len(), 5);
    }

    #[tokio::test]
    async fn test_common_password_is_weak() {
        let analyzer = analyzer(StubRangeClient::answering(CLEAN_LISTING), "password\n");
        let result = analyzer.analyze(&secret("password")).await.unwrap();

        assert!(result.is_common);
        assert_eq!(result.level, StrengthLevel::Weak);
        assert_eq!(result.override_reason, Some(OverrideReason::CommonPassword));
    }

    #[tokio::test]
    async fn test_common_override_preserves_raw_score() {
        let analyzer = analyzer(
            StubRangeClient::answering(CLEAN_LISTING),
            "mys3cur3p@ssw0rd!2025\n",
        );
        let result = analyzer.analyze(&secret("MyS3cur3P@ssw0rd!2025")).await.unwrap();

        assert_eq!(result.score.value(), 5);
        assert_eq!(result.computed_level, StrengthLevel::Strong);
        assert_eq!(result.level, StrengthLevel::Weak);
        assert!(result.was_overridden());
    }

    #[tokio::test]
    async fn test_breached_password_is_weak() {
        let analyzer = analyzer(
            StubRangeClient::answering(&listing_with_123456(23_174_662)),
            "password\n",
        );
        let result = analyzer.analyze(&secret("123456")).await.unwrap();

        assert!(!result.is_common);
        assert_eq!(result.level, StrengthLevel::Weak);
        assert_eq!(result.override_reason, Some(OverrideReason::Breached));
        assert!(result.breach.is_breached());
        assert_eq!(result.breach.occurrence_count(), Some(23_174_662));
    }

    #[tokio::test(start_paused = true)]
    async fn test_breach_timeout_falls_back_to_blocklist() {
        let analyzer = analyzer(
            StubRangeClient::stalled(Duration::from_secs(60)),
            "password\n",
        );

        let strong = analyzer.analyze(&secret("MyS3cur3P@ssw0rd!2025")).await.unwrap();
        assert_eq!(strong.breach, BreachStatus::Unknown(UnknownReason::Timeout));
        assert_eq!(strong.level, StrengthLevel::Strong);
        assert_eq!(strong.override_reason, None);

        let common = analyzer.analyze(&secret("password")).await.unwrap();
        assert_eq!(common.breach, BreachStatus::Unknown(UnknownReason::Timeout));
        assert_eq!(common.level, StrengthLevel::Weak);
        assert_eq!(common.override_reason, Some(OverrideReason::CommonPassword));
    }

    #[tokio::test]
    async fn test_unreachable_is_surfaced_not_hidden() {
        let analyzer = analyzer(
            StubRangeClient::failing(BreachFailure::Unreachable("offline".to_string())),
            "password\n",
        );
        let result = analyzer.analyze(&secret("MyS3cur3P@ssw0rd!2025")).await.unwrap();
        assert!(!result.breach.is_known());
        assert_eq!(result.breach.occurrence_count(), None);
    }

    #[tokio::test]
    async fn test_repeat_analysis_digests() {
        let analyzer = analyzer(StubRangeClient::answering(CLEAN_LISTING), "");
        let pwd = secret("correct horse battery staple");

        let first = analyzer.analyze(&pwd).await.unwrap();
        let second = analyzer.analyze(&pwd).await.unwrap();
        assert_eq!(first.hashes.fast, second.hashes.fast);
        assert_ne!(first.hashes.adaptive.bcrypt, second.hashes.adaptive.bcrypt);
        assert_ne!(first.hashes.adaptive.argon2, second.hashes.adaptive.argon2);
    }

    #[tokio::test]
    async fn test_concurrent_analyses_stay_consistent() {
        let analyzer = analyzer(StubRangeClient::answering(CLEAN_LISTING), "password\n");
        let common = secret("password");
        let strong = secret("MyS3cur3P@ssw0rd!2025");
        let (a, b) = tokio::join!(analyzer.analyze(&common), analyzer.analyze(&strong));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.hashes.fast.md5, "5f4dcc3b5aa765d61d8327deb882cf99");
        assert!(a.is_common);
        assert_eq!(b.hashes.fast.md5, "b0f0216eb702658e6dcc662bbf88b9a8");
        assert!(!b.is_common);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let mut config = fast_config();
        config.hasher.bcrypt_cost = 31;
        let result = Analyzer::with_client(
            config,
            Arc::new(Blocklist::default()),
            Arc::new(StubRangeClient::answering(CLEAN_LISTING)),
        );
        assert!(matches!(result, Err(ConfigError::BcryptCostOutOfRange(31))));
    }

    #[tokio::test]
    async fn test_with_overrides() {
        let analyzer = analyzer(StubRangeClient::answering(CLEAN_LISTING), "");

        let bad = ConfigOverrides {
            argon2_time_cost: Some(0),
            ..Default::default()
        };
        assert!(analyzer.with_overrides(&bad).is_err());

        let tuned = analyzer
            .with_overrides(&ConfigOverrides {
                bcrypt_cost: Some(5),
                breach_timeout: Some(Duration::from_millis(250)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(tuned.config().breach.timeout, Duration::from_millis(250));

        let result = tuned.analyze(&secret("Tr0ub4dor&3")).await.unwrap();
        assert!(result.hashes.adaptive.bcrypt.starts_with("$2b$05$"));
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_analyze_tx_cancelled() {
        let analyzer = analyzer(
            StubRangeClient::stalled(Duration::from_secs(1)),
            "password\n",
        );
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();

        analyzer.analyze_tx(&secret("password"), token, tx).await;

        let result = rx.recv().await.expect("Should receive analysis").unwrap();
        assert_eq!(result.breach, BreachStatus::Unknown(UnknownReason::Cancelled));
        assert_eq!(result.level, StrengthLevel::Weak);
    }

    #[tokio::test]
    async fn test_longer_timeout_override_reaches_the_wire() {
        let (endpoint, server) = serve_once_after(
            Duration::from_millis(400),
            "HTTP/1.1 200 OK",
            &listing_with_123456(7),
        )
        .await;
        let mut config = fast_config();
        config.breach.endpoint = endpoint;
        config.breach.timeout = Duration::from_millis(100);
        let analyzer = Analyzer::new(config, Arc::new(Blocklist::default())).unwrap();

        let patient = analyzer
            .with_overrides(&ConfigOverrides {
                breach_timeout: Some(Duration::from_secs(10)),
                ..Default::default()
            })
            .unwrap();
        let result = patient.analyze(&secret("123456")).await.unwrap();
        server.await.unwrap();

        assert_eq!(result.breach.occurrence_count(), Some(7));
        assert_eq!(result.override_reason, Some(OverrideReason::Breached));
    }

    #[test]
    fn test_default_analyzer_builds() {
        let analyzer = Analyzer::new(AnalyzerConfig::default(), Arc::new(Blocklist::embedded()));
        assert!(analyzer.is_ok());
    }
}
