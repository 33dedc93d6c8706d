//! k-anonymity breach lookup against a range-query endpoint.
//!
//! Only the first 5 hex characters of the password's SHA-1 leave the
//! process. The endpoint answers with every known suffix sharing that
//! prefix and the match is done locally.
//!
//! Every failure is folded into [`BreachStatus::Unknown`]; a lookup that did
//! not complete is never reported as "not breached".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::config::{BreachConfig, ConfigError, MAX_BREACH_TIMEOUT};
use crate::digest::sha1_upper_hex;

/// Hex characters disclosed to the endpoint.
pub const PREFIX_LEN: usize = 5;
/// Hex characters the endpoint returns per entry.
pub const SUFFIX_LEN: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreachResult {
    pub is_breached: bool,
    pub occurrence_count: u64,
}

/// Why a breach status could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    Timeout,
    Unreachable,
    BadResponse,
    Cancelled,
    /// Lookup switched off by configuration.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachStatus {
    Known(BreachResult),
    Unknown(UnknownReason),
}

impl BreachStatus {
    /// `true` only for a completed lookup that found the password.
    pub fn is_breached(&self) -> bool {
        matches!(self, BreachStatus::Known(r) if r.is_breached)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, BreachStatus::Known(_))
    }

    /// `None` when the status is unknown.
    pub fn occurrence_count(&self) -> Option<u64> {
        match self {
            BreachStatus::Known(r) => Some(r.occurrence_count),
            BreachStatus::Unknown(_) => None,
        }
    }
}

/// Transport-level failure of a range query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BreachFailure {
    #[error("range query timed out")]
    Timeout,
    #[error("range endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("range endpoint answered with status {0}")]
    BadStatus(u16),
    #[error("malformed range response: {0}")]
    BadResponse(String),
}

impl BreachFailure {
    pub fn reason(&self) -> UnknownReason {
        match self {
            BreachFailure::Timeout => UnknownReason::Timeout,
            BreachFailure::Unreachable(_) => UnknownReason::Unreachable,
            BreachFailure::BadStatus(_) | BreachFailure::BadResponse(_) => {
                UnknownReason::BadResponse
            }
        }
    }
}

/// Fetches the raw `SUFFIX:COUNT` listing for a hash prefix.
#[async_trait]
pub trait RangeClient: Send + Sync {
    /// `prefix` is always [`PREFIX_LEN`] uppercase hex characters.
    async fn fetch_range(&self, prefix: &str) -> Result<String, BreachFailure>;
}

/// [`RangeClient`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpRangeClient {
    client: reqwest::Client,
    endpoint: String,
    add_padding: bool,
}

impl HttpRangeClient {
    /// The client itself only carries the widest allowed timeout; the
    /// per-lookup timeout is enforced by [`BreachLookup`], so analyzers that
    /// share this client may each use their own.
    pub fn new(config: &BreachConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(MAX_BREACH_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            add_padding: config.add_padding,
        })
    }

    pub fn range_url(&self, prefix: &str) -> String {
        format!("{}/{}", self.endpoint, prefix)
    }
}

#[async_trait]
impl RangeClient for HttpRangeClient {
    async fn fetch_range(&self, prefix: &str) -> Result<String, BreachFailure> {
        let mut request = self.client.get(self.range_url(prefix));
        if self.add_padding {
            request = request.header("Add-Padding", "true");
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BreachFailure::BadStatus(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                BreachFailure::Timeout
            } else {
                BreachFailure::BadResponse(e.to_string())
            }
        })
    }
}

fn classify(e: reqwest::Error) -> BreachFailure {
    if e.is_timeout() {
        BreachFailure::Timeout
    } else {
        BreachFailure::Unreachable(e.to_string())
    }
}

/// Scans a range body for `suffix`.
///
/// Every line must be `<35 hex>:<count>`; one bad line rejects the whole
/// body. Returns the paired count, or `None` when the suffix is absent.
pub fn find_suffix(body: &str, suffix: &str) -> Result<Option<u64>, BreachFailure> {
    let mut found = None;
    let mut entries = 0usize;

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (candidate, count) = line
            .split_once(':')
            .ok_or_else(|| BreachFailure::BadResponse("entry without ':'".to_string()))?;
        if candidate.len() != SUFFIX_LEN || !candidate.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BreachFailure::BadResponse("invalid suffix".to_string()));
        }
        let count = count.trim();
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BreachFailure::BadResponse("invalid count".to_string()));
        }
        let count: u64 = count
            .parse()
            .map_err(|_| BreachFailure::BadResponse("invalid count".to_string()))?;

        if found.is_none() && candidate.eq_ignore_ascii_case(suffix) {
            found = Some(count);
        }
        entries += 1;
    }

    // an empty listing is treated as malformed
    if entries == 0 {
        return Err(BreachFailure::BadResponse("empty listing".to_string()));
    }
    Ok(found)
}

/// Breach checker bound to one transport.
pub struct BreachLookup<C> {
    client: Arc<C>,
    timeout: Duration,
    enabled: bool,
}

impl<C> Clone for BreachLookup<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            timeout: self.timeout,
            enabled: self.enabled,
        }
    }
}

impl<C: RangeClient> BreachLookup<C> {
    pub fn new(client: Arc<C>, config: &BreachConfig) -> Self {
        Self {
            client,
            timeout: config.timeout,
            enabled: config.enabled,
        }
    }

    /// Same transport, different timeout and switch.
    pub(crate) fn reconfigured(&self, config: &BreachConfig) -> Self {
        Self::new(Arc::clone(&self.client), config)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the k-anonymity protocol. Never fails; bounded by the timeout.
    pub async fn check(&self, password: &SecretString) -> BreachStatus {
        if !self.enabled {
            return BreachStatus::Unknown(UnknownReason::Disabled);
        }

        let digest = sha1_upper_hex(password);
        let (prefix, suffix) = digest.split_at(PREFIX_LEN);

        let fetch = self.client.fetch_range(prefix);
        let outcome = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(body)) => find_suffix(&body, suffix),
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(BreachFailure::Timeout),
        };

        match outcome {
            // zero-count entries are padding
            Ok(Some(count)) if count > 0 => BreachStatus::Known(BreachResult {
                is_breached: true,
                occurrence_count: count,
            }),
            Ok(_) => BreachStatus::Known(BreachResult {
                is_breached: false,
                occurrence_count: 0,
            }),
            Err(failure) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Breach lookup degraded to unknown: {}", failure);
                BreachStatus::Unknown(failure.reason())
            }
        }
    }

    /// Like [`check`](Self::check), but gives up as soon as `token` is cancelled.
    #[cfg(feature = "async")]
    pub async fn check_cancellable(
        &self,
        password: &SecretString,
        token: &CancellationToken,
    ) -> BreachStatus {
        tokio::select! {
            _ = token.cancelled() => BreachStatus::Unknown(UnknownReason::Cancelled),
            status = self.check(password) => status,
        }
    }
}
