//! Provider cascade: fixed, per-operation fallback chains.
//!
//! The primary internal API is always tried first. Snapshots and history fall
//! back through the exchange-ticker provider and then the aggregator-index
//! provider; prediction has no third-party upstream and falls back to the
//! local momentum heuristic, fed with history obtained through the same
//! cascade.
//!
//! Attempts are strictly sequential so a provider's rate limit is never hit
//! while another attempt is still draining. Only retryable (transport-class)
//! failures advance the chain; a configuration error is a caller bug and
//! propagates immediately.

use std::collections::{HashMap, HashSet};
use std::env;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::adapters::{
    AggregatorIndexAdapter, ExchangeTickerAdapter, PrimaryApiAdapter, DEFAULT_EXCHANGE_URL,
    DEFAULT_INDEX_URL, DEFAULT_PRIMARY_URL,
};
use crate::envelope::EnvelopeError;
use crate::forecast::forecast;
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::provider::{
    CapabilitySet, HistoryRequest, MarketDataProvider, Operation, PredictionRequest,
    ProviderError, ProviderErrorKind, ProviderId, SnapshotsRequest,
};
use crate::{CandleSeries, MarketSnapshot, PredictionResult};

const SNAPSHOTS_CHAIN: [ProviderId; 3] = [
    ProviderId::PrimaryApi,
    ProviderId::ExchangeTicker,
    ProviderId::AggregatorIndex,
];
const HISTORY_CHAIN: [ProviderId; 3] = [
    ProviderId::PrimaryApi,
    ProviderId::ExchangeTicker,
    ProviderId::AggregatorIndex,
];
const PREDICTION_CHAIN: [ProviderId; 1] = [ProviderId::PrimaryApi];

/// Provider selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStrategy {
    /// The documented per-operation fallback chain.
    Cascade,
    /// One provider, no fallback. Diagnostic use.
    Strict(ProviderId),
}

impl ChainStrategy {
    const fn is_strict(self) -> bool {
        matches!(self, Self::Strict(_))
    }
}

/// Successful cascade call.
#[derive(Debug, Clone)]
pub struct FetchSuccess<T> {
    pub data: T,
    pub selected_provider: ProviderId,
    pub provider_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

/// Terminal exhaustion report. The error list is diagnostic detail, not
/// control-flow information.
#[derive(Debug, Clone)]
pub struct CascadeFailure {
    pub operation: Operation,
    pub provider_chain: Vec<ProviderId>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

/// Terminal cascade outcome.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// A provider rejected the request as misconfigured. Never retried;
    /// surfacing it through fallback would mask a caller bug.
    #[error("provider '{provider}' rejected the request: {error}")]
    Configuration {
        provider: ProviderId,
        error: ProviderError,
    },

    /// Every provider in the operation's chain failed.
    #[error("all providers exhausted for operation '{}'", .0.operation)]
    Exhausted(CascadeFailure),
}

pub type CascadeResult<T> = Result<FetchSuccess<T>, CascadeError>;

/// Registered-provider snapshot used by the `providers` CLI command.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSnapshot {
    pub id: ProviderId,
    pub capabilities: CapabilitySet,
}

type InvokeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Adapter registry and cascade engine.
pub struct ProviderCascade {
    adapters: HashMap<ProviderId, Arc<dyn MarketDataProvider>>,
}

impl ProviderCascade {
    pub fn new(adapters: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();
        Self { adapters }
    }

    /// The documented attempt order for an operation.
    pub const fn chain_for(operation: Operation) -> &'static [ProviderId] {
        match operation {
            Operation::Snapshots => &SNAPSHOTS_CHAIN,
            Operation::History => &HISTORY_CHAIN,
            Operation::Prediction => &PREDICTION_CHAIN,
        }
    }

    pub fn snapshot(&self, provider: ProviderId) -> Option<ProviderSnapshot> {
        let adapter = self.adapters.get(&provider)?;
        Some(ProviderSnapshot {
            id: provider,
            capabilities: adapter.capabilities(),
        })
    }

    pub fn registered_providers(&self) -> Vec<ProviderId> {
        let mut providers = self.adapters.keys().copied().collect::<Vec<_>>();
        providers.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        providers
    }

    pub fn planned_chain(&self, operation: Operation, strategy: ChainStrategy) -> Vec<ProviderId> {
        match strategy {
            ChainStrategy::Cascade => Self::chain_for(operation).to_vec(),
            ChainStrategy::Strict(provider) => vec![provider],
        }
    }

    pub async fn fetch_snapshots(
        &self,
        req: &SnapshotsRequest,
        strategy: ChainStrategy,
    ) -> CascadeResult<Vec<MarketSnapshot>> {
        let req = req.clone();
        self.run_chain(Operation::Snapshots, strategy, move |provider| {
            provider.snapshots(req.clone())
        })
        .await
    }

    pub async fn fetch_history(
        &self,
        req: &HistoryRequest,
        strategy: ChainStrategy,
    ) -> CascadeResult<CandleSeries> {
        let req = *req;
        self.run_chain(Operation::History, strategy, move |provider| {
            provider.history(req)
        })
        .await
    }

    /// Prediction cascade: the upstream prediction source first, then the
    /// local momentum heuristic over history fetched through the history
    /// cascade. Strict routing skips the heuristic; the caller asked for one
    /// provider's answer.
    pub async fn fetch_prediction(
        &self,
        req: &PredictionRequest,
        strategy: ChainStrategy,
    ) -> CascadeResult<PredictionResult> {
        let request = *req;
        let upstream = self
            .run_chain(Operation::Prediction, strategy, move |provider| {
                provider.prediction(request)
            })
            .await;

        let failure = match upstream {
            Ok(success) => return Ok(success),
            Err(CascadeError::Exhausted(failure)) if !strategy.is_strict() => failure,
            Err(terminal) => return Err(terminal),
        };

        tracing::warn!(
            symbol = %req.symbol,
            timeframe = %req.timeframe,
            "prediction upstream exhausted; deriving forecast from history"
        );

        let history_req = HistoryRequest::new(req.symbol, req.timeframe);
        let history = match self.fetch_history(&history_req, ChainStrategy::Cascade).await {
            Ok(history) => history,
            Err(CascadeError::Exhausted(history_failure)) => {
                return Err(CascadeError::Exhausted(merge_failures(
                    failure,
                    history_failure,
                )));
            }
            Err(terminal) => return Err(terminal),
        };

        match forecast(req.symbol, req.timeframe, &history.data.candles) {
            Ok(prediction) => {
                let mut provider_chain = failure.provider_chain;
                provider_chain.extend(history.provider_chain);
                let mut provider_chain = dedupe_chain(&provider_chain);
                provider_chain.push(ProviderId::LocalHeuristic);

                let mut warnings = history.warnings;
                warnings.push(String::from(
                    "prediction upstream unavailable; forecast derived from the local momentum heuristic",
                ));

                let mut errors = failure.errors;
                errors.extend(history.errors);

                Ok(FetchSuccess {
                    data: prediction,
                    selected_provider: ProviderId::LocalHeuristic,
                    provider_chain,
                    warnings,
                    errors,
                    latency_ms: failure.latency_ms + history.latency_ms,
                })
            }
            Err(error) => {
                let mut combined = failure;
                combined.provider_chain.extend(history.provider_chain);
                combined.provider_chain = dedupe_chain(&combined.provider_chain);
                combined.errors.extend(history.errors);
                if let Ok(envelope_error) =
                    EnvelopeError::new("cascade.unusable_history", error.to_string())
                {
                    combined.errors.push(envelope_error.with_retryable(false));
                }
                combined.latency_ms += history.latency_ms;
                Err(CascadeError::Exhausted(combined))
            }
        }
    }

    async fn run_chain<T, F>(
        &self,
        operation: Operation,
        strategy: ChainStrategy,
        mut invoke: F,
    ) -> CascadeResult<T>
    where
        F: for<'a> FnMut(&'a dyn MarketDataProvider) -> InvokeFuture<'a, T>,
    {
        let started = Instant::now();
        let planned = self.planned_chain(operation, strategy);
        let mut provider_chain = Vec::with_capacity(planned.len());
        let mut errors = Vec::new();

        for provider in planned {
            provider_chain.push(provider);

            let Some(adapter) = self.adapters.get(&provider) else {
                push_error(
                    &mut errors,
                    "cascade.provider_not_registered",
                    format!("provider '{provider}' is not registered"),
                    Some(provider),
                    false,
                );
                if strategy.is_strict() {
                    break;
                }
                continue;
            };

            if !adapter.capabilities().supports(operation) {
                let error = ProviderError::unsupported_operation(operation);
                errors.push(to_envelope_error(provider, &error));
                if strategy.is_strict() {
                    break;
                }
                continue;
            }

            match invoke(adapter.as_ref()).await {
                Ok(data) => {
                    let mut warnings = Vec::new();
                    if !errors.is_empty() {
                        warnings.push(format!(
                            "fallback succeeded with '{}' after {} failed attempt(s)",
                            provider.as_str(),
                            errors.len()
                        ));
                    }

                    return Ok(FetchSuccess {
                        data,
                        selected_provider: provider,
                        provider_chain,
                        warnings,
                        errors,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) if error.kind() == ProviderErrorKind::Configuration => {
                    return Err(CascadeError::Configuration { provider, error });
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %provider,
                        operation = %operation,
                        error = %error,
                        "provider attempt failed"
                    );
                    errors.push(to_envelope_error(provider, &error));
                    if strategy.is_strict() {
                        break;
                    }
                }
            }
        }

        if errors.is_empty() {
            push_error(
                &mut errors,
                "cascade.no_candidate",
                format!("no provider candidates available for operation '{operation}'"),
                None,
                false,
            );
        }

        Err(CascadeError::Exhausted(CascadeFailure {
            operation,
            provider_chain,
            errors,
            latency_ms: elapsed_ms(started),
        }))
    }
}

/// Builder for a cascade wired to production adapters.
///
/// Base URLs come from the builder, from the environment
/// (`CRYPTICK_PRIMARY_URL`, `CRYPTICK_EXCHANGE_URL`, `CRYPTICK_INDEX_URL`),
/// or from the defaults, in that order of precedence.
#[derive(Default)]
pub struct CascadeBuilder {
    primary_url: Option<String>,
    exchange_url: Option<String>,
    index_url: Option<String>,
    timeout_ms: Option<u64>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl CascadeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read base-URL overrides from the environment.
    pub fn with_env(mut self) -> Self {
        if self.primary_url.is_none() {
            self.primary_url = env::var("CRYPTICK_PRIMARY_URL").ok();
        }
        if self.exchange_url.is_none() {
            self.exchange_url = env::var("CRYPTICK_EXCHANGE_URL").ok();
        }
        if self.index_url.is_none() {
            self.index_url = env::var("CRYPTICK_INDEX_URL").ok();
        }
        self
    }

    pub fn with_primary_url(mut self, url: impl Into<String>) -> Self {
        self.primary_url = Some(url.into());
        self
    }

    pub fn with_exchange_url(mut self, url: impl Into<String>) -> Self {
        self.exchange_url = Some(url.into());
        self
    }

    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = Some(url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Share one transport across all adapters (tests inject doubles here).
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn build(self) -> ProviderCascade {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);

        let primary = PrimaryApiAdapter::new(
            http_client.clone(),
            self.primary_url
                .unwrap_or_else(|| String::from(DEFAULT_PRIMARY_URL)),
        )
        .with_timeout_ms(timeout_ms);

        let exchange = ExchangeTickerAdapter::new(
            http_client.clone(),
            self.exchange_url
                .unwrap_or_else(|| String::from(DEFAULT_EXCHANGE_URL)),
        )
        .with_timeout_ms(timeout_ms);

        let index = AggregatorIndexAdapter::new(
            http_client,
            self.index_url
                .unwrap_or_else(|| String::from(DEFAULT_INDEX_URL)),
        )
        .with_timeout_ms(timeout_ms);

        ProviderCascade::new(vec![
            Arc::new(primary),
            Arc::new(exchange),
            Arc::new(index),
        ])
    }
}

fn dedupe_chain(chain: &[ProviderId]) -> Vec<ProviderId> {
    let mut seen = HashSet::new();
    let mut output = Vec::with_capacity(chain.len());

    for provider in chain {
        if seen.insert(*provider) {
            output.push(*provider);
        }
    }

    output
}

fn merge_failures(mut prediction: CascadeFailure, history: CascadeFailure) -> CascadeFailure {
    prediction.provider_chain.extend(history.provider_chain);
    prediction.provider_chain = dedupe_chain(&prediction.provider_chain);
    prediction.errors.extend(history.errors);
    prediction.latency_ms += history.latency_ms;
    prediction
}

fn to_envelope_error(provider: ProviderId, error: &ProviderError) -> EnvelopeError {
    EnvelopeError::new(error.code(), error.message())
        .expect("code/message are non-empty")
        .with_provider(provider)
        .with_retryable(error.retryable())
}

fn push_error(
    errors: &mut Vec<EnvelopeError>,
    code: &str,
    message: String,
    provider: Option<ProviderId>,
    retryable: bool,
) {
    let mut error = EnvelopeError::new(code, message)
        .expect("code/message are non-empty")
        .with_retryable(retryable);
    if let Some(provider) = provider {
        error = error.with_provider(provider);
    }
    errors.push(error);
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
