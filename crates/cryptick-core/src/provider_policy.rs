use std::time::Duration;

use crate::ProviderId;

/// Rate-budget policy for a third-party provider's free tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub retry_backoff: BackoffPolicy,
}

/// Backoff shape applied to requests buffered behind an exhausted quota.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_retries: u32,
}

impl ProviderPolicy {
    /// Exchange ticker endpoints weight-limit aggressively per minute.
    pub fn exchange_ticker_default() -> Self {
        Self {
            provider_id: ProviderId::ExchangeTicker,
            quota_window: Duration::from_secs(60),
            quota_limit: 60,
            retry_backoff: BackoffPolicy {
                initial_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(30),
                multiplier: 2.0,
                max_retries: 3,
            },
        }
    }

    /// The index provider's anonymous tier allows roughly 30 calls/minute.
    pub fn aggregator_index_default() -> Self {
        Self {
            provider_id: ProviderId::AggregatorIndex,
            quota_window: Duration::from_secs(60),
            quota_limit: 30,
            retry_backoff: BackoffPolicy {
                initial_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(60),
                multiplier: 2.0,
                max_retries: 3,
            },
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Option<Self> {
        match provider_id {
            ProviderId::ExchangeTicker => Some(Self::exchange_ticker_default()),
            ProviderId::AggregatorIndex => Some(Self::aggregator_index_default()),
            ProviderId::PrimaryApi | ProviderId::LocalHeuristic => None,
        }
    }
}
