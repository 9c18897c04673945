mod history;
mod predict;
mod providers;
mod snapshots;

use cryptick_core::{
    CascadeBuilder, CascadeFailure, ChainStrategy, Envelope, EnvelopeError, ProviderId,
};
use serde_json::Value;

use crate::cli::{Cli, Command, ProviderSelector};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub provider_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, provider_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            provider_chain,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let cascade = CascadeBuilder::new()
        .with_env()
        .with_timeout_ms(cli.timeout_ms)
        .build();
    let strategy = to_chain_strategy(cli.provider);

    let command_result = match &cli.command {
        Command::Snapshots(args) => snapshots::run(args, &cascade, strategy).await?,
        Command::History(args) => history::run(args, &cascade, strategy).await?,
        Command::Predict(args) => predict::run(args, &cascade, strategy).await?,
        Command::Providers(args) => providers::run(args, &cascade)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        provider_chain,
    } = command_result;

    let mut metadata = Metadata::new(provider_chain, latency_ms)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta("v1.0.0")?;
    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

fn to_chain_strategy(provider: Option<ProviderSelector>) -> ChainStrategy {
    match provider {
        None => ChainStrategy::Cascade,
        Some(ProviderSelector::PrimaryApi) => ChainStrategy::Strict(ProviderId::PrimaryApi),
        Some(ProviderSelector::ExchangeTicker) => {
            ChainStrategy::Strict(ProviderId::ExchangeTicker)
        }
        Some(ProviderSelector::AggregatorIndex) => {
            ChainStrategy::Strict(ProviderId::AggregatorIndex)
        }
    }
}

/// Terminal exhaustion becomes an envelope with empty data and the attempt
/// diagnostics; the process exits with the data-error code.
fn exhausted_result(failure: CascadeFailure, data: Value) -> CommandResult {
    let exhausted = EnvelopeError::new(
        "cascade.exhausted",
        format!(
            "all providers exhausted for operation '{}'",
            failure.operation
        ),
    )
    .expect("code/message are non-empty")
    .with_retryable(true);

    let mut errors = vec![exhausted];
    errors.extend(failure.errors);

    CommandResult::ok(data, failure.provider_chain)
        .with_errors(errors)
        .with_latency(failure.latency_ms)
}
