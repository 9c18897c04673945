use std::str::FromStr;

use serde::Serialize;

use cryptick_core::{
    AssetSymbol, CascadeError, ChainStrategy, MarketSnapshot, ProviderCascade, SnapshotsRequest,
};

use crate::cli::SnapshotsArgs;
use crate::error::CliError;

use super::{exhausted_result, CommandResult};

#[derive(Debug, Serialize)]
struct SnapshotsResponseData {
    snapshots: Vec<MarketSnapshot>,
}

pub async fn run(
    args: &SnapshotsArgs,
    cascade: &ProviderCascade,
    strategy: ChainStrategy,
) -> Result<CommandResult, CliError> {
    let symbols = if args.symbols.is_empty() {
        AssetSymbol::ALL.to_vec()
    } else {
        args.symbols
            .iter()
            .map(|raw| AssetSymbol::from_str(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    let request =
        SnapshotsRequest::new(symbols).map_err(|error| CliError::Command(error.to_string()))?;

    match cascade.fetch_snapshots(&request, strategy).await {
        Ok(success) => {
            let data = serde_json::to_value(SnapshotsResponseData {
                snapshots: success.data,
            })?;

            Ok(CommandResult::ok(data, success.provider_chain)
                .with_errors(success.errors)
                .with_warnings(success.warnings)
                .with_latency(success.latency_ms))
        }
        Err(error @ CascadeError::Configuration { .. }) => {
            Err(CliError::Command(error.to_string()))
        }
        Err(CascadeError::Exhausted(failure)) => {
            let data = serde_json::to_value(SnapshotsResponseData {
                snapshots: Vec::new(),
            })?;
            Ok(exhausted_result(failure, data))
        }
    }
}
