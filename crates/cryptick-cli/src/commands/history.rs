use std::str::FromStr;

use serde::Serialize;

use cryptick_core::{
    AssetSymbol, CandleSeries, CascadeError, ChainStrategy, HistoryRequest, ProviderCascade,
    Timeframe,
};

use crate::cli::HistoryArgs;
use crate::error::CliError;

use super::{exhausted_result, CommandResult};

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    series: Option<CandleSeries>,
}

pub async fn run(
    args: &HistoryArgs,
    cascade: &ProviderCascade,
    strategy: ChainStrategy,
) -> Result<CommandResult, CliError> {
    let symbol = AssetSymbol::from_str(&args.symbol)?;
    let timeframe = Timeframe::from_str(&args.timeframe)?;
    let request = HistoryRequest::new(symbol, timeframe);

    match cascade.fetch_history(&request, strategy).await {
        Ok(success) => {
            let data = serde_json::to_value(HistoryResponseData {
                series: Some(success.data),
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
            let data = serde_json::to_value(HistoryResponseData { series: None })?;
            Ok(exhausted_result(failure, data))
        }
    }
}
