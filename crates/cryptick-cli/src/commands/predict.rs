use std::str::FromStr;

use serde::Serialize;

use cryptick_core::{
    AssetSymbol, CascadeError, ChainStrategy, PredictionRequest, PredictionResult,
    ProviderCascade, Timeframe,
};

use crate::cli::PredictArgs;
use crate::error::CliError;

use super::{exhausted_result, CommandResult};

#[derive(Debug, Serialize)]
struct PredictResponseData {
    prediction: Option<PredictionResult>,
}

pub async fn run(
    args: &PredictArgs,
    cascade: &ProviderCascade,
    strategy: ChainStrategy,
) -> Result<CommandResult, CliError> {
    let symbol = AssetSymbol::from_str(&args.symbol)?;
    let timeframe = Timeframe::from_str(&args.timeframe)?;
    let request = PredictionRequest::new(symbol, timeframe);

    match cascade.fetch_prediction(&request, strategy).await {
        Ok(success) => {
            let data = serde_json::to_value(PredictResponseData {
                prediction: Some(success.data),
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
            let data = serde_json::to_value(PredictResponseData { prediction: None })?;
            Ok(exhausted_result(failure, data))
        }
    }
}
