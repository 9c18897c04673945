use serde::Serialize;

use cryptick_core::{Operation, ProviderCascade, ProviderId};

use crate::cli::ProvidersArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ProviderStatus {
    id: ProviderId,
    registered: bool,
    capabilities: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct ChainStatus {
    operation: Operation,
    chain: Vec<ProviderId>,
}

#[derive(Debug, Serialize)]
struct ProvidersResponseData {
    providers: Vec<ProviderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chains: Option<Vec<ChainStatus>>,
}

pub fn run(args: &ProvidersArgs, cascade: &ProviderCascade) -> Result<CommandResult, CliError> {
    let providers = ProviderId::ALL
        .into_iter()
        .filter(|&id| id != ProviderId::LocalHeuristic)
        .map(|id| match cascade.snapshot(id) {
            Some(snapshot) => ProviderStatus {
                id,
                registered: true,
                capabilities: snapshot.capabilities.supported_operations(),
            },
            None => ProviderStatus {
                id,
                registered: false,
                capabilities: Vec::new(),
            },
        })
        .collect::<Vec<_>>();

    let chains = args.verbose.then(|| {
        [Operation::Snapshots, Operation::History, Operation::Prediction]
            .into_iter()
            .map(|operation| {
                let mut chain = ProviderCascade::chain_for(operation).to_vec();
                if operation == Operation::Prediction {
                    chain.push(ProviderId::LocalHeuristic);
                }
                ChainStatus { operation, chain }
            })
            .collect::<Vec<_>>()
    });

    let data = serde_json::to_value(ProvidersResponseData { providers, chains })?;

    Ok(CommandResult::ok(data, cascade.registered_providers()))
}
