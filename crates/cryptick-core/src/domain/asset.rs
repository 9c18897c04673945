use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Closed set of tracked asset tickers.
///
/// The catalog is fixed at compile time; provider adapters translate each
/// member into their own identifier space through static lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetSymbol {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "XRP")]
    Xrp,
}

impl AssetSymbol {
    pub const ALL: [Self; 3] = [Self::Btc, Self::Eth, Self::Xrp];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Btc => "BTC",
            Self::Eth => "ETH",
            Self::Xrp => "XRP",
        }
    }

    /// Human-readable asset name used when a provider reports none.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Btc => "Bitcoin",
            Self::Eth => "Ethereum",
            Self::Xrp => "XRP",
        }
    }
}

impl Display for AssetSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetSymbol {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(Self::Btc),
            "ETH" => Ok(Self::Eth),
            "XRP" => Ok(Self::Xrp),
            other => Err(ValidationError::InvalidAssetSymbol {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = AssetSymbol::from_str(" btc ").expect("must parse");
        assert_eq!(parsed, AssetSymbol::Btc);
        assert_eq!(parsed.as_str(), "BTC");
    }

    #[test]
    fn rejects_untracked_symbol() {
        let err = AssetSymbol::from_str("DOGE").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidAssetSymbol { .. }));
    }

    #[test]
    fn every_symbol_has_a_display_name() {
        for symbol in AssetSymbol::ALL {
            assert!(!symbol.display_name().is_empty());
        }
    }
}
