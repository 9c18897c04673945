//! CLI argument definitions for Cryptick.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snapshots` | Fetch market snapshots for tracked symbols |
//! | `history` | Fetch historical candles |
//! | `predict` | Fetch a price prediction |
//! | `providers` | List provider capabilities and fallback chains |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--provider` | (cascade) | Route to one provider, no fallback |
//! | `--timeout-ms` | `3000` | Per-attempt timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! # Snapshot the whole tracked catalog
//! cryptick snapshots
//!
//! # One month of ETH candles
//! cryptick history ETH --timeframe 1M --pretty
//!
//! # Force the exchange provider, no fallback
//! cryptick snapshots BTC --provider exchange-ticker
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Cryptick - crypto market-data aggregation CLI
///
/// Fetches snapshots, candle history, and price predictions from a primary
/// internal API with automatic fallback through independent third-party
/// providers, always returning one canonical shape.
#[derive(Debug, Parser)]
#[command(
    name = "cryptick",
    author,
    version,
    about = "Crypto market-data aggregation CLI"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Route to a single provider without fallback. Diagnostic use.
    #[arg(long, global = true, value_enum)]
    pub provider: Option<ProviderSelector>,

    /// Per-attempt timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 3000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
}

/// Strict single-provider routing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderSelector {
    /// Primary internal API.
    PrimaryApi,
    /// Exchange-ticker provider.
    ExchangeTicker,
    /// Aggregator-index provider.
    AggregatorIndex,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch market snapshots (price, 24h change, volume, market cap).
    ///
    /// With no symbols, snapshots the whole tracked catalog.
    Snapshots(SnapshotsArgs),

    /// Fetch historical candles for one symbol.
    History(HistoryArgs),

    /// Fetch a price prediction for one symbol.
    ///
    /// Falls back to the local momentum heuristic when the prediction
    /// upstream is unreachable.
    Predict(PredictArgs),

    /// List provider capabilities and per-operation fallback chains.
    Providers(ProvidersArgs),
}

/// Arguments for the `snapshots` command.
#[derive(Debug, Args)]
pub struct SnapshotsArgs {
    /// Tracked symbols (BTC, ETH, XRP). Defaults to the whole catalog.
    #[arg(num_args = 0..)]
    pub symbols: Vec<String>,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Tracked symbol to fetch candles for.
    pub symbol: String,

    /// Horizon: 1D, 1W, 1M, 3M, or 1Y.
    #[arg(long, default_value = "1M")]
    pub timeframe: String,
}

/// Arguments for the `predict` command.
#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Tracked symbol to predict.
    pub symbol: String,

    /// Horizon: 1D, 1W, 1M, 3M, or 1Y.
    #[arg(long, default_value = "1W")]
    pub timeframe: String,
}

/// Arguments for the `providers` command.
#[derive(Debug, Args)]
pub struct ProvidersArgs {
    /// Include the per-operation fallback chains.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
