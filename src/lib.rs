//! Volbot - multi-wallet volume bot for Solana
//! Runs randomized Jupiter swap sequences across independent wallets

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use domain::execution::SwapExecutor;
pub use domain::runner::WalletRunner;
pub use domain::tokens::TokenRoster;
pub use infrastructure::history::HistoryLog;
pub use infrastructure::jupiter::JupiterClient;
pub use infrastructure::rpc_client::SolanaRpc;
