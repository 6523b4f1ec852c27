//! Error handling for the application

use thiserror::Error;

/// Configuration and credential-source errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("failed to read credentials file {path}: {reason}")]
    Credentials { path: String, reason: String },

    #[error("credential on line {line} is not a valid base58 secret key")]
    InvalidCredential { line: usize },

    #[error("no credentials found in {path}")]
    NoCredentials { path: String },
}

/// Chain RPC errors
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    #[error("blockhash expired before confirmation")]
    BlockhashExpired,

    #[error("rpc request failed: {0}")]
    Client(String),
}

impl RpcError {
    /// Submission and balance failures other than an expired blockhash are
    /// treated as transient by the retry policies.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RpcError::BlockhashExpired)
    }
}

/// Swap-router (Jupiter API) errors
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("swap router request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("swap router returned status {status}: {body}")]
    Api { status: u16, body: String },
}

/// Per-swap errors, recovered at the call site (the caller receives a null
/// result and moves on)
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("insufficient SOL to cover network fees")]
    InsufficientFeeBalance,

    #[error("input and output tokens are identical")]
    SameToken,

    #[error("malformed swap transaction payload: {0}")]
    Payload(String),

    #[error("failed to sign swap transaction: {0}")]
    Signing(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Per-wallet fatal conditions; terminate that wallet's sequence only
#[derive(Error, Debug, Clone)]
pub enum RunnerError {
    #[error("SOL balance unavailable after {attempts} attempts: {reason}")]
    BalanceUnavailable { attempts: u32, reason: String },
}

/// History log persistence errors
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("history file io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
