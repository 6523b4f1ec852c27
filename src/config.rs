use serde::Deserialize;
use std::{fs, path::Path};

use crate::shared::errors::ConfigError;

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_router_url() -> String {
    "https://quote-api.jup.ag/v6".to_string()
}

fn default_history_path() -> String {
    "swap_history.json".to_string()
}

fn default_slippage_bps() -> u16 {
    50
}

fn default_max_slippage_bps() -> u16 {
    100
}

fn default_fee_reserve() -> u64 {
    10_000
}

fn default_min_trade_lamports() -> u64 {
    1_000_000
}

fn default_min_token_amount() -> u64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    #[serde(default = "default_rpc_url")]
    pub url: String,
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterCfg {
    #[serde(default = "default_router_url")]
    pub base_url: String,
}

impl Default for RouterCfg {
    fn default() -> Self {
        Self {
            base_url: default_router_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryCfg {
    #[serde(default = "default_history_path")]
    pub path: String,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

/// Trade sizing and slippage knobs; defaults match the documented constants.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    /// Slippage bound for randomized-phase swaps, in basis points.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
    /// Wider bound used when sweeping token balances back into SOL.
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: u16,
    /// Lamports always left untouched to pay network fees.
    #[serde(default = "default_fee_reserve")]
    pub fee_reserve: u64,
    /// Smallest viable base-asset trade; below this the sequence aborts.
    #[serde(default = "default_min_trade_lamports")]
    pub min_trade_lamports: u64,
    /// Dust threshold: token balances below this raw amount are not swept.
    #[serde(default = "default_min_token_amount")]
    pub min_token_amount: u64,
}

impl Default for TradeCfg {
    fn default() -> Self {
        Self {
            slippage_bps: default_slippage_bps(),
            max_slippage_bps: default_max_slippage_bps(),
            fee_reserve: default_fee_reserve(),
            min_trade_lamports: default_min_trade_lamports(),
            min_token_amount: default_min_token_amount(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcCfg,
    #[serde(default)]
    pub router: RouterCfg,
    #[serde(default)]
    pub history: HistoryCfg,
    #[serde(default)]
    pub trade: TradeCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let s = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        toml::from_str(&s).map_err(|e| ConfigError::Parse {
            path: path_str,
            reason: e.to_string(),
        })
    }
}
