//! Common types used across the application

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Token descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenInfo {
    pub mint: Pubkey,
    pub symbol: String,
    pub decimals: u8,
    /// Marks the base asset every wallet normalizes into (SOL).
    pub is_base: bool,
}

impl TokenInfo {
    pub fn new(mint: Pubkey, symbol: &str, decimals: u8, is_base: bool) -> Self {
        Self {
            mint,
            symbol: symbol.to_string(),
            decimals,
            is_base,
        }
    }
}

/// Run parameters collected once at startup and shared by value with every
/// wallet runner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub swaps_min: u32,
    pub swaps_max: u32,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Fraction of the SOL balance committed to each base-asset trade.
    pub base_fraction: f64,
}

impl RunParams {
    pub const DEFAULT_SWAPS: (u32, u32) = (5, 10);
    pub const DEFAULT_DELAY_MS: (u64, u64) = (30_000, 60_000);
    pub const DEFAULT_BASE_FRACTION: f64 = 0.9;

    /// Replace a crossed range (min > max) with the documented default pair.
    /// Never fails; each pair is substituted independently.
    pub fn sanitized(self) -> Self {
        let (swaps_min, swaps_max) = if self.swaps_min > self.swaps_max {
            Self::DEFAULT_SWAPS
        } else {
            (self.swaps_min, self.swaps_max)
        };
        let (delay_min_ms, delay_max_ms) = if self.delay_min_ms > self.delay_max_ms {
            Self::DEFAULT_DELAY_MS
        } else {
            (self.delay_min_ms, self.delay_max_ms)
        };
        Self {
            swaps_min,
            swaps_max,
            delay_min_ms,
            delay_max_ms,
            base_fraction: self.base_fraction,
        }
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            swaps_min: Self::DEFAULT_SWAPS.0,
            swaps_max: Self::DEFAULT_SWAPS.1,
            delay_min_ms: Self::DEFAULT_DELAY_MS.0,
            delay_max_ms: Self::DEFAULT_DELAY_MS.1,
            base_fraction: Self::DEFAULT_BASE_FRACTION,
        }
    }
}

/// One confirmed swap, as persisted to the shared history file.
///
/// Mints and the wallet are stored as base58 strings so the JSON file stays
/// readable and stable across SDK versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapRecord {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub txid: String,
    pub timestamp: String,
    pub wallet: String,
}

impl SwapRecord {
    pub fn new(
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        txid: &str,
        wallet: &Pubkey,
    ) -> Self {
        Self {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount,
            txid: txid.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            wallet: wallet.to_string(),
        }
    }
}
