//! Fixed token roster and next-token selection
//!
//! The roster is an immutable list with an explicit base-asset flag; target
//! selection is a pure function over a filtered slice, so the exclusion rules
//! are testable without touching the chain.

use rand::seq::SliceRandom;
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::shared::types::TokenInfo;

/// The immutable set of tokens one run trades between.
///
/// The base asset is always the first entry.
#[derive(Debug, Clone)]
pub struct TokenRoster {
    tokens: Vec<TokenInfo>,
}

impl TokenRoster {
    /// Build a roster from descriptors; exactly one entry must carry
    /// `is_base` and it is moved to the front.
    pub fn new(mut tokens: Vec<TokenInfo>) -> Self {
        tokens.sort_by_key(|t| !t.is_base);
        debug_assert_eq!(tokens.iter().filter(|t| t.is_base).count(), 1);
        Self { tokens }
    }

    /// The mainnet roster traded by default.
    pub fn mainnet_default() -> Self {
        let mint = |s: &str| Pubkey::from_str(s).expect("known-good mint literal");
        Self::new(vec![
            TokenInfo::new(spl_token::native_mint::id(), "SOL", 9, true),
            TokenInfo::new(mint("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"), "USDT", 6, false),
            TokenInfo::new(mint("J1toso1uCk3RLmjorhTtrVwY9HJ7X8V9yYac6Y7kGCPn"), "Jito", 6, false),
            TokenInfo::new(mint("7vfCXTUXx5WJV5JADk17DUJ4ksgau7utNKj4b963voxs"), "WETH", 8, false),
            TokenInfo::new(mint("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"), "USDC", 6, false),
            TokenInfo::new(mint("EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm"), "WIF", 9, false),
            TokenInfo::new(mint("63LfDmNb3MQ8mw9MtZ2To9bEA2M71kZUUGq5tiJxcqj9"), "GIGA", 9, false),
            TokenInfo::new(mint("Grass7B4RdKfBCjTKgSqnXkqjwiGvQyFbuSCUJr3XXjs"), "GRASS", 9, false),
            TokenInfo::new(mint("9BB6NFEcjBCtnNLFko2FqVQBq8HHM13kCyYcdQbgpump"), "FARTCOIN", 9, false),
            TokenInfo::new(mint("6p6xgHyF7AeE6TZkSmFsko444wqoP15icUSqi2jfGiPN"), "TRUMP", 9, false),
        ])
    }

    pub fn base(&self) -> &TokenInfo {
        &self.tokens[0]
    }

    pub fn all(&self) -> &[TokenInfo] {
        &self.tokens
    }

    pub fn non_base(&self) -> impl Iterator<Item = &TokenInfo> {
        self.tokens.iter().filter(|t| !t.is_base)
    }

    pub fn by_mint(&self, mint: &Pubkey) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| &t.mint == mint)
    }

    /// Display name for a mint, falling back to the base58 form for tokens
    /// outside the roster.
    pub fn symbol_of(&self, mint: &Pubkey) -> String {
        self.by_mint(mint)
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| mint.to_string())
    }

    /// Pick a uniformly random swap target.
    ///
    /// The base asset is never a target during the randomized phase and the
    /// excluded mints (the currently held token, plus any token whose account
    /// could not be prepared) are filtered out. Returns `None` when nothing
    /// is eligible.
    pub fn pick_target<R: Rng + ?Sized>(
        &self,
        exclude: &[Pubkey],
        rng: &mut R,
    ) -> Option<&TokenInfo> {
        let eligible: Vec<&TokenInfo> = self
            .non_base()
            .filter(|t| !exclude.contains(&t.mint))
            .collect();
        eligible.choose(rng).copied()
    }
}
