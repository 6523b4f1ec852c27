//! Swap execution primitive
//!
//! One confirmed swap end to end: route quote, transaction construction,
//! signing, bounded-retry submission and confirmation, history append. All
//! failures are absorbed here; callers get `None` and skip the swap.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use solana_sdk::{
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};

use crate::config::TradeCfg;
use crate::infrastructure::history::HistoryLog;
use crate::infrastructure::jupiter::SwapRouter;
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::rpc_client::{sol_balance_with_retry, ChainClient};
use crate::shared::errors::{RpcError, SwapError};
use crate::shared::progress::ProgressSender;
use crate::shared::types::{SwapRecord, TokenInfo};

/// Per-wallet swap executor holding the injected collaborators.
pub struct SwapExecutor {
    chain: Arc<dyn ChainClient>,
    router: Arc<dyn SwapRouter>,
    history: Arc<HistoryLog>,
    keypair: Arc<Keypair>,
    trade: TradeCfg,
    policy: RetryPolicy,
    progress: ProgressSender,
}

impl SwapExecutor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        router: Arc<dyn SwapRouter>,
        history: Arc<HistoryLog>,
        keypair: Arc<Keypair>,
        trade: TradeCfg,
        policy: RetryPolicy,
        progress: ProgressSender,
    ) -> Self {
        Self {
            chain,
            router,
            history,
            keypair,
            trade,
            policy,
            progress,
        }
    }

    /// Execute one swap. On success the confirmed transaction is appended to
    /// the history log and its signature returned; on any failure the error
    /// is reported and `None` returned so the caller can move on.
    pub async fn swap(
        &self,
        input: &TokenInfo,
        output: &TokenInfo,
        amount: u64,
        slippage_bps: u16,
    ) -> Option<Signature> {
        match self.try_swap(input, output, amount, slippage_bps).await {
            Ok(signature) => {
                let record = SwapRecord::new(
                    &input.mint,
                    &output.mint,
                    amount,
                    &signature.to_string(),
                    &self.keypair.pubkey(),
                );
                if let Err(e) = self.history.append(record).await {
                    self.progress
                        .error(format!("failed to record swap {signature}: {e}"));
                }
                self.progress
                    .success(format!("swap executed, txid: {signature}"));
                Some(signature)
            }
            Err(e) => {
                self.progress.error(format!(
                    "swap {} -> {} failed: {}",
                    input.symbol, output.symbol, e
                ));
                None
            }
        }
    }

    async fn try_swap(
        &self,
        input: &TokenInfo,
        output: &TokenInfo,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<Signature, SwapError> {
        let owner = self.keypair.pubkey();

        let sol_balance = sol_balance_with_retry(
            self.chain.as_ref(),
            &owner,
            &self.policy,
            |attempt, err| {
                self.progress
                    .error(format!("SOL balance attempt {attempt} failed: {err}"));
            },
        )
        .await?;
        if sol_balance < self.trade.fee_reserve {
            return Err(SwapError::InsufficientFeeBalance);
        }
        if input.mint == output.mint {
            return Err(SwapError::SameToken);
        }

        let quote = self
            .router
            .quote(&input.mint, &output.mint, amount, slippage_bps)
            .await?;
        let swap_tx = self.router.swap_transaction(&quote, &owner).await?;

        let raw = BASE64_STANDARD
            .decode(&swap_tx.swap_transaction)
            .map_err(|e| SwapError::Payload(e.to_string()))?;
        let unsigned: VersionedTransaction =
            bincode::deserialize(&raw).map_err(|e| SwapError::Payload(e.to_string()))?;
        let signed = VersionedTransaction::try_new(unsigned.message, &[self.keypair.as_ref()])
            .map_err(|e| SwapError::Signing(e.to_string()))?;

        let chain = self.chain.as_ref();
        let tx_ref = &signed;
        let signature = self
            .policy
            .retry(
                |_| chain.send_versioned(tx_ref),
                |_: &RpcError| true,
                |attempt, err| {
                    self.progress
                        .error(format!("submission attempt {attempt} failed: {err}"));
                },
            )
            .await?;
        self.progress.info(format!("transaction sent: {signature}"));

        // Confirmation is retried only when the blockhash expired underneath
        // us; a fresh one is fetched per attempt.
        let sig_ref = &signature;
        self.policy
            .retry(
                |_| async move {
                    let blockhash = chain.latest_blockhash().await?;
                    chain.confirm(sig_ref, &blockhash).await
                },
                |err: &RpcError| matches!(err, RpcError::BlockhashExpired),
                |attempt, err| {
                    self.progress
                        .error(format!("confirmation attempt {attempt} failed: {err}"));
                },
            )
            .await?;

        Ok(signature)
    }
}
