//! Solana RPC access behind an injectable trait
//!
//! Runners and the swap executor only see `ChainClient`, so chain access is
//! mockable in tests and never a process-wide singleton.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, VersionedTransaction},
};
use spl_associated_token_account::get_associated_token_address;
use tracing::warn;

use crate::infrastructure::retry::RetryPolicy;
use crate::shared::errors::RpcError;

/// The chain operations a wallet runner needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native SOL balance in lamports.
    async fn sol_balance(&self, owner: &Pubkey) -> Result<u64, RpcError>;

    /// Raw token-account balance for `owner`'s associated account of `mint`;
    /// 0 when the account does not exist.
    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, RpcError>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, RpcError>;

    async fn latest_blockhash(&self) -> Result<Hash, RpcError>;

    /// Fire-and-return submission of a fully signed versioned transaction.
    async fn send_versioned(&self, tx: &VersionedTransaction) -> Result<Signature, RpcError>;

    /// Wait until `signature` is confirmed, or fail with
    /// `RpcError::BlockhashExpired` once `recent_blockhash` is no longer
    /// valid.
    async fn confirm(&self, signature: &Signature, recent_blockhash: &Hash)
        -> Result<(), RpcError>;

    /// Submit a legacy transaction and wait for confirmation (used for
    /// token-account creation).
    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, RpcError>;
}

/// Nonblocking RPC client wrapper at confirmed commitment.
pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpc {
    pub fn new(rpc_url: String) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            commitment,
        }
    }

    fn classify(err: solana_client::client_error::ClientError) -> RpcError {
        let text = err.to_string();
        if text.contains("block height exceeded")
            || text.contains("BlockhashNotFound")
            || text.contains("blockhash not found")
        {
            RpcError::BlockhashExpired
        } else {
            RpcError::Client(text)
        }
    }

    fn is_missing_account(err: &solana_client::client_error::ClientError) -> bool {
        let text = err.to_string();
        text.contains("AccountNotFound") || text.contains("could not find account")
    }
}

#[async_trait]
impl ChainClient for SolanaRpc {
    async fn sol_balance(&self, owner: &Pubkey) -> Result<u64, RpcError> {
        self.client.get_balance(owner).await.map_err(Self::classify)
    }

    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, RpcError> {
        let ata = get_associated_token_address(owner, mint);
        match self.client.get_token_account_balance(&ata).await {
            Ok(ui_amount) => match ui_amount.amount.parse::<u64>() {
                Ok(value) => Ok(value),
                Err(_) => {
                    warn!("unparsable token amount for {}: {}", ata, ui_amount.amount);
                    Ok(0)
                }
            },
            Err(e) if Self::is_missing_account(&e) => Ok(0),
            Err(e) => Err(Self::classify(e)),
        }
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, RpcError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(Self::classify)?;
        Ok(response.value.is_some())
    }

    async fn latest_blockhash(&self) -> Result<Hash, RpcError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(Self::classify)
    }

    async fn send_versioned(&self, tx: &VersionedTransaction) -> Result<Signature, RpcError> {
        self.client.send_transaction(tx).await.map_err(Self::classify)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        recent_blockhash: &Hash,
    ) -> Result<(), RpcError> {
        self.client
            .confirm_transaction_with_spinner(signature, recent_blockhash, self.commitment)
            .await
            .map_err(Self::classify)
    }

    async fn send_and_confirm(&self, tx: &Transaction) -> Result<Signature, RpcError> {
        self.client
            .send_and_confirm_transaction(tx)
            .await
            .map_err(Self::classify)
    }
}

/// SOL balance fetch with the bounded-retry contract: transient failures are
/// retried per `policy`; exhaustion is terminal for the caller. `on_error`
/// surfaces each failed attempt.
pub async fn sol_balance_with_retry(
    chain: &dyn ChainClient,
    owner: &Pubkey,
    policy: &RetryPolicy,
    mut on_error: impl FnMut(u32, &RpcError),
) -> Result<u64, RpcError> {
    policy
        .retry(
            |_| chain.sol_balance(owner),
            RpcError::is_transient,
            |attempt, err| on_error(attempt, err),
        )
        .await
}
