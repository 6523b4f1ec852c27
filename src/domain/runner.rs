//! Per-wallet execution sequence
//!
//! Four phases, strictly sequential within one wallet: normalize existing
//! token balances into SOL, make sure token accounts exist, run the
//! randomized swap sequence, then sweep everything back into SOL. Each wallet
//! runs in its own task and failures never cross wallet boundaries.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use tokio::time::sleep;

use crate::config::TradeCfg;
use crate::domain::execution::SwapExecutor;
use crate::domain::schedule;
use crate::domain::tokens::TokenRoster;
use crate::infrastructure::history::HistoryLog;
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::rpc_client::{sol_balance_with_retry, ChainClient};
use crate::infrastructure::token_accounts::ensure_token_account;
use crate::shared::errors::RunnerError;
use crate::shared::progress::ProgressSender;
use crate::shared::types::RunParams;
use crate::shared::utils::format_amount;

/// One wallet's whole run: owns the credential and the injected collaborator
/// handles for the duration of the task.
pub struct WalletRunner {
    keypair: Arc<Keypair>,
    roster: Arc<TokenRoster>,
    params: RunParams,
    trade: TradeCfg,
    chain: Arc<dyn ChainClient>,
    executor: SwapExecutor,
    history: Arc<HistoryLog>,
    progress: ProgressSender,
    policy: RetryPolicy,
}

impl WalletRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        keypair: Arc<Keypair>,
        roster: Arc<TokenRoster>,
        params: RunParams,
        trade: TradeCfg,
        chain: Arc<dyn ChainClient>,
        executor: SwapExecutor,
        history: Arc<HistoryLog>,
        progress: ProgressSender,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            keypair,
            roster,
            params,
            trade,
            chain,
            executor,
            history,
            progress,
            policy,
        }
    }

    pub async fn run(self) -> Result<(), RunnerError> {
        let owner = self.keypair.pubkey();
        self.progress.info("wallet connected");

        let sol_balance = self.fetch_sol_balance(&owner).await.map_err(|reason| {
            RunnerError::BalanceUnavailable {
                attempts: self.policy.max_attempts(),
                reason,
            }
        })?;
        self.progress
            .info(format!("wallet balance: {} SOL", lamports_to_sol(sol_balance)));

        self.normalize_balances(&owner).await;

        let initial_amount = schedule::base_trade_amount(
            sol_balance,
            self.params.base_fraction,
            self.trade.fee_reserve,
        );
        if initial_amount < self.trade.min_trade_lamports {
            self.progress
                .error("not enough SOL for the opening swap, nothing to do");
            return Ok(());
        }

        let skipped = self.prepare_token_accounts().await;
        self.randomized_sequence(&owner, &skipped).await;
        self.consolidate(&owner, &skipped).await;

        self.progress.info("all swaps completed");
        let recorded = self.history.count_for(&owner.to_string()).await;
        self.progress
            .info(format!("total swaps recorded for this wallet: {recorded}"));
        Ok(())
    }

    async fn fetch_sol_balance(&self, owner: &Pubkey) -> Result<u64, String> {
        sol_balance_with_retry(self.chain.as_ref(), owner, &self.policy, |attempt, err| {
            self.progress
                .error(format!("SOL balance attempt {attempt} failed: {err}"));
        })
        .await
        .map_err(|e| e.to_string())
    }

    /// Phase 1: swap any leftover token balances into SOL so the randomized
    /// phase starts from the base asset only. Best effort.
    async fn normalize_balances(&self, owner: &Pubkey) {
        self.progress.info("checking initial token balances...");
        let base = self.roster.base().clone();
        for token in self.roster.non_base() {
            let balance = match self.chain.token_balance(owner, &token.mint).await {
                Ok(balance) => balance,
                Err(e) => {
                    self.progress
                        .warn(format!("balance check for {} failed: {}", token.symbol, e));
                    continue;
                }
            };
            if balance >= self.trade.min_token_amount {
                self.progress.info(format!(
                    "found {} {} left over, swapping into SOL...",
                    format_amount(balance, token.decimals),
                    token.symbol
                ));
                if self
                    .executor
                    .swap(token, &base, balance, self.trade.max_slippage_bps)
                    .await
                    .is_none()
                {
                    self.progress
                        .error(format!("failed to swap {} into SOL", token.symbol));
                }
            } else if balance > 0 {
                self.progress.info(format!(
                    "{} balance too small to swap: {}",
                    token.symbol,
                    format_amount(balance, token.decimals)
                ));
            } else {
                self.progress.info(format!("no {} balance", token.symbol));
            }
        }
    }

    /// Phase 2: make sure a token account exists for every non-base token.
    /// Tokens whose account cannot be created are excluded for the rest of
    /// the run.
    async fn prepare_token_accounts(&self) -> Vec<Pubkey> {
        let mut skipped = Vec::new();
        for token in self.roster.non_base() {
            if let Err(e) =
                ensure_token_account(self.chain.as_ref(), &self.keypair, &token.mint, &self.progress)
                    .await
            {
                self.progress.error(format!(
                    "skipping {} for this run, account creation failed: {}",
                    token.symbol, e
                ));
                skipped.push(token.mint);
            }
        }
        skipped
    }

    /// Phase 3: the randomized swap sequence.
    async fn randomized_sequence(&self, owner: &Pubkey, skipped: &[Pubkey]) {
        let base = self.roster.base().clone();
        let mut rng = StdRng::from_entropy();
        let total = schedule::draw_swap_count(&self.params, &mut rng);
        self.progress
            .info(format!("{total} swaps drawn for this wallet"));
        let steps = schedule::shuffled_steps(total, &mut rng);

        let mut current = base.mint;
        for step in steps {
            sleep(schedule::draw_delay(&self.params, &mut rng)).await;

            let balance = match self.chain.token_balance(owner, &current).await {
                Ok(balance) => balance,
                Err(e) => {
                    self.progress
                        .error(format!("step {step}: balance check failed: {e}"));
                    self.progress
                        .error(format!("step {step} skipped, ending the sequence"));
                    break;
                }
            };

            if balance == 0 {
                // Back at (or stuck in) the base asset: trade out of SOL again.
                let sol = match self.fetch_sol_balance(owner).await {
                    Ok(sol) => sol,
                    Err(e) => {
                        self.progress
                            .error(format!("step {step}: SOL balance unavailable: {e}"));
                        break;
                    }
                };
                let amount = schedule::base_trade_amount(
                    sol,
                    self.params.base_fraction,
                    self.trade.fee_reserve,
                );
                if amount < self.trade.min_trade_lamports {
                    self.progress
                        .error(format!("step {step} skipped: not enough SOL to continue"));
                    break;
                }
                let Some(target) = self.roster.pick_target(skipped, &mut rng) else {
                    self.progress
                        .info(format!("step {step} skipped: no token available to trade into"));
                    break;
                };
                self.progress.info(format!(
                    "step {step}: swapping {:.0}% of SOL -> {}",
                    self.params.base_fraction * 100.0,
                    target.symbol
                ));
                self.executor
                    .swap(&base, target, amount, self.trade.slippage_bps)
                    .await;
                current = target.mint;
            } else {
                let mut exclude = skipped.to_vec();
                exclude.push(current);
                let Some(target) = self.roster.pick_target(&exclude, &mut rng) else {
                    self.progress
                        .info(format!("step {step} skipped: no token available to trade into"));
                    break;
                };
                let Some(input) = self.roster.by_mint(&current) else {
                    break;
                };
                self.progress.info(format!(
                    "step {step}: swapping {} -> {}",
                    input.symbol, target.symbol
                ));
                self.executor
                    .swap(input, target, balance, self.trade.slippage_bps)
                    .await;
                current = target.mint;
            }
        }
    }

    /// Phase 4: sweep every remaining token balance back into SOL, whether or
    /// not the sequence ran to completion.
    async fn consolidate(&self, owner: &Pubkey, skipped: &[Pubkey]) {
        self.progress
            .info("final phase: swapping all tokens back into SOL");
        let base = self.roster.base().clone();
        let mut rng = StdRng::from_entropy();
        for token in self.roster.non_base() {
            if skipped.contains(&token.mint) {
                continue;
            }
            let balance = match self.chain.token_balance(owner, &token.mint).await {
                Ok(balance) => balance,
                Err(e) => {
                    self.progress
                        .warn(format!("balance check for {} failed: {}", token.symbol, e));
                    continue;
                }
            };
            if balance >= self.trade.min_token_amount {
                sleep(schedule::draw_delay(&self.params, &mut rng)).await;
                self.progress.info(format!(
                    "final swap: {} -> SOL ({} {})",
                    token.symbol,
                    format_amount(balance, token.decimals),
                    token.symbol
                ));
                if self
                    .executor
                    .swap(token, &base, balance, self.trade.max_slippage_bps)
                    .await
                    .is_none()
                {
                    self.progress.error(format!(
                        "skipping {}: no route found or balance insufficient",
                        token.symbol
                    ));
                }
            } else if balance > 0 {
                self.progress.info(format!(
                    "{} balance too small to swap: {}",
                    token.symbol,
                    format_amount(balance, token.decimals)
                ));
            } else {
                self.progress.info(format!("no {} to swap", token.symbol));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use base64::Engine as _;
    use solana_sdk::{
        hash::Hash,
        message::Message,
        signature::Signature,
        transaction::{Transaction, VersionedTransaction},
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use crate::infrastructure::jupiter::{RouteQuote, SwapRouter, SwapTransaction};
    use crate::shared::errors::{RouterError, RpcError};
    use crate::shared::progress;

    const FAST: RetryPolicy = RetryPolicy::linear(3, Duration::ZERO);

    /// Chain stub: fixed SOL balance, empty token accounts, every
    /// transaction lands first try.
    struct StubChain {
        sol: u64,
        fail_sol_balance: bool,
    }

    #[async_trait]
    impl ChainClient for StubChain {
        async fn sol_balance(&self, _owner: &Pubkey) -> Result<u64, RpcError> {
            if self.fail_sol_balance {
                Err(RpcError::Client("node unavailable".to_string()))
            } else {
                Ok(self.sol)
            }
        }

        async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<u64, RpcError> {
            Ok(0)
        }

        async fn account_exists(&self, _address: &Pubkey) -> Result<bool, RpcError> {
            Ok(true)
        }

        async fn latest_blockhash(&self) -> Result<Hash, RpcError> {
            Ok(Hash::default())
        }

        async fn send_versioned(
            &self,
            _tx: &VersionedTransaction,
        ) -> Result<Signature, RpcError> {
            Ok(Signature::new_unique())
        }

        async fn confirm(
            &self,
            _signature: &Signature,
            _recent_blockhash: &Hash,
        ) -> Result<(), RpcError> {
            Ok(())
        }

        async fn send_and_confirm(&self, _tx: &Transaction) -> Result<Signature, RpcError> {
            Ok(Signature::new_unique())
        }
    }

    struct StubRouter {
        payload: String,
        quotes: AtomicU32,
    }

    impl StubRouter {
        fn for_payer(payer: &Keypair) -> Self {
            let message = Message::new(&[], Some(&payer.pubkey()));
            let tx = VersionedTransaction::from(Transaction::new_unsigned(message));
            Self {
                payload: BASE64_STANDARD.encode(bincode::serialize(&tx).unwrap()),
                quotes: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SwapRouter for StubRouter {
        async fn quote(
            &self,
            _input_mint: &Pubkey,
            _output_mint: &Pubkey,
            _amount: u64,
            _slippage_bps: u16,
        ) -> Result<RouteQuote, RouterError> {
            self.quotes.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(r#"{"outAmount": "1000"}"#).unwrap())
        }

        async fn swap_transaction(
            &self,
            _quote: &RouteQuote,
            _user: &Pubkey,
        ) -> Result<SwapTransaction, RouterError> {
            Ok(SwapTransaction {
                swap_transaction: self.payload.clone(),
            })
        }
    }

    fn instant_params(swaps: (u32, u32)) -> RunParams {
        RunParams {
            swaps_min: swaps.0,
            swaps_max: swaps.1,
            delay_min_ms: 0,
            delay_max_ms: 0,
            base_fraction: 0.9,
        }
    }

    struct Fixture {
        runner: WalletRunner,
        router: Arc<StubRouter>,
        history: Arc<HistoryLog>,
        _dir: tempfile::TempDir,
    }

    fn fixture(chain: StubChain, params: RunParams) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let keypair = Arc::new(Keypair::new());
        let wallet = keypair.pubkey();
        let chain: Arc<dyn ChainClient> = Arc::new(chain);
        let router = Arc::new(StubRouter::for_payer(&keypair));
        let history = Arc::new(HistoryLog::new(dir.path().join("history.json")));
        let roster = Arc::new(TokenRoster::mainnet_default());
        let (tx, _rx) = progress::channel();
        let progress = ProgressSender::new(wallet, tx);
        let executor = SwapExecutor::new(
            chain.clone(),
            router.clone(),
            history.clone(),
            keypair.clone(),
            TradeCfg::default(),
            FAST,
            progress.clone(),
        );
        let runner = WalletRunner::new(
            keypair,
            roster,
            params,
            TradeCfg::default(),
            chain,
            executor,
            history.clone(),
            progress,
            FAST,
        );
        Fixture {
            runner,
            router,
            history,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_full_run_records_drawn_swap_count() {
        // Every token balance reads 0, so each step trades out of SOL and
        // every swap lands: the history ends up with exactly the drawn count.
        let f = fixture(
            StubChain {
                sol: 2_000_000_000,
                fail_sol_balance: false,
            },
            instant_params((2, 4)),
        );
        f.runner.run().await.unwrap();

        let recorded = f.history.load().await.len();
        assert!((2..=4).contains(&recorded), "recorded {recorded} swaps");
    }

    #[tokio::test]
    async fn test_insufficient_sol_ends_run_without_swaps() {
        // 500k lamports is below the 1M minimum viable trade
        let f = fixture(
            StubChain {
                sol: 500_000,
                fail_sol_balance: false,
            },
            instant_params((3, 3)),
        );
        f.runner.run().await.unwrap();

        assert!(f.history.load().await.is_empty());
        assert_eq!(f.router.quotes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_balance_is_fatal() {
        let f = fixture(
            StubChain {
                sol: 0,
                fail_sol_balance: true,
            },
            instant_params((3, 3)),
        );
        let err = f.runner.run().await.unwrap_err();
        assert!(matches!(err, RunnerError::BalanceUnavailable { attempts: 3, .. }));
        assert!(f.history.load().await.is_empty());
    }
}
