// src/app.rs
use anyhow::Result;
use colored::Colorize;
use futures::future::join_all;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{Config, TradeCfg};
use crate::domain::execution::SwapExecutor;
use crate::domain::runner::WalletRunner;
use crate::domain::tokens::TokenRoster;
use crate::infrastructure::history::HistoryLog;
use crate::infrastructure::jupiter::{JupiterClient, SwapRouter};
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::rpc_client::{ChainClient, SolanaRpc};
use crate::shared::errors::ConfigError;
use crate::shared::progress::{self, ProgressEvent, ProgressSender, Severity};
use crate::shared::types::RunParams;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub rpc_url: String,
    pub router_url: String,
    pub wallets_path: String,
    pub history_path: String,
    pub trade: TradeCfg,
    pub params: RunParams,
}

impl AppCfg {
    pub fn from_config(cfg: Config, wallets_path: String) -> Self {
        Self {
            rpc_url: cfg.rpc.url,
            router_url: cfg.router.base_url,
            wallets_path,
            history_path: cfg.history.path,
            trade: cfg.trade,
            params: RunParams::default(),
        }
    }
}

/// Read one credential per non-empty line; any malformed line invalidates the
/// whole source.
pub fn load_wallets(path: &str) -> Result<Vec<Keypair>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    let mut wallets = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bytes = bs58::decode(line)
            .into_vec()
            .map_err(|_| ConfigError::InvalidCredential { line: idx + 1 })?;
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|_| ConfigError::InvalidCredential { line: idx + 1 })?;
        wallets.push(keypair);
    }
    Ok(wallets)
}

fn prompt_value<T>(label: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    print!("{label} (default {default}): ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return default;
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return default;
    }
    trimmed.parse().unwrap_or_else(|_| {
        eprintln!("unrecognized value, using default {default}");
        default
    })
}

/// Resolve the four operator-supplied parameters: CLI flags win, missing
/// values are prompted for (unless non-interactive), and a crossed range
/// falls back to the documented default pair.
pub fn collect_run_params(
    swaps_min: Option<u32>,
    swaps_max: Option<u32>,
    delay_min_ms: Option<u64>,
    delay_max_ms: Option<u64>,
    interactive: bool,
) -> RunParams {
    let defaults = RunParams::default();
    let swaps_min = match swaps_min {
        Some(v) => v,
        None if interactive => prompt_value("minimum number of swaps", defaults.swaps_min),
        None => defaults.swaps_min,
    };
    let swaps_max = match swaps_max {
        Some(v) => v,
        None if interactive => prompt_value("maximum number of swaps", defaults.swaps_max),
        None => defaults.swaps_max,
    };
    let delay_min_ms = match delay_min_ms {
        Some(v) => v,
        None if interactive => prompt_value("minimum delay in ms", defaults.delay_min_ms),
        None => defaults.delay_min_ms,
    };
    let delay_max_ms = match delay_max_ms {
        Some(v) => v,
        None if interactive => prompt_value("maximum delay in ms", defaults.delay_max_ms),
        None => defaults.delay_max_ms,
    };

    if swaps_min > swaps_max {
        error!(
            "invalid swap count range, using defaults {}-{}",
            RunParams::DEFAULT_SWAPS.0,
            RunParams::DEFAULT_SWAPS.1
        );
    }
    if delay_min_ms > delay_max_ms {
        error!(
            "invalid delay range, using defaults {}-{} ms",
            RunParams::DEFAULT_DELAY_MS.0,
            RunParams::DEFAULT_DELAY_MS.1
        );
    }

    RunParams {
        swaps_min,
        swaps_max,
        delay_min_ms,
        delay_max_ms,
        base_fraction: RunParams::DEFAULT_BASE_FRACTION,
    }
    .sanitized()
}

fn print_progress(event: &ProgressEvent) {
    let line = format!("{} - {}", event.wallet, event.message);
    match event.severity {
        Severity::Success => println!("{}", line.green()),
        Severity::Error => println!("{}", line.red()),
        Severity::Warn => println!("{}", line.yellow()),
        Severity::Info => println!("{line}"),
    }
}

pub async fn run(cfg: AppCfg) -> Result<()> {
    let wallets = load_wallets(&cfg.wallets_path)?;
    if wallets.is_empty() {
        return Err(ConfigError::NoCredentials {
            path: cfg.wallets_path,
        }
        .into());
    }
    info!("found {} wallets to process", wallets.len());

    let params = cfg.params.sanitized();
    info!(
        "parameters: {}-{} swaps, {}-{} ms delays, {:.0}% of SOL per trade",
        params.swaps_min,
        params.swaps_max,
        params.delay_min_ms,
        params.delay_max_ms,
        params.base_fraction * 100.0
    );

    let roster = Arc::new(TokenRoster::mainnet_default());
    let chain: Arc<dyn ChainClient> = Arc::new(SolanaRpc::new(cfg.rpc_url.clone()));
    let router: Arc<dyn SwapRouter> = Arc::new(JupiterClient::new(cfg.router_url.clone()));
    let history = Arc::new(HistoryLog::new(&cfg.history_path));
    let policy = RetryPolicy::standard();

    let (tx, mut rx) = progress::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_progress(&event);
        }
    });

    let mut tasks = Vec::with_capacity(wallets.len());
    for keypair in wallets {
        let keypair = Arc::new(keypair);
        let pubkey = keypair.pubkey();
        let progress = ProgressSender::new(pubkey, tx.clone());
        let executor = SwapExecutor::new(
            chain.clone(),
            router.clone(),
            history.clone(),
            keypair.clone(),
            cfg.trade.clone(),
            policy,
            progress.clone(),
        );
        let runner = WalletRunner::new(
            keypair,
            roster.clone(),
            params,
            cfg.trade.clone(),
            chain.clone(),
            executor,
            history.clone(),
            progress,
            policy,
        );
        tasks.push((pubkey, tokio::spawn(runner.run())));
    }
    // The printer exits once every runner has dropped its sender.
    drop(tx);

    let (pubkeys, handles): (Vec<Pubkey>, Vec<_>) = tasks.into_iter().unzip();
    let results = join_all(handles).await;
    printer.await?;

    let mut failed = 0usize;
    for (pubkey, result) in pubkeys.into_iter().zip(results) {
        match result {
            Ok(Ok(())) => info!("wallet {pubkey} finished"),
            Ok(Err(e)) => {
                failed += 1;
                error!("wallet {pubkey} ended with a fatal error: {e}");
            }
            Err(e) => {
                failed += 1;
                error!("wallet {pubkey} task failed: {e}");
            }
        }
    }
    if failed > 0 {
        error!("{failed} wallet(s) did not finish cleanly");
    }
    info!("all wallets processed");
    Ok(())
}
