use anyhow::Result;
use clap::Parser;

use volbot::app::{self, AppCfg};
use volbot::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Randomized multi-wallet volume bot for Jupiter swaps on Solana")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// RPC endpoint URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Swap-router API base URL (overrides config)
    #[arg(long)]
    router_url: Option<String>,

    /// Newline-delimited wallet secrets, one per line
    #[arg(long, default_value = "wallets.txt")]
    wallets: String,

    /// Swap history file (overrides config)
    #[arg(long)]
    history: Option<String>,

    /// Minimum number of swaps per wallet
    #[arg(long)]
    swaps_min: Option<u32>,

    /// Maximum number of swaps per wallet
    #[arg(long)]
    swaps_max: Option<u32>,

    /// Minimum delay between swaps in milliseconds
    #[arg(long)]
    delay_min_ms: Option<u64>,

    /// Maximum delay between swaps in milliseconds
    #[arg(long)]
    delay_max_ms: Option<u64>,

    /// Skip the interactive prompts; missing parameters use their defaults
    #[arg(long)]
    no_prompt: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let base_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // CLI args take priority over the config file
    let mut app_cfg = AppCfg::from_config(base_config, args.wallets);
    if let Some(rpc_url) = args.rpc_url {
        app_cfg.rpc_url = rpc_url;
    }
    if let Some(router_url) = args.router_url {
        app_cfg.router_url = router_url;
    }
    if let Some(history) = args.history {
        app_cfg.history_path = history;
    }

    app_cfg.params = app::collect_run_params(
        args.swaps_min,
        args.swaps_max,
        args.delay_min_ms,
        args.delay_max_ms,
        !args.no_prompt,
    );

    app::run(app_cfg).await
}
