//! Associated token account preparation

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};

use crate::infrastructure::rpc_client::ChainClient;
use crate::shared::errors::RpcError;
use crate::shared::progress::ProgressSender;

/// Make sure `wallet` has an associated token account for `mint`, creating
/// and confirming one when missing. Returns the account address.
pub async fn ensure_token_account(
    chain: &dyn ChainClient,
    wallet: &Keypair,
    mint: &Pubkey,
    progress: &ProgressSender,
) -> Result<Pubkey, RpcError> {
    let ata = get_associated_token_address(&wallet.pubkey(), mint);
    if chain.account_exists(&ata).await? {
        return Ok(ata);
    }

    progress.info(format!("creating token account for {mint}"));
    let instruction = create_associated_token_account(
        &wallet.pubkey(),
        &wallet.pubkey(),
        mint,
        &spl_token::id(),
    );
    let blockhash = chain.latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &[instruction],
        Some(&wallet.pubkey()),
        &[wallet],
        blockhash,
    );
    let signature = chain.send_and_confirm(&tx).await?;
    progress.success(format!("token account created: {signature}"));
    Ok(ata)
}
