//! Jupiter swap-router API client
//!
//! Two calls: GET /quote for a route, POST /swap to turn a quote into a
//! base64-serialized transaction ready for signing. The full quote body is
//! kept opaque (`serde_json::Value`) and echoed back in the swap request,
//! matching the API contract.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::shared::errors::RouterError;

/// A quoted route. `out_amount` is surfaced for logging; everything else is
/// carried verbatim for the swap request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteQuote {
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(flatten)]
    pub rest: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequest<'a> {
    #[serde(rename = "quoteResponse")]
    quote_response: &'a RouteQuote,
    user_public_key: String,
    wrap_and_unwrap_sol: bool,
}

/// Response to POST /swap: the serialized transaction, base64 encoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub swap_transaction: String,
}

/// Swap-routing collaborator, injected per execution unit.
#[async_trait]
pub trait SwapRouter: Send + Sync {
    async fn quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<RouteQuote, RouterError>;

    async fn swap_transaction(
        &self,
        quote: &RouteQuote,
        user: &Pubkey,
    ) -> Result<SwapTransaction, RouterError>;
}

/// HTTP client for the Jupiter v6 endpoints.
pub struct JupiterClient {
    http: Client,
    base_url: String,
}

impl JupiterClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RouterError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        Err(RouterError::Api { status, body })
    }
}

#[async_trait]
impl SwapRouter for JupiterClient {
    async fn quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<RouteQuote, RouterError> {
        let params = [
            ("inputMint", input_mint.to_string()),
            ("outputMint", output_mint.to_string()),
            ("amount", amount.to_string()),
            ("slippageBps", slippage_bps.to_string()),
        ];
        let response = self
            .http
            .get(format!("{}/quote", self.base_url))
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<RouteQuote>().await?)
    }

    async fn swap_transaction(
        &self,
        quote: &RouteQuote,
        user: &Pubkey,
    ) -> Result<SwapTransaction, RouterError> {
        let payload = SwapRequest {
            quote_response: quote,
            user_public_key: user.to_string(),
            wrap_and_unwrap_sol: true,
        };
        let response = self
            .http
            .post(format!("{}/swap", self.base_url))
            .json(&payload)
            .send()
            .await?;
        Ok(Self::check(response)
            .await?
            .json::<SwapTransaction>()
            .await?)
    }
}
