//! Gas-fee estimation utility
//!
//! Sibling of the analysis pipeline, not part of the orchestration core: a
//! read-then-compute flow that resolves the recipient, queries fee
//! parameters and a gas estimate over JSON-RPC, fetches the ETH/USD rate
//! and folds everything into a cost breakdown.

use crate::config::GasConfig;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

const WEI_PER_ETH: f64 = 1e18;
const WEI_PER_GWEI: f64 = 1e9;

/// Computed cost breakdown for a simple value transfer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    /// Resolved recipient address
    pub recipient: String,
    pub gas_units: u64,
    pub gas_price_wei: u128,
    pub priority_fee_wei: u128,
    pub total_cost_eth: f64,
    /// 0.0 when the price feed is unavailable
    pub total_cost_usd: f64,
}

impl GasEstimate {
    pub fn gas_price_gwei(&self) -> f64 {
        self.gas_price_wei as f64 / WEI_PER_GWEI
    }
}

pub struct GasEstimator {
    http: Client,
    config: GasConfig,
}

impl GasEstimator {
    pub fn new(config: GasConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Resolve a `.eth` name to an address, or validate a hex address.
    pub async fn resolve_recipient(&self, recipient: &str) -> Result<String> {
        if recipient.ends_with(".eth") {
            let url = format!(
                "{}/{}",
                self.config.ens_url.trim_end_matches('/'),
                recipient
            );
            let body: Value = self
                .http
                .get(&url)
                .send()
                .await
                .context("Failed to reach ENS resolver")?
                .error_for_status()
                .context("ENS resolver returned an error")?
                .json()
                .await
                .context("Failed to parse ENS resolver response")?;

            return body
                .get("address")
                .and_then(Value::as_str)
                .filter(|addr| is_hex_address(addr))
                .map(str::to_string)
                .with_context(|| format!("ENS name {recipient} did not resolve"));
        }

        if !is_hex_address(recipient) {
            bail!("{recipient} is not a valid address or .eth name");
        }
        Ok(recipient.to_string())
    }

    /// Estimate the gas cost of transferring `amount_eth` to `recipient`.
    pub async fn estimate(&self, recipient: &str, amount_eth: f64) -> Result<GasEstimate> {
        let to = self.resolve_recipient(recipient).await?;
        let value_wei = eth_to_wei(amount_eth)?;

        let gas_units = self
            .rpc_quantity(
                "eth_estimateGas",
                json!([{ "to": to, "value": format!("{:#x}", value_wei) }]),
            )
            .await
            .and_then(quantity_to_u64)?;
        let gas_price_wei = self.rpc_quantity("eth_gasPrice", json!([])).await?;
        let priority_fee_wei = self
            .rpc_quantity("eth_maxPriorityFeePerGas", json!([]))
            .await
            .unwrap_or(0);

        let total_cost_eth = wei_to_eth(gas_units as u128 * gas_price_wei);
        // Price feed failure degrades to a zero fiat figure, not an error.
        let eth_usd = self.fetch_eth_price().await.unwrap_or(0.0);

        Ok(GasEstimate {
            recipient: to,
            gas_units,
            gas_price_wei,
            priority_fee_wei,
            total_cost_eth,
            total_cost_usd: total_cost_eth * eth_usd,
        })
    }

    async fn rpc_quantity(&self, method: &str, params: Value) -> Result<u128> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        debug!("rpc call {method}");

        let reply: Value = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send {method} request"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse {method} response"))?;

        if let Some(err) = reply.get("error") {
            bail!("{method} failed: {err}");
        }
        let hex = reply
            .get("result")
            .and_then(Value::as_str)
            .with_context(|| format!("{method} returned no result"))?;
        parse_quantity(hex)
    }

    async fn fetch_eth_price(&self) -> Result<f64> {
        let body: Value = self
            .http
            .get(&self.config.price_url)
            .send()
            .await
            .context("Failed to reach price feed")?
            .json()
            .await
            .context("Failed to parse price feed response")?;

        body.pointer("/ethereum/usd")
            .and_then(Value::as_f64)
            .context("Price feed response missing ethereum.usd")
    }
}

fn is_hex_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a JSON-RPC hex quantity like "0x5208".
fn parse_quantity(hex: &str) -> Result<u128> {
    let digits = hex.trim_start_matches("0x");
    u128::from_str_radix(digits, 16).with_context(|| format!("invalid hex quantity {hex}"))
}

fn quantity_to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).with_context(|| format!("quantity {value} exceeds u64 range"))
}

fn eth_to_wei(amount: f64) -> Result<u128> {
    if !amount.is_finite() || amount < 0.0 {
        bail!("amount must be a non-negative number");
    }
    Ok((amount * WEI_PER_ETH) as u128)
}

fn wei_to_eth(wei: u128) -> f64 {
    wei as f64 / WEI_PER_ETH
}
