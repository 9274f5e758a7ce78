//! HTTP JSON-RPC implementation of the [`LedgerGateway`].
//!
//! Wraps `reqwest::Client` with the node's base URL and the deployed
//! contract address, and provides one typed method per contract action the
//! coordinator needs. Write actions submit a transaction and then poll its
//! receipt until it reaches a terminal state, so callers observe
//! "confirmed", never merely "submitted".

use std::time::Duration;

use serde::Deserialize;

use ivp_types::{AccountAddress, Candidate, CandidateId, ElectionResult, Timestamp, VotingWindow};

use crate::config::CoordinatorConfig;
use crate::error::ElectionError;
use crate::gateway::{classify_revert, LedgerGateway};

/// JSON-RPC gateway to the deployed election contract.
#[derive(Clone)]
pub struct RpcLedgerGateway {
    http: reqwest::Client,
    node_url: String,
    contract: String,
    confirm_poll: Duration,
}

impl RpcLedgerGateway {
    /// Create a gateway from a coordinator config.
    pub fn new(config: &CoordinatorConfig) -> Result<Self, ElectionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ElectionError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: config.rpc_url.clone(),
            contract: config.contract_address.clone(),
            confirm_poll: Duration::from_millis(config.confirm_poll_ms),
        })
    }

    /// The configured node URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Send a request for `action` and return the `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ElectionError> {
        let mut body = params;
        let obj = body
            .as_object_mut()
            .ok_or_else(|| ElectionError::Config("params must be a JSON object".into()))?;
        obj.insert("action".to_string(), serde_json::json!(action));
        obj.insert("contract".to_string(), serde_json::json!(self.contract));

        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ElectionError::RpcUnavailable {
                reason: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(ElectionError::RpcUnavailable {
                reason: format!("node returned HTTP {}", response.status()),
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ElectionError::RpcUnavailable {
                    reason: format!("invalid JSON response: {e}"),
                })?;

        if let Some(reason) = json.get("error").and_then(|e| e.as_str()) {
            return Err(classify_revert(reason));
        }

        Ok(json.get("result").cloned().unwrap_or(json))
    }

    fn decode<T: serde::de::DeserializeOwned>(
        value: serde_json::Value,
        what: &str,
    ) -> Result<T, ElectionError> {
        serde_json::from_value(value).map_err(|e| ElectionError::RpcUnavailable {
            reason: format!("invalid {what} response: {e}"),
        })
    }

    /// Submit a write action and wait for its transaction to confirm.
    ///
    /// The node answers with a receipt immediately; if the transaction is
    /// still pending we poll `transaction_status` at the configured
    /// interval. No local deadline is imposed: a stalled transaction keeps
    /// being reported as pending rather than assumed failed.
    async fn submit_and_confirm(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<(), ElectionError> {
        let result = self.rpc_call(action, params).await?;
        let mut receipt: TxReceipt = Self::decode(result, action)?;

        loop {
            match receipt.status.as_str() {
                "confirmed" => {
                    tracing::debug!(action, hash = %receipt.hash, "transaction confirmed");
                    return Ok(());
                }
                "reverted" => {
                    let reason = receipt.reason.unwrap_or_else(|| "reverted".to_string());
                    return Err(classify_revert(&reason));
                }
                _ => {
                    tracing::info!(action, hash = %receipt.hash, "transaction pending");
                    tokio::time::sleep(self.confirm_poll).await;
                    let result = self
                        .rpc_call(
                            "transaction_status",
                            serde_json::json!({ "hash": receipt.hash }),
                        )
                        .await?;
                    receipt = Self::decode(result, "transaction_status")?;
                }
            }
        }
    }

    fn parse_address(raw: &str, what: &str) -> Result<AccountAddress, ElectionError> {
        AccountAddress::parse(raw).map_err(|e| ElectionError::RpcUnavailable {
            reason: format!("invalid {what} address in response: {e}"),
        })
    }
}

impl LedgerGateway for RpcLedgerGateway {
    async fn owner(&self) -> Result<AccountAddress, ElectionError> {
        let result = self.rpc_call("owner", serde_json::json!({})).await?;
        let resp: OwnerResult = Self::decode(result, "owner")?;
        Self::parse_address(&resp.owner, "owner")
    }

    async fn candidates_count(&self) -> Result<u32, ElectionError> {
        let result = self
            .rpc_call("candidates_count", serde_json::json!({}))
            .await?;
        let resp: CountResult = Self::decode(result, "candidates_count")?;
        Ok(resp.count)
    }

    async fn candidate(&self, id: CandidateId) -> Result<Candidate, ElectionError> {
        let result = self
            .rpc_call("candidate", serde_json::json!({ "id": id.get() }))
            .await?;
        let resp: CandidateEntry = Self::decode(result, "candidate")?;
        Ok(Candidate {
            id: CandidateId::new(resp.id),
            name: resp.name,
            vote_count: resp.vote_count,
        })
    }

    async fn voting_window(&self) -> Result<Option<VotingWindow>, ElectionError> {
        let result = self
            .rpc_call("voting_window", serde_json::json!({}))
            .await?;
        let resp: WindowResult = Self::decode(result, "voting_window")?;
        match (resp.start, resp.end) {
            (Some(start), Some(end)) => Ok(Some(VotingWindow::new(
                Timestamp::new(start),
                Timestamp::new(end),
            ))),
            _ => Ok(None),
        }
    }

    async fn voting_ended(&self) -> Result<bool, ElectionError> {
        let result = self.rpc_call("voting_ended", serde_json::json!({})).await?;
        let resp: EndedResult = Self::decode(result, "voting_ended")?;
        Ok(resp.ended)
    }

    async fn current_time(&self) -> Result<Timestamp, ElectionError> {
        let result = self.rpc_call("current_time", serde_json::json!({})).await?;
        let resp: TimeResult = Self::decode(result, "current_time")?;
        Ok(Timestamp::new(resp.now))
    }

    async fn has_voted(&self, voter: &AccountAddress) -> Result<bool, ElectionError> {
        let result = self
            .rpc_call("has_voted", serde_json::json!({ "voter": voter.as_str() }))
            .await?;
        let resp: HasVotedResult = Self::decode(result, "has_voted")?;
        Ok(resp.has_voted)
    }

    async fn winner(&self) -> Result<ElectionResult, ElectionError> {
        let result = self.rpc_call("winner", serde_json::json!({})).await?;
        let resp: WinnerResult = Self::decode(result, "winner")?;
        Ok(ElectionResult {
            candidate_id: CandidateId::new(resp.candidate_id),
            candidate_name: resp.candidate_name,
            vote_count: resp.vote_count,
        })
    }

    async fn add_candidate(&self, name: &str) -> Result<(), ElectionError> {
        self.submit_and_confirm("add_candidate", serde_json::json!({ "name": name }))
            .await
    }

    async fn start_voting(&self, window: VotingWindow) -> Result<(), ElectionError> {
        self.submit_and_confirm(
            "start_voting",
            serde_json::json!({
                "start": window.start.as_secs(),
                "end": window.end.as_secs(),
            }),
        )
        .await
    }

    async fn end_voting(&self) -> Result<(), ElectionError> {
        self.submit_and_confirm("end_voting", serde_json::json!({}))
            .await
    }

    async fn vote(&self, id: CandidateId) -> Result<(), ElectionError> {
        self.submit_and_confirm("vote", serde_json::json!({ "id": id.get() }))
            .await
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct OwnerResult {
    owner: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CountResult {
    count: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateEntry {
    id: u32,
    name: String,
    vote_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct WindowResult {
    #[serde(default)]
    start: Option<u64>,
    #[serde(default)]
    end: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct EndedResult {
    ended: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TimeResult {
    now: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct HasVotedResult {
    has_voted: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct WinnerResult {
    candidate_id: u32,
    candidate_name: String,
    vote_count: u64,
}

/// Receipt for a submitted transaction.
#[derive(Debug, Clone, Deserialize)]
struct TxReceipt {
    hash: String,
    /// "pending", "confirmed", or "reverted".
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_builds_from_default_config() {
        let gateway = RpcLedgerGateway::new(&CoordinatorConfig::default()).unwrap();
        assert_eq!(gateway.node_url(), "http://127.0.0.1:8545");
    }

    #[test]
    fn receipt_decodes_without_reason() {
        let receipt: TxReceipt = serde_json::from_value(serde_json::json!({
            "hash": "0xabc",
            "status": "confirmed",
        }))
        .unwrap();
        assert_eq!(receipt.status, "confirmed");
        assert!(receipt.reason.is_none());
    }

    #[test]
    fn window_result_tolerates_unset_fields() {
        let resp: WindowResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(resp.start.is_none());
        assert!(resp.end.is_none());
    }
}
