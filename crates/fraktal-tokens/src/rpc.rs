//! JSON-RPC `eth_call` backend for the call gateway.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::address::Address;
use crate::call::ContractReader;
use crate::error::CallError;

/// Reads contracts through a node's `eth_call` at the latest block.
///
/// One endpoint serves one chain; calls for any other chain fail without
/// touching the network.
pub struct RpcReader {
    client: reqwest::Client,
    chain_id: u64,
    url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

impl RpcReader {
    pub fn new(chain_id: u64, url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            chain_id,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ContractReader for RpcReader {
    async fn call(
        &self,
        chain_id: u64,
        to: &Address,
        calldata: &[u8],
    ) -> Result<Vec<u8>, CallError> {
        if chain_id != self.chain_id {
            return Err(CallError::Transport(format!(
                "endpoint serves chain {}, not {chain_id}",
                self.chain_id
            )));
        }

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": to.to_checksum(), "data": format!("0x{}", hex::encode(calldata)) },
                "latest"
            ],
        });

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(CallError::Reverted(error.message));
        }
        let result = response
            .result
            .ok_or_else(|| CallError::Transport("response has no result".to_string()))?;
        let data = hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| CallError::Transport(format!("invalid hex result: {e}")))?;

        // Calls to addresses without code succeed with empty data.
        if data.is_empty() {
            return Err(CallError::Reverted("empty return data".to_string()));
        }
        Ok(data)
    }
}
