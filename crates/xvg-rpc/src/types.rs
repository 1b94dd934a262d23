//! Request and response bodies of the wallet service REST API.
//!
//! Field names follow the service's camelCase JSON. Response structs keep
//! unknown fields in `extra` so newer service versions decode cleanly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Wallets
// =============================================================================

/// Body of `POST /v2/wallets/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    /// Wallet name, encrypted with the shared key.
    pub name: String,
    /// Compressed wallet public key, hex.
    pub pub_key: String,
    pub m: u32,
    pub n: u32,
    pub coin: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_address: Option<bool>,
}

/// Response of `POST /v2/wallets/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletId {
    pub wallet_id: String,
}

/// Body of `POST /v2/wallets/{id}/copayers/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWalletRequest {
    pub wallet_id: String,
    pub coin: String,
    /// Copayer name, encrypted with the shared key.
    pub name: String,
    pub x_pub_key: String,
    pub request_pub_key: String,
    /// Private copayer data, encrypted with the personal key.
    pub custom_data: String,
    pub copayer_signature: String,
}

/// Response of `POST /v2/wallets/{id}/copayers/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWalletResponse {
    #[serde(default)]
    pub copayer_id: String,
    #[serde(default)]
    pub wallet: Option<WalletInfo>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Response of `GET /v2/wallets/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatus {
    pub wallet: WalletInfo,
    #[serde(default)]
    pub balance: Option<BalanceInfo>,
    #[serde(default)]
    pub pending_txps: Vec<TxProposal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub id: String,
    /// Wallet name; an encrypted envelope until decrypted by the client.
    #[serde(default)]
    pub name: String,
    pub m: u32,
    pub n: u32,
    /// `pending` until all copayers joined, then `complete`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub copayers: Vec<Copayer>,
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub single_address: bool,
    #[serde(default)]
    pub created_on: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl WalletInfo {
    pub fn is_complete(&self) -> bool {
        self.status == "complete"
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Copayer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x_pub_key: String,
    #[serde(default)]
    pub created_on: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// =============================================================================
// Addresses, balance, history
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub address: String,
    /// Derivation path relative to the account key, e.g. `m/0/5`.
    pub path: String,
    #[serde(default)]
    pub created_on: u64,
    #[serde(default)]
    pub wallet_id: String,
    #[serde(default)]
    pub is_change: bool,
    #[serde(default)]
    pub public_keys: Vec<String>,
}

/// Query options of `GET /v1/addresses/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressesOptions {
    pub limit: Option<u32>,
    pub reverse: bool,
}

impl AddressesOptions {
    /// Query string, empty or starting with `?`.
    pub fn query(&self) -> String {
        let mut args = Vec::new();
        if let Some(limit) = self.limit {
            args.push(format!("limit={}", limit));
        }
        if self.reverse {
            args.push("reverse=1".to_string());
        }
        if args.is_empty() {
            String::new()
        } else {
            format!("?{}", args.join("&"))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInfo {
    #[serde(default)]
    pub total_amount: u64,
    #[serde(default)]
    pub locked_amount: u64,
    #[serde(default)]
    pub total_confirmed_amount: u64,
    #[serde(default)]
    pub locked_confirmed_amount: u64,
    #[serde(default)]
    pub available_amount: u64,
    #[serde(default)]
    pub available_confirmed_amount: u64,
    #[serde(default)]
    pub by_address: Vec<AddressBalance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalance {
    pub address: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub amount: u64,
}

/// One entry of `GET /v1/txhistory/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxHistory {
    pub txid: String,
    /// `sent`, `received` or `moved`.
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub fees: u64,
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub address_to: Option<String>,
    /// Proposal note; an encrypted envelope as sent by the service.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub outputs: Vec<HistoryOutput>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOutput {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub script_pub_key: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub public_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMaxInfo {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub fee_per_kb: u64,
    #[serde(default)]
    pub inputs: Vec<UnspentOutput>,
    #[serde(default)]
    pub utxos_below_fee: u64,
    #[serde(default)]
    pub amount_below_fee: u64,
    #[serde(default)]
    pub utxos_above_max_size: u64,
    #[serde(default)]
    pub amount_above_max_size: u64,
}

// =============================================================================
// Transaction proposals
// =============================================================================

/// Body of `POST /v2/txproposals/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTxProposalRequest {
    pub outputs: Vec<ProposalOutputRequest>,
    pub pay_pro_url: Option<String>,
    /// Note, encrypted with the shared key.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalOutputRequest {
    pub to_address: String,
    pub amount: u64,
    pub message: Option<String>,
}

/// A transaction proposal as returned by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxProposal {
    pub id: String,
    #[serde(default)]
    pub wallet_id: String,
    #[serde(default)]
    pub creator_id: String,
    /// Unix seconds; doubles as the transaction timestamp.
    pub created_on: u32,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub status: String,
    pub amount: u64,
    pub fee: u64,
    #[serde(default)]
    pub fee_per_kb: u64,
    #[serde(default)]
    pub change_address: Option<ChangeAddress>,
    #[serde(default)]
    pub outputs: Vec<TxProposalOutput>,
    #[serde(default)]
    pub inputs: Vec<TxProposalInput>,
    #[serde(default)]
    pub output_order: Vec<usize>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub required_signatures: u32,
    #[serde(default)]
    pub required_rejections: u32,
    #[serde(default)]
    pub actions: Vec<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAddress {
    pub address: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxProposalOutput {
    pub to_address: String,
    pub amount: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub encrypted_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxProposalInput {
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    /// Locking script of the spent output, hex.
    pub script_pub_key: String,
    #[serde(default)]
    pub address: String,
    /// Derivation path relative to the account key.
    pub path: String,
    #[serde(default)]
    pub public_keys: Vec<String>,
}

/// Body of `POST /v1/txproposals/{id}/publish/`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishProposalRequest {
    pub proposal_signature: String,
}

/// Body of `POST /v1/txproposals/{id}/signatures/`.
#[derive(Debug, Clone, Serialize)]
pub struct SignProposalRequest {
    pub signatures: Vec<String>,
}

// =============================================================================
// Push notifications
// =============================================================================

/// Body of `POST /v1/pushnotifications/subscriptions/`.
#[derive(Debug, Clone, Serialize)]
pub struct PushSubscriptionRequest {
    /// Platform tag, e.g. `ios` or `android`.
    #[serde(rename = "type")]
    pub platform: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_status_deserialize() {
        let json = r#"{
            "wallet": {
                "id": "8f8b6b1c-4e3a-4b7e-9a57-2f5b1d2c3e4f",
                "name": "{\"iv\":\"abc\",\"ct\":\"def\"}",
                "m": 1, "n": 1,
                "status": "complete",
                "copayers": [{"id": "c1", "name": "ios-copayer", "xPubKey": "xpub"}],
                "coin": "xvg", "network": "livenet", "singleAddress": false,
                "scanStatus": null
            },
            "balance": {"totalAmount": 1500000, "availableAmount": 1000000},
            "pendingTxps": []
        }"#;
        let status: WalletStatus = serde_json::from_str(json).unwrap();
        assert!(status.wallet.is_complete());
        assert_eq!(status.wallet.copayers[0].x_pub_key, "xpub");
        assert_eq!(status.balance.unwrap().total_amount, 1_500_000);
        assert!(status.wallet.extra.contains_key("scanStatus"));
    }

    #[test]
    fn test_tx_proposal_deserialize() {
        let json = r#"{
            "id": "txp1", "walletId": "w", "creatorId": "c",
            "createdOn": 1560000000, "status": "temporary",
            "amount": 1000000, "fee": 10000,
            "changeAddress": {"address": "DChange", "path": "m/1/0"},
            "outputs": [{"toAddress": "DDest", "amount": 1000000, "message": null}],
            "inputs": [{"txid": "aa", "vout": 1, "satoshis": 2000000,
                        "scriptPubKey": "76a914", "address": "DIn", "path": "m/0/3"}],
            "outputOrder": [1, 0],
            "message": null
        }"#;
        let txp: TxProposal = serde_json::from_str(json).unwrap();
        assert_eq!(txp.created_on, 1_560_000_000);
        assert_eq!(txp.output_order, vec![1, 0]);
        assert_eq!(txp.inputs[0].path, "m/0/3");
        assert_eq!(txp.change_address.unwrap().path, "m/1/0");
        assert!(txp.message.is_none());
    }

    #[test]
    fn test_create_tx_proposal_serialize_keeps_nulls() {
        let req = CreateTxProposalRequest {
            outputs: vec![ProposalOutputRequest {
                to_address: "DDest".into(),
                amount: 5,
                message: None,
            }],
            pay_pro_url: None,
            message: None,
        };
        let v: Value = serde_json::to_value(&req).unwrap();
        assert_eq!(v["outputs"][0]["toAddress"], "DDest");
        assert!(v["outputs"][0]["message"].is_null());
        assert!(v.as_object().unwrap().contains_key("payProUrl"));
        assert!(v["message"].is_null());
    }

    #[test]
    fn test_create_wallet_serialize() {
        let req = CreateWalletRequest {
            name: "enc".into(),
            pub_key: "02ab".into(),
            m: 1,
            n: 1,
            coin: "xvg".into(),
            network: "livenet".into(),
            single_address: None,
        };
        let v: Value = serde_json::to_value(&req).unwrap();
        assert_eq!(v["pubKey"], "02ab");
        assert!(v.get("singleAddress").is_none());

        let push = PushSubscriptionRequest {
            platform: "ios".into(),
            token: "t".into(),
        };
        assert_eq!(serde_json::to_value(&push).unwrap()["type"], "ios");
    }

    #[test]
    fn test_addresses_query() {
        assert_eq!(AddressesOptions::default().query(), "");
        assert_eq!(
            AddressesOptions { limit: Some(5), reverse: false }.query(),
            "?limit=5"
        );
        assert_eq!(
            AddressesOptions { limit: Some(1), reverse: true }.query(),
            "?limit=1&reverse=1"
        );
        assert_eq!(
            AddressesOptions { limit: None, reverse: true }.query(),
            "?reverse=1"
        );
    }
}
