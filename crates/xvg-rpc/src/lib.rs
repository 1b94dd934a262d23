//! Verge wallet service client library.
//!
//! Provides the HTTP transport seam, request authentication (copayer
//! identity + per-request ECDSA signature), typed request/response structs
//! for the service's REST endpoints, and a `ServiceClient` that ties them
//! together. Wallet semantics (keys, encryption, state) live in xvg-wallet.
//!
//! # Example
//!
//! ```ignore
//! use xvg_rpc::{HttpTransport, RequestAuthenticator, RpcConfig, ServiceClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = HttpTransport::new(RpcConfig::default()).unwrap();
//!     let service = ServiceClient::new(xvg_rpc::DEFAULT_SERVICE_URL, transport);
//!     let auth = RequestAuthenticator::new(request_key, &account_xpub);
//!     let balance: xvg_rpc::BalanceInfo = service.get(&auth, "/v1/balance/").await.unwrap();
//!     println!("Balance: {}", balance.total_amount);
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::RequestAuthenticator;
pub use client::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RpcConfig, ServiceClient, Transport};
pub use error::{RpcError, ServiceError};
pub use types::*;

/// Default Verge wallet service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "https://vws2.swenvanzanten.com/vws/api";

/// Service endpoint paths.
pub mod endpoints {
    pub const WALLETS: &str = "/v2/wallets/";
    pub const WALLET_STATUS: &str = "/v2/wallets/?includeExtendedInfo=1";
    pub const ADDRESSES_SCAN: &str = "/v1/addresses/scan";
    pub const ADDRESSES_CREATE: &str = "/v3/addresses/";
    pub const ADDRESSES: &str = "/v1/addresses/";
    pub const BALANCE: &str = "/v1/balance/";
    pub const TX_HISTORY: &str = "/v1/txhistory/?includeExtendedInfo=1";
    pub const UTXOS: &str = "/v1/utxos/";
    pub const SEND_MAX_INFO: &str = "/v1/sendmaxinfo/";
    pub const TX_PROPOSALS: &str = "/v2/txproposals/";
    pub const PUSH_SUBSCRIPTIONS: &str = "/v1/pushnotifications/subscriptions/";

    pub fn copayers(wallet_id: &str) -> String {
        format!("/v2/wallets/{}/copayers/", wallet_id)
    }

    pub fn proposal_publish(id: &str) -> String {
        format!("/v1/txproposals/{}/publish/", id)
    }

    pub fn proposal_signatures(id: &str) -> String {
        format!("/v1/txproposals/{}/signatures/", id)
    }

    pub fn proposal_broadcast(id: &str) -> String {
        format!("/v1/txproposals/{}/broadcast/", id)
    }

    pub fn proposal_rejections(id: &str) -> String {
        format!("/v1/txproposals/{}/rejections/", id)
    }
}

/// Service error codes the client reacts to.
pub mod codes {
    pub const COPAYER_REGISTERED: &str = "COPAYER_REGISTERED";
}
