//! Wallet service client.
//!
//! `WalletClient` wraps a `ServiceClient` with the wallet's keys and
//! lifecycle. Keys are derived from the seed at the start of each operation
//! and dropped at its end. Reading wallet data and handling proposals
//! requires an `Operational` client: open the wallet first, and all copayers
//! must have joined.

use crate::config::WalletConfig;
use crate::encryption::{
    decrypt_if_envelope, encrypt_message, personal_encrypting_key, shared_encrypting_key,
};
use crate::error::WalletError;
use crate::keys::{DerivedKeys, KeyHierarchy};
use crate::repository::WalletRepository;
use crate::secret::build_secret;
use crate::state::WalletState;
use xvg_crypto::{hex_decode, SecretKey};
use xvg_rpc::auth::sign_message;
use xvg_rpc::{
    codes, endpoints, AddressInfo, AddressesOptions, BalanceInfo, CreateTxProposalRequest,
    CreateWalletRequest, HttpTransport, JoinWalletRequest, JoinWalletResponse,
    ProposalOutputRequest, PublishProposalRequest, PushSubscriptionRequest, SendMaxInfo,
    ServiceClient, SignProposalRequest, Transport, TxHistory, TxProposal, UnspentOutput, WalletId,
    WalletInfo, WalletStatus,
};
use xvg_tx::{
    build_unsigned, sign_transaction, Destination, InputSignature, ProposalSpec, TxError,
    UnsignedTransaction, Utxo,
};
use xvg_types::constants::COIN;
use xvg_types::{Address, Network};

/// Optional wallet settings sent on creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletOptions {
    /// Reuse one receive address instead of deriving new ones.
    pub single_address: Option<bool>,
}

pub struct WalletClient<T: Transport> {
    config: WalletConfig,
    keys: KeyHierarchy,
    repository: Box<dyn WalletRepository>,
    service: ServiceClient<T>,
    state: WalletState,
    wallet: Option<WalletInfo>,
}

impl WalletClient<HttpTransport> {
    /// Client over HTTPS with the config's timeout.
    pub fn connect(
        config: WalletConfig,
        keys: KeyHierarchy,
        repository: impl WalletRepository + 'static,
    ) -> Result<Self, WalletError> {
        let transport = HttpTransport::new(config.rpc_config())?;
        Ok(Self::new(config, keys, repository, transport))
    }
}

impl<T: Transport> WalletClient<T> {
    pub fn new(
        config: WalletConfig,
        keys: KeyHierarchy,
        repository: impl WalletRepository + 'static,
        transport: T,
    ) -> Self {
        if keys.network() != config.network {
            log::warn!(
                "key hierarchy is for {} but the client is configured for {}",
                keys.network(),
                config.network
            );
        }
        let service = ServiceClient::new(&config.service_url, transport);
        Self {
            config,
            keys,
            repository: Box::new(repository),
            service,
            state: WalletState::Uninitialized,
            wallet: None,
        }
    }

    pub fn state(&self) -> WalletState {
        self.state
    }

    /// Wallet status from the last successful open.
    pub fn wallet(&self) -> Option<&WalletInfo> {
        self.wallet.as_ref()
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeyHierarchy {
        &self.keys
    }

    pub fn repository(&self) -> &dyn WalletRepository {
        self.repository.as_ref()
    }

    pub fn service_url(&self) -> &str {
        self.service.base_url()
    }

    pub fn transport(&self) -> &T {
        self.service.transport()
    }

    /// Send subsequent requests to another wallet service.
    pub fn reset_service_url(&mut self, url: &str) {
        log::debug!("wallet service url -> {}", url);
        self.config.service_url = url.trim_end_matches('/').to_string();
        self.service.set_base_url(url);
    }

    fn network(&self) -> Network {
        self.config.network
    }

    fn require_operational(&self, operation: &'static str) -> Result<(), WalletError> {
        if self.state.is_operational() {
            Ok(())
        } else {
            Err(WalletError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn set_state(&mut self, state: WalletState) {
        if self.state != state {
            log::debug!("wallet state {} -> {}", self.state, state);
            self.state = state;
        }
    }

    // =========================================================================
    // Wallet lifecycle
    // =========================================================================

    /// Register a new `m`-of-`n` wallet and return its invitation secret.
    /// The wallet id, name and secret are saved to the repository.
    /// `copayer_name` becomes the configured copayer name; the service learns
    /// it when the creator joins.
    pub async fn create_wallet(
        &mut self,
        name: &str,
        copayer_name: &str,
        m: u32,
        n: u32,
        options: WalletOptions,
    ) -> Result<String, WalletError> {
        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();
        let shared = shared_encrypting_key(&keys.wallet);

        let body = CreateWalletRequest {
            name: encrypt_message(name, &shared)?,
            pub_key: keys.wallet_pub_key(),
            m,
            n,
            coin: COIN.to_string(),
            network: self.network().params().service_network.to_string(),
            single_address: options.single_address,
        };
        let WalletId { wallet_id } = self.service.post(&auth, endpoints::WALLETS, &body).await?;
        log::debug!("created wallet {} ({}-of-{})", wallet_id, m, n);

        let secret = build_secret(&wallet_id, &keys.master_wif(), self.network())?;

        let mut record = self.repository.load()?;
        record.wallet_id = Some(wallet_id);
        record.wallet_name = Some(name.to_string());
        record.wallet_secret = Some(secret.clone());
        self.repository.save(&record)?;

        self.config.copayer_name = copayer_name.to_string();
        self.set_state(WalletState::Created);
        Ok(secret)
    }

    /// Join `wallet_id` as a copayer. When the service reports the copayer
    /// as already registered, the wallet is opened instead.
    pub async fn join_wallet(
        &mut self,
        wallet_id: &str,
        copayer_name: &str,
    ) -> Result<(), WalletError> {
        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();
        let shared = shared_encrypting_key(&keys.wallet);
        let personal = personal_encrypting_key(&keys.request);

        let name = encrypt_message(copayer_name, &shared)?;
        let x_pub_key = keys.account_xpub();
        let request_pub_key = auth.request_pub_key();
        let copayer_signature = sign_message(
            &format!("{}|{}|{}", name, x_pub_key, request_pub_key),
            &keys.wallet.secret_key(),
        );
        let custom_data = encrypt_message(
            &format!("{{\"walletPrivKey\": \"{}\"}}", keys.wallet_wif()),
            &personal,
        )?;

        let body = JoinWalletRequest {
            wallet_id: wallet_id.to_string(),
            coin: COIN.to_string(),
            name,
            x_pub_key,
            request_pub_key,
            custom_data,
            copayer_signature,
        };

        let result: Result<JoinWalletResponse, _> = self
            .service
            .post(&auth, &endpoints::copayers(wallet_id), &body)
            .await;
        drop(keys);

        match result {
            Ok(resp) => {
                log::debug!("joined wallet {} as copayer {}", wallet_id, resp.copayer_id);
                let mut record = self.repository.load()?;
                record.wallet_id = Some(wallet_id.to_string());
                self.repository.save(&record)?;
                self.set_state(WalletState::Joined);
                Ok(())
            }
            Err(e) if e.is_service_code(codes::COPAYER_REGISTERED) => {
                log::debug!("copayer already registered in {}, opening", wallet_id);
                self.open_wallet().await.map(|_| ())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch the wallet status. The client becomes `Operational` when the
    /// wallet is complete, `Open` otherwise.
    pub async fn open_wallet(&mut self) -> Result<WalletInfo, WalletError> {
        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();
        let status: WalletStatus = self.service.get(&auth, endpoints::WALLET_STATUS).await?;

        let mut wallet = status.wallet;
        wallet.name = decrypt_if_envelope(&wallet.name, &shared_encrypting_key(&keys.wallet))?;
        log::debug!(
            "opened wallet {} ({}-of-{}, {})",
            wallet.id,
            wallet.m,
            wallet.n,
            wallet.status
        );

        let mut record = self.repository.load()?;
        if record.wallet_id.as_deref() != Some(wallet.id.as_str()) {
            record.wallet_id = Some(wallet.id.clone());
            record.wallet_name = Some(wallet.name.clone());
            self.repository.save(&record)?;
        }

        self.set_state(WalletState::after_open(wallet.is_complete()));
        self.wallet = Some(wallet.clone());
        Ok(wallet)
    }

    // =========================================================================
    // Addresses, balance, history
    // =========================================================================

    /// Ask the service to rescan the wallet's addresses on chain.
    pub async fn scan_addresses(&self) -> Result<(), WalletError> {
        self.require_operational("scan_addresses")?;
        let auth = self.keys.derive_all()?.authenticator();
        let _: serde_json::Value = self
            .service
            .post_empty(&auth, endpoints::ADDRESSES_SCAN)
            .await?;
        Ok(())
    }

    /// Create a receive address, verified against the locally derived key
    /// for the path the service reports.
    pub async fn create_address(&self) -> Result<AddressInfo, WalletError> {
        self.require_operational("create_address")?;
        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();

        let info: AddressInfo = self
            .service
            .post_empty(&auth, endpoints::ADDRESSES_CREATE)
            .await?;
        verify_address(&keys, &info)?;
        Ok(info)
    }

    pub async fn get_main_addresses(
        &self,
        options: AddressesOptions,
    ) -> Result<Vec<AddressInfo>, WalletError> {
        self.require_operational("get_main_addresses")?;
        let auth = self.keys.derive_all()?.authenticator();
        let path = format!("{}{}", endpoints::ADDRESSES, options.query());
        Ok(self.service.get(&auth, &path).await?)
    }

    pub async fn get_balance(&self) -> Result<BalanceInfo, WalletError> {
        self.require_operational("get_balance")?;
        let auth = self.keys.derive_all()?.authenticator();
        Ok(self.service.get(&auth, endpoints::BALANCE).await?)
    }

    /// Transaction history, newest first. Paging applies only when both
    /// `skip` and `limit` are given. Encrypted notes are decrypted; plain
    /// notes are returned as-is.
    pub async fn get_tx_history(
        &self,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<TxHistory>, WalletError> {
        self.require_operational("get_tx_history")?;
        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();

        let mut path = endpoints::TX_HISTORY.to_string();
        if let (Some(skip), Some(limit)) = (skip, limit) {
            path.push_str(&format!("&skip={}&limit={}", skip, limit));
        }

        let mut history: Vec<TxHistory> = self.service.get(&auth, &path).await?;
        let shared = shared_encrypting_key(&keys.wallet);
        for tx in &mut history {
            if let Some(message) = tx.message.as_mut() {
                *message = decrypt_if_envelope(message, &shared)?;
            }
        }
        Ok(history)
    }

    /// Unspent outputs of the wallet, or of `addresses` when non-empty.
    pub async fn get_unspent_outputs(
        &self,
        addresses: &[String],
    ) -> Result<Vec<UnspentOutput>, WalletError> {
        self.require_operational("get_unspent_outputs")?;
        let auth = self.keys.derive_all()?.authenticator();
        let path = if addresses.is_empty() {
            endpoints::UTXOS.to_string()
        } else {
            format!("{}?addresses={}", endpoints::UTXOS, addresses.join(","))
        };
        Ok(self.service.get(&auth, &path).await?)
    }

    pub async fn get_send_max_info(&self) -> Result<SendMaxInfo, WalletError> {
        self.require_operational("get_send_max_info")?;
        let auth = self.keys.derive_all()?.authenticator();
        Ok(self.service.get(&auth, endpoints::SEND_MAX_INFO).await?)
    }

    // =========================================================================
    // Transaction proposals
    // =========================================================================

    /// Create a temporary proposal paying `amount` atomic units to `address`.
    /// A non-empty `message` is encrypted with the shared key.
    pub async fn create_tx_proposal(
        &self,
        address: &str,
        amount: u64,
        message: Option<&str>,
    ) -> Result<TxProposal, WalletError> {
        self.require_operational("create_tx_proposal")?;
        Address::parse(address, self.network()).map_err(|e| WalletError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();
        let message = match message {
            Some(m) if !m.is_empty() => {
                Some(encrypt_message(m, &shared_encrypting_key(&keys.wallet))?)
            }
            _ => None,
        };

        let body = CreateTxProposalRequest {
            outputs: vec![ProposalOutputRequest {
                to_address: address.to_string(),
                amount,
                message: None,
            }],
            pay_pro_url: None,
            message,
        };
        let txp: TxProposal = self.service.post(&auth, endpoints::TX_PROPOSALS, &body).await?;
        log::debug!("created proposal {} (fee {})", txp.id, txp.fee);
        Ok(txp)
    }

    /// Publish a proposal, signing the serialized unsigned transaction with
    /// the request key.
    pub async fn publish_tx_proposal(&self, txp: &TxProposal) -> Result<TxProposal, WalletError> {
        self.require_operational("publish_tx_proposal")?;
        let unsigned = unsigned_transaction(txp, self.network())?;
        let auth = self.keys.derive_all()?.authenticator();

        let body = PublishProposalRequest {
            proposal_signature: auth.sign(&unsigned.tx.to_hex()),
        };
        Ok(self
            .service
            .post(&auth, &endpoints::proposal_publish(&txp.id), &body)
            .await?)
    }

    /// Sign every input of the proposal owned by this wallet.
    pub async fn sign_tx_proposal(&self, txp: &TxProposal) -> Result<TxProposal, WalletError> {
        self.require_operational("sign_tx_proposal")?;
        let unsigned = unsigned_transaction(txp, self.network())?;
        let keys = self.keys.derive_all()?;
        let auth = keys.authenticator();

        let signing_keys = txp
            .inputs
            .iter()
            .map(|input| keys.address_key(&input.path).map(|k| k.secret_key()))
            .collect::<Result<Vec<SecretKey>, _>>()?;
        let signatures = sign_transaction(&unsigned, &signing_keys)?;
        log::debug!(
            "signed {} of {} inputs of proposal {}",
            signatures.len(),
            unsigned.tx.inputs.len(),
            txp.id
        );

        let body = SignProposalRequest {
            signatures: signatures.iter().map(InputSignature::to_hex).collect(),
        };
        Ok(self
            .service
            .post(&auth, &endpoints::proposal_signatures(&txp.id), &body)
            .await?)
    }

    pub async fn broadcast_tx_proposal(&self, txp: &TxProposal) -> Result<TxProposal, WalletError> {
        self.require_operational("broadcast_tx_proposal")?;
        let auth = self.keys.derive_all()?.authenticator();
        Ok(self
            .service
            .post_empty(&auth, &endpoints::proposal_broadcast(&txp.id))
            .await?)
    }

    pub async fn reject_tx_proposal(&self, txp: &TxProposal) -> Result<TxProposal, WalletError> {
        self.require_operational("reject_tx_proposal")?;
        let auth = self.keys.derive_all()?.authenticator();
        Ok(self
            .service
            .post_empty(&auth, &endpoints::proposal_rejections(&txp.id))
            .await?)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Register a device token for push notifications. `platform` is the
    /// service's device type, e.g. `ios` or `android`.
    pub async fn push_notifications_subscribe(
        &self,
        token: &str,
        platform: &str,
    ) -> Result<(), WalletError> {
        let auth = self.keys.derive_all()?.authenticator();
        let body = PushSubscriptionRequest {
            platform: platform.to_string(),
            token: token.to_string(),
        };
        let _: serde_json::Value = self
            .service
            .post(&auth, endpoints::PUSH_SUBSCRIPTIONS, &body)
            .await?;
        Ok(())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn verify_address(keys: &DerivedKeys, info: &AddressInfo) -> Result<(), WalletError> {
    let untrusted = |expected: String| WalletError::UntrustedAddressReceived {
        path: info.path.clone(),
        received: info.address.clone(),
        expected,
    };
    let expected = keys
        .address_for_path(&info.path)
        .map_err(|e| untrusted(format!("nothing ({})", e)))?;
    if expected != info.address {
        return Err(untrusted(expected));
    }
    Ok(())
}

/// Rebuild the unsigned transaction a proposal describes.
pub fn unsigned_transaction(
    txp: &TxProposal,
    network: Network,
) -> Result<UnsignedTransaction, WalletError> {
    let outputs: Vec<Destination> = txp
        .outputs
        .iter()
        .map(|o| Destination {
            to_address: o.to_address.clone(),
            amount: o.amount,
        })
        .collect();
    if let [single] = outputs.as_slice() {
        if single.amount != txp.amount {
            return Err(TxError::Malformed(format!(
                "output amount {} differs from proposal amount {}",
                single.amount, txp.amount
            ))
            .into());
        }
    }

    let proposal = ProposalSpec {
        outputs,
        fee: txp.fee,
        change_address: txp.change_address.as_ref().map(|c| c.address.clone()),
        output_order: txp.output_order.clone(),
        created_on: txp.created_on,
    };
    let utxos = txp
        .inputs
        .iter()
        .map(|input| {
            Ok(Utxo {
                txid: input.txid.clone(),
                vout: input.vout,
                satoshis: input.satoshis,
                script_pubkey: hex_decode(&input.script_pub_key)?,
                path: input.path.clone(),
            })
        })
        .collect::<Result<Vec<Utxo>, WalletError>>()?;

    Ok(build_unsigned(&proposal, &utxos, network)?)
}
