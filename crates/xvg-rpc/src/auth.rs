//! Request authentication.
//!
//! Every call carries the copayer id (`x-identity`) and an ECDSA signature
//! (`x-signature`) by the request key over `"<method>|<uri>|<body>"`, where
//! `uri` is the path relative to the service base URL. GET requests sign the
//! body `{}` and carry a random `r` query parameter so identical requests
//! produce distinct signatures.

use rand::Rng;
use xvg_crypto::{ecdsa_sign, hex_encode, public_key_bytes, sha256, sha256d, SecretKey};

/// Body transmitted and signed for POSTs without arguments.
pub const EMPTY_BODY: &str = "{}";

/// Coin tag prefixed to the xpub when computing the copayer id.
const COPAYER_ID_PREFIX: &str = "xvg";

/// Signs service requests with a request key.
#[derive(Clone)]
pub struct RequestAuthenticator {
    request_key: SecretKey,
    copayer_id: String,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("copayer_id", &self.copayer_id)
            .finish_non_exhaustive()
    }
}

impl RequestAuthenticator {
    /// `account_xpub` is the Base58 extended public key of the account node.
    pub fn new(request_key: SecretKey, account_xpub: &str) -> Self {
        Self {
            request_key,
            copayer_id: copayer_id(account_xpub),
        }
    }

    pub fn copayer_id(&self) -> &str {
        &self.copayer_id
    }

    /// Compressed public key of the request key, hex.
    pub fn request_pub_key(&self) -> String {
        hex_encode(public_key_bytes(&self.request_key))
    }

    /// `x-signature` value for a request.
    pub fn signature(&self, method: &str, uri: &str, body: &str) -> String {
        let message = format!("{}|{}|{}", method.to_lowercase(), uri, body);
        sign_message(&message, &self.request_key)
    }

    /// Sign an arbitrary message with the request key.
    pub fn sign(&self, message: &str) -> String {
        sign_message(message, &self.request_key)
    }
}

/// `hex(sha256("xvg" + xpub))`.
pub fn copayer_id(account_xpub: &str) -> String {
    hex_encode(sha256(format!("{}{}", COPAYER_ID_PREFIX, account_xpub).as_bytes()))
}

/// Hex DER ECDSA signature over `sha256d(message)`.
pub fn sign_message(message: &str, key: &SecretKey) -> String {
    hex_encode(ecdsa_sign(&sha256d(message.as_bytes()), key))
}

/// Append a random `r=<10000..=99999>` query parameter.
pub fn add_url_reference(uri: &str) -> String {
    add_url_reference_with(uri, rand::thread_rng().gen_range(10_000..=99_999))
}

pub fn add_url_reference_with(uri: &str, reference: u32) -> String {
    let sep = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}r={}", uri, sep, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xvg_crypto::ecdsa::parse_public_key;
    use xvg_crypto::{ecdsa_verify, hex_decode};

    fn auth() -> RequestAuthenticator {
        let key = SecretKey::from_slice(&[0x31; 32]).unwrap();
        RequestAuthenticator::new(key, "xpub-test")
    }

    #[test]
    fn test_copayer_id() {
        let id = copayer_id("xpub-test");
        assert_eq!(id.len(), 64);
        assert_eq!(id, hex_encode(sha256(b"xvgxpub-test")));
        assert_eq!(auth().copayer_id(), id);
    }

    #[test]
    fn test_signature_verifies() {
        let a = auth();
        let sig = a.signature("GET", "/v1/balance/?r=12345", "{}");
        let public = parse_public_key(&hex_decode(&a.request_pub_key()).unwrap()).unwrap();
        let hash = sha256d(b"get|/v1/balance/?r=12345|{}");
        assert!(ecdsa_verify(&hex_decode(&sig).unwrap(), &hash, &public));
    }

    #[test]
    fn test_url_reference() {
        assert_eq!(add_url_reference_with("/v1/balance/", 12345), "/v1/balance/?r=12345");
        assert_eq!(
            add_url_reference_with("/v1/txhistory/?includeExtendedInfo=1", 54321),
            "/v1/txhistory/?includeExtendedInfo=1&r=54321"
        );

        for _ in 0..50 {
            let uri = add_url_reference("/v1/utxos/");
            let r: u32 = uri.rsplit("r=").next().unwrap().parse().unwrap();
            assert!((10_000..=99_999).contains(&r));
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let dbg = format!("{:?}", auth());
        assert!(dbg.contains("copayer_id"));
        assert!(!dbg.contains("request_key"));
    }
}
