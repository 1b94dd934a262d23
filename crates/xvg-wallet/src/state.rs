//! Client lifecycle.

use serde::{Deserialize, Serialize};

/// Where the client is in the wallet lifecycle. Only an `Operational`
/// client (wallet opened and all copayers joined) may read wallet data or
/// handle proposals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletState {
    #[default]
    Uninitialized,
    Created,
    Joined,
    Open,
    Operational,
}

impl WalletState {
    pub fn is_operational(&self) -> bool {
        matches!(self, WalletState::Operational)
    }

    /// State after a successful open, given the service's wallet status.
    pub fn after_open(wallet_complete: bool) -> Self {
        if wallet_complete {
            WalletState::Operational
        } else {
            WalletState::Open
        }
    }
}

impl std::fmt::Display for WalletState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WalletState::Uninitialized => "uninitialized",
            WalletState::Created => "created",
            WalletState::Joined => "joined",
            WalletState::Open => "open",
            WalletState::Operational => "operational",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_open() {
        assert_eq!(WalletState::after_open(true), WalletState::Operational);
        assert_eq!(WalletState::after_open(false), WalletState::Open);
        assert!(!WalletState::default().is_operational());
        assert_eq!(WalletState::Joined.to_string(), "joined");
    }
}
