use crate::error::{ConfigError, CoreError, WalletError};
use ethers::signers::{LocalWallet, Signer as _};
use ethers::types::Address;
use std::fmt;

/// A funding account: private key plus its derived address.
#[derive(Clone)]
pub struct Signer {
    wallet: LocalWallet,
}

impl Signer {
    /// `index` is the key's position in the source list, used only for error messages.
    pub fn from_private_key(key: &str, index: usize) -> Result<Self, WalletError> {
        let key_hex = key.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let wallet = key_hex
            .parse::<LocalWallet>()
            .map_err(|_| WalletError::InvalidKeyFormat { index })?;
        Ok(Self { wallet })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}

impl From<LocalWallet> for Signer {
    fn from(wallet: LocalWallet) -> Self {
        Self { wallet }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

/// Ordered, non-empty set of signers. Index `i` of a batch is always served by
/// `signers[i % len]`, so a few keys can cover any batch size.
#[derive(Debug, Clone)]
pub struct SignerSet {
    signers: Vec<Signer>,
}

impl SignerSet {
    pub fn new(signers: Vec<Signer>) -> Result<Self, ConfigError> {
        if signers.is_empty() {
            return Err(ConfigError::EmptySigners);
        }
        Ok(Self { signers })
    }

    pub fn from_private_keys<S: AsRef<str>>(keys: &[S]) -> Result<Self, CoreError> {
        let signers = keys
            .iter()
            .enumerate()
            .map(|(i, key)| Signer::from_private_key(key.as_ref(), i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(signers)?)
    }

    pub fn position_for(&self, index: usize) -> usize {
        index % self.signers.len()
    }

    pub fn signer_for(&self, index: usize) -> &Signer {
        &self.signers[self.position_for(index)]
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(Signer::address).collect()
    }
}
