//! Account identity key pairs.
//!
//! An identity is a long-lived X25519 key pair. The public half is published
//! to the ledger once; the secret half only ever exists in memory or sealed
//! in the passphrase vault.

use crate::crypto::{PublicKey, SecretKey};

/// An X25519 identity key pair.
#[derive(Debug)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::generate())
    }

    /// Rebuild a key pair from its secret half.
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// The secret key.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// The public key.
    pub fn public(&self) -> PublicKey {
        self.public
    }

    /// Whether a published key belongs to this pair.
    pub fn matches(&self, published: &PublicKey) -> bool {
        self.public == *published
    }
}

/// Derive the public key for a secret key. Pure and deterministic.
pub fn derive_public_key(secret: &SecretKey) -> PublicKey {
    secret.public_key()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_consistent() {
        let pair = KeyPair::generate();
        assert_eq!(pair.public(), derive_public_key(pair.secret()));
    }

    #[test]
    fn test_distinct_pairs() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.public(), b.public());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let secret = SecretKey::from_bytes([7u8; 32]);
        assert_eq!(derive_public_key(&secret), derive_public_key(&secret));

        let pair = KeyPair::from_secret(SecretKey::from_bytes([7u8; 32]));
        assert!(pair.matches(&derive_public_key(&secret)));
        assert!(!pair.matches(&PublicKey::from_bytes([0u8; 32])));
    }
}
