//! Crypto Layer (C8).
//!
//! OpenPGP is an external primitive (`spec.md` §1); this module is the
//! thin contract the core consumes from it, backed by the `pgp` crate
//! (rPGP) the teacher depends on. Grounded in `key.rs`'s `DcKey` trait for
//! key parsing and `e2ee.rs`'s `EncryptHelper` for the encrypt call shape;
//! `keyring.rs`'s generic `Keyring<T>` is reused as the union-keyring type.

use std::io::Cursor;

use pgp::composed::{Deserializable, Message, SignedPublicKey};
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::PublicKeyTrait;

use crate::error::{IngestError, Result};

/// An ordered collection of OpenPGP public-key entities used as encryption
/// recipients. Kept generic, as in the teacher's `keyring.rs`, though the
/// core only ever instantiates it over [`SignedPublicKey`].
#[derive(Clone, Debug, Default)]
pub struct Keyring<T> {
    keys: Vec<T>,
}

impl<T> Keyring<T> {
    pub fn new() -> Self {
        Keyring { keys: Vec::new() }
    }

    pub fn add(&mut self, key: T) {
        self.keys.push(key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[T] {
        &self.keys
    }
}

impl<T> FromIterator<T> for Keyring<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Keyring {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Parse armored key material into an OpenPGP entity (§3 Key, §7
/// `ErrKeyParse`).
pub fn parse_public_key(armored: &str) -> Result<SignedPublicKey> {
    let (key, _headers) = SignedPublicKey::from_armor_single(Cursor::new(armored.as_bytes()))?;
    key.verify()?;
    Ok(key)
}

/// Encrypt `plaintext` to every entity in `keyring`, no signing, and
/// return ASCII-armored ciphertext (§4.7 `encrypt_and_armor`).
///
/// A single ciphertext is produced that any one recipient's private key
/// can decrypt; there is no per-recipient variant.
pub fn encrypt_and_armor(plaintext: &[u8], keyring: &Keyring<SignedPublicKey>) -> Result<Vec<u8>> {
    if keyring.is_empty() {
        return Err(IngestError::Crypto(
            "cannot encrypt to an empty keyring".to_string(),
        ));
    }
    let msg = Message::new_literal_bytes("", plaintext);
    let recipients: Vec<&SignedPublicKey> = keyring.keys().iter().collect();
    let mut rng = rand::thread_rng();
    let encrypted = msg
        .encrypt_to_keys_seipdv1(&mut rng, SymmetricKeyAlgorithm::AES256, &recipients)
        .map_err(|err| IngestError::Crypto(err.to_string()))?;
    let armored = encrypted
        .to_armored_bytes(None.into())
        .map_err(|err| IngestError::Crypto(err.to_string()))?;
    Ok(armored)
}

/// Fingerprint-style identity check used by tests; not load-bearing for
/// production encryption, just confirms a parsed key is usable.
pub fn can_encrypt_to(key: &SignedPublicKey) -> bool {
    key.is_encryption_key()
}
