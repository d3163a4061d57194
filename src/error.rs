//! Crate-wide error type.
//!
//! One variant per error kind an envelope can fail on. Every variant is
//! fatal to the current envelope (see propagation policy in the top-level
//! module docs): nothing here is caught and retried internally.

use thiserror::Error;

/// All ways an envelope can fail to be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("recipient {0:?} is not a valid addr-spec")]
    InvalidRecipient(String),

    #[error("no recipient belongs to a locally served domain")]
    NoLocalDomain,

    #[error("recipient {0:?} has no matching account")]
    UnknownRecipient(String),

    #[error("account {0} has no usable public key")]
    NoKey(String),

    #[error("account {0} has no Inbox label")]
    NoInbox(String),

    #[error("failed to parse OpenPGP key: {0}")]
    KeyParse(#[from] pgp::errors::Error),

    #[error("failed to parse MIME message: {0}")]
    Parse(#[from] mailparse::MailParseError),

    #[error("malformed content-type or content-disposition: {0}")]
    MediaType(String),

    #[error("manifest-classified message is missing a manifest or body part")]
    BadManifestShape,

    #[error("manifest-classified message is missing its encrypted body part")]
    BadManifestBody,

    #[error("failed to decode encoded-word header: {0}")]
    SubjectDecode(String),

    #[error("encryption failed: {0}")]
    Crypto(String),

    #[error("document store error: {0}")]
    Store(String),

    #[error("pub/sub publish error: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
