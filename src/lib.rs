//! Inbound encrypted-mail ingestion core.
//!
//! Accepts an RFC 5322 message from an SMTP front-end, resolves local
//! recipients, classifies the message into one of three cryptographic
//! shapes (`raw`, `manifest`, `pgpmime`), normalizes it into a uniform
//! stored representation, and commits the result per-recipient into a
//! document store while notifying a downstream event bus.
//!
//! The SMTP listener, document-store driver, pub/sub client, OpenPGP
//! primitive implementation, MIME header decoder, and manifest serializer
//! are external collaborators; this crate defines the contracts it needs
//! from them ([`store::Store`], [`events::Publisher`]) and consumes the
//! `mailparse`, `pgp`, and `rfc2047-decoder` crates directly for the
//! pieces that are cheaper to depend on than to re-abstract.

pub mod classify;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod events;
pub mod headers;
pub mod ids;
pub mod manifest;
pub mod mime;
pub mod model;
pub mod pipeline;
pub mod resolver;
pub mod store;
pub mod time;
pub mod transform;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use pipeline::{ingest, Envelope};
