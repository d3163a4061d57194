//! Stored record shapes (§3 of the data model).
//!
//! These are value types the core reads from and writes to the document
//! store through the [`crate::store::Store`] trait. Field names mirror the
//! logical schema; derives follow the teacher's `param.rs` convention of
//! deriving `Serialize`/`Deserialize` on anything that crosses a boundary.

use serde::{Deserialize, Serialize};

/// A locally served mailbox. The core only reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub public_key_ref: Option<String>,
}

/// An OpenPGP public key owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: String,
    pub owner: String,
    pub armored_key_material: String,
}

/// One stored attachment, scoped to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: String,
    pub date_created: i64,
    pub date_modified: i64,
    pub name: String,
    pub owner: String,
    pub encoding: String,
    pub data: Vec<u8>,
}

impl File {
    pub const ENCODING: &'static str = "application/pgp-encrypted";
}

/// One entry in a [`Manifest`]'s `parts`.
///
/// `id == "body"` designates the synthesized main body; any other id names
/// an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPart {
    pub id: String,
    pub content_type: String,
    pub filename: Option<String>,
    pub size: u64,
    pub hash: String,
    /// Always [`File::ENCODING`]; carried for parity with [`File::encoding`]
    /// since both describe the same ciphertext shape.
    pub encoding: String,
}

impl ManifestPart {
    pub const BODY_ID: &'static str = "body";
}

/// The decrypted-shape manifest stored alongside the encrypted body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub parts: Vec<ManifestPart>,
}

/// How the input message mapped onto the three cryptographic shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Raw,
    Manifest,
    Pgpmime,
}

/// A stored, per-recipient mail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub date_created: i64,
    pub date_modified: i64,
    pub name: String,
    pub owner: String,
    pub kind: Kind,
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    /// Armored PGP ciphertext.
    pub body: Vec<u8>,
    /// Armored PGP ciphertext, absent for `kind == Pgpmime`.
    pub manifest: Option<Vec<u8>>,
    pub files: Vec<String>,
    pub thread: String,
    pub status: String,
}

impl Email {
    pub const STATUS_RECEIVED: &'static str = "received";
}

/// A per-account grouping of mail keyed by subject hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub date_created: i64,
    pub date_modified: i64,
    pub name: String,
    pub owner: String,
    pub emails: Vec<String>,
    pub labels: Vec<String>,
    pub members: Vec<String>,
    pub is_read: bool,
    pub subject_hash: String,
}

impl Thread {
    pub const DEFAULT_NAME: &'static str = "Encrypted thread";
}

/// A built-in or user label. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub builtin: bool,
}

impl Label {
    pub const INBOX_NAME: &'static str = "Inbox";
}
