//! Normalizers: the three per-classification extractors (C5/C6/C7) that
//! turn a [`crate::mime::MimePart`] tree into one uniform shape for
//! persistence.

pub mod manifest_extract;
pub mod pgpmime;
pub mod raw;

use std::collections::HashMap;

use crate::model::{File, Kind, Manifest};

/// The unified output of whichever extractor ran, consumed by the
/// persistence/fan-out stage (C9).
pub struct NormalizedMessage {
    pub kind: Kind,
    /// Per-kind subject value stored as `Email.name` (§4.5–§4.7; decoded
    /// for `raw`, literal for `manifest`, the part's raw header for
    /// `pgpmime` — deliberately distinct from the subject-hash input,
    /// which the persistence layer recomputes from the root message).
    pub subject: String,
    /// Armored ciphertext bytes stored as `Email.body`.
    pub body_armored: Vec<u8>,
    /// Armored manifest bytes stored as `Email.manifest`, absent for
    /// `kind == Pgpmime`.
    pub manifest_armored: Option<Vec<u8>>,
    /// The in-memory manifest, kept around for tests/property checks.
    pub manifest: Option<Manifest>,
    /// Attachment file rows keyed by recipient account id.
    pub files_by_recipient: HashMap<String, Vec<File>>,
}
