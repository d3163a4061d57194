//! Classifier (C4).

use crate::mime::MimePart;
use crate::model::Kind;

/// Decide the cryptographic shape of a parsed message (§4.3).
pub fn classify(root: &MimePart) -> Kind {
    if root.media_type.starts_with("multipart/encrypted") {
        return Kind::Pgpmime;
    }
    if root.media_type.starts_with("multipart/mixed")
        && root.children.len() >= 2
        && root
            .children
            .iter()
            .any(|c| c.media_type.starts_with("application/x-pgp-manifest"))
    {
        return Kind::Manifest;
    }
    Kind::Raw
}
