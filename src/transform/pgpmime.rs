//! PGP/MIME Extractor (C7).

use std::collections::HashMap;

use crate::error::{IngestError, Result};
use crate::mime::MimePart;
use crate::model::Kind;
use crate::transform::NormalizedMessage;

/// Extract the single encrypted body from an already PGP/MIME-wrapped
/// message (§4.6).
pub fn extract(root: &MimePart) -> Result<NormalizedMessage> {
    let child = root
        .children
        .iter()
        .find(|c| c.media_type.contains("application/pgp-encrypted"))
        .ok_or_else(|| IngestError::MediaType("no application/pgp-encrypted part".to_string()))?;

    let subject = child.header("Subject").unwrap_or_default().to_string();

    Ok(NormalizedMessage {
        kind: Kind::Pgpmime,
        subject,
        body_armored: child.body.clone(),
        manifest_armored: None,
        manifest: None,
        files_by_recipient: HashMap::new(),
    })
}
