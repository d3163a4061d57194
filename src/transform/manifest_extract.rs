//! Manifest Extractor (C6).
//!
//! Pulls the manifest, body, and attachments out of an already
//! manifest-shaped message (§4.5).

use std::collections::HashMap;

use crate::error::{IngestError, Result};
use crate::ids;
use crate::mime::MimePart;
use crate::model::{File, Kind};
use crate::resolver::ResolvedRecipient;
use crate::time::now_ts;
use crate::transform::NormalizedMessage;

const LITERAL_SUBJECT: &str = "Encrypted email";

/// Extract manifest/body/attachments from a manifest-classified message.
pub fn extract(root: &MimePart, recipients: &[ResolvedRecipient]) -> Result<NormalizedMessage> {
    let manifest_index = root
        .children
        .iter()
        .position(|c| c.media_type.starts_with("application/x-pgp-manifest"));
    let body_index = root
        .children
        .iter()
        .position(|c| c.media_type.starts_with("multipart/alternative"));

    let (manifest_index, body_index) = match (manifest_index, body_index) {
        (Some(m), Some(b)) => (m, b),
        _ => return Err(IngestError::BadManifestShape),
    };

    let manifest_child = &root.children[manifest_index];
    let body_child = &root.children[body_index];

    let body_bytes = body_child
        .children
        .iter()
        .find(|gc| gc.media_type.starts_with("application/pgp-encrypted"))
        .map(|gc| gc.body.clone())
        .ok_or(IngestError::BadManifestBody)?;

    let mut files_by_recipient: HashMap<String, Vec<File>> = HashMap::new();
    for (idx, sibling) in root.children.iter().enumerate() {
        if idx == manifest_index || idx == body_index {
            continue;
        }
        let filename = match &sibling.disposition {
            crate::mime::Disposition::Attachment { filename } => filename.clone(),
            _ => None,
        }
        .unwrap_or_default();

        for recipient in recipients {
            let file = File {
                id: ids::generate_id(16),
                date_created: now_ts(),
                date_modified: now_ts(),
                name: filename.clone(),
                owner: recipient.account.id.clone(),
                encoding: File::ENCODING.to_string(),
                data: sibling.body.clone(),
            };
            files_by_recipient
                .entry(recipient.account.id.clone())
                .or_default()
                .push(file);
        }
    }

    Ok(NormalizedMessage {
        kind: Kind::Manifest,
        subject: LITERAL_SUBJECT.to_string(),
        body_armored: body_bytes,
        manifest_armored: Some(manifest_child.body.clone()),
        manifest: None,
        files_by_recipient,
    })
}
