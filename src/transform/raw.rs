//! Raw Transformer (C5).
//!
//! Flattens a plaintext MIME tree into one synthesized body plus an
//! ordered attachment list, then builds and encrypts a manifest (§4.4).

use std::collections::HashMap;

use base64::Engine;

use crate::config::IngestConfig;
use crate::crypto::{self, Keyring};
use crate::error::Result;
use crate::headers;
use crate::ids;
use crate::manifest::ManifestCodec;
use crate::mime::{Disposition, MimePart};
use crate::model::{File, Kind, Manifest, ManifestPart};
use crate::resolver::ResolvedRecipient;
use crate::time::now_ts;
use crate::transform::NormalizedMessage;

fn is_recognized_alt_type(media_type: &str) -> bool {
    media_type.starts_with("application/pgp-encrypted")
        || media_type.starts_with("text/html")
        || media_type.starts_with("text/plain")
}

struct State<'a> {
    body_type: String,
    body_text: String,
    manifest_parts: Vec<ManifestPart>,
    files_by_recipient: HashMap<String, Vec<File>>,
    recipients: &'a [ResolvedRecipient],
    keyring: &'a Keyring<pgp::composed::SignedPublicKey>,
    id_len: usize,
}

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Merge one inline leaf into the running `(bodyType, bodyText)` pair,
/// per the table in `spec.md` §4.4.
///
/// Several arms intentionally *replace* rather than append earlier inline
/// content (`text/plain + image`, `text/html + image`, `text/html +
/// other`) — this reproduces a known source quirk (spec.md §9, flagged
/// there as an open redesign question) rather than fixing it.
fn merge_inline(st: &mut State, media_type: &str, data: &str) {
    let is_plain = media_type.starts_with("text/plain");
    let is_html = media_type.starts_with("text/html");
    let is_image = media_type.starts_with("image/");

    match st.body_type.as_str() {
        "" => {
            if is_plain || is_html {
                st.body_type = media_type.to_string();
                st.body_text = data.to_string();
            } else if is_image {
                st.body_type = "text/html".to_string();
                st.body_text = format!("<img src=\"data:{media_type};base64,{}\"><br>", b64(data.as_bytes()));
            } else {
                st.body_type = "text/html".to_string();
                st.body_text = format!("<pre>{data}</pre>");
            }
        }
        "text/plain" => {
            if is_plain {
                st.body_text = format!("{}\n\n{}", st.body_text, data);
            } else if is_html {
                st.body_type = "text/html".to_string();
                st.body_text = format!("<pre>{}</pre>\n\n{}", st.body_text, data);
            } else if is_image {
                st.body_type = "text/html".to_string();
                st.body_text = format!("\n\n<img src=\"data:{media_type};base64,{}\"><br>", b64(data.as_bytes()));
            } else {
                st.body_type = "text/html".to_string();
                st.body_text = format!("\n\n<pre>{data}</pre>");
            }
        }
        // "text/html", and the (spec-unlisted) case of a concrete type
        // carried over directly from an alternative-subtree selection —
        // treated the same as "text/html" for merge purposes since the
        // table does not define other starting states.
        _ => {
            if is_plain {
                st.body_text = format!("{}\n\n<pre>{}</pre>", st.body_text, data);
            } else if is_html {
                st.body_text = format!("{}\n\n{}", st.body_text, data);
            } else if is_image {
                st.body_text = format!("\n\n<img src=\"data:{media_type};base64,{}\"><br>", b64(data.as_bytes()));
            } else {
                st.body_text = format!("\n\n<pre>{data}</pre>");
            }
        }
    }
}

fn handle_attachment(part: &MimePart, filename: Option<String>, st: &mut State) -> Result<()> {
    let part_id = ids::generate_id(16);
    let hash = headers::sha256_hex(&part.body);
    let ciphertext = crypto::encrypt_and_armor(&part.body, st.keyring)?;

    st.manifest_parts.push(ManifestPart {
        id: part_id.clone(),
        content_type: part.media_type.clone(),
        filename,
        size: part.body.len() as u64,
        hash,
        encoding: File::ENCODING.to_string(),
    });

    for recipient in st.recipients {
        let file = File {
            id: ids::generate_id(st.id_len),
            date_created: now_ts(),
            date_modified: now_ts(),
            name: format!("{part_id}.pgp"),
            owner: recipient.account.id.clone(),
            encoding: File::ENCODING.to_string(),
            data: ciphertext.clone(),
        };
        st.files_by_recipient
            .entry(recipient.account.id.clone())
            .or_default()
            .push(file);
    }
    Ok(())
}

fn traverse(part: &MimePart, st: &mut State) -> Result<()> {
    if part.media_type.starts_with("multipart/alternative") {
        if let Some(chosen) = part.children.iter().find(|c| is_recognized_alt_type(&c.media_type)) {
            st.body_type = chosen.media_type.clone();
            st.body_text = chosen.body_str();
        } else if let Some(first) = part.children.first() {
            // No recognized type: first child wins by position (§8
            // boundary behavior).
            st.body_type = first.media_type.clone();
            st.body_text = first.body_str();
        }
        return Ok(());
    }

    if part.media_type.starts_with("multipart/") {
        for child in &part.children {
            traverse(child, st)?;
        }
        return Ok(());
    }

    match &part.disposition {
        Disposition::Attachment { filename } => {
            handle_attachment(part, filename.clone(), st)?;
        }
        _ => {
            let body = part.body_str();
            merge_inline(st, &part.media_type, &body);
        }
    }
    Ok(())
}

/// Flatten `root` and build an encrypted manifest + body (§4.4).
pub fn transform(
    root: &MimePart,
    cfg: &IngestConfig,
    recipients: &[ResolvedRecipient],
    keyring: &Keyring<pgp::composed::SignedPublicKey>,
    codec: &dyn ManifestCodec,
) -> Result<NormalizedMessage> {
    let mut st = State {
        body_type: String::new(),
        body_text: String::new(),
        manifest_parts: Vec::new(),
        files_by_recipient: HashMap::new(),
        recipients,
        keyring,
        id_len: cfg.id_len,
    };
    traverse(root, &mut st)?;

    let body_text = st.body_text.trim().to_string();
    let body_hash = headers::sha256_hex(body_text.as_bytes());
    st.manifest_parts.push(ManifestPart {
        id: ManifestPart::BODY_ID.to_string(),
        content_type: st.body_type.clone(),
        filename: None,
        size: body_text.len() as u64,
        hash: body_hash,
        encoding: File::ENCODING.to_string(),
    });

    let from = root
        .header("From")
        .map(headers::parse_address_list)
        .transpose()?
        .and_then(|mut v| if v.is_empty() { None } else { Some(v.remove(0)) })
        .unwrap_or_default();
    let to = root
        .header("To")
        .map(headers::parse_address_list)
        .transpose()?
        .unwrap_or_default();
    let cc = root
        .header("Cc")
        .map(headers::parse_address_list)
        .transpose()?
        .unwrap_or_default();
    let subject = headers::decode_header_value(root.header("Subject").unwrap_or_default())?;

    let manifest = Manifest {
        version: cfg.manifest_version.clone(),
        from,
        to,
        cc,
        subject: subject.clone(),
        parts: st.manifest_parts,
    };

    let manifest_bytes = codec
        .encode(&manifest)
        .map_err(|err| crate::error::IngestError::Crypto(format!("encoding manifest: {err}")))?;
    let manifest_armored = crypto::encrypt_and_armor(&manifest_bytes, keyring)?;
    let body_armored = crypto::encrypt_and_armor(body_text.as_bytes(), keyring)?;

    Ok(NormalizedMessage {
        kind: Kind::Manifest,
        subject,
        body_armored,
        manifest_armored: Some(manifest_armored),
        manifest: Some(manifest),
        files_by_recipient: st.files_by_recipient,
    })
}
