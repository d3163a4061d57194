//! Persistence & Fan-out (C9) and the overall ingestion state machine
//! (§4.9): `Start -> Classified -> Normalized -> PerRecipient(i) -> Done`.

use crate::classify;
use crate::config::IngestConfig;
use crate::domain;
use crate::error::Result;
use crate::events::{self, Publisher};
use crate::headers;
use crate::ids;
use crate::manifest::ManifestCodec;
use crate::mime::{self, MimePart};
use crate::model::{Email, Kind, Label, Thread};
use crate::resolver::{self, ResolvedRecipient};
use crate::store::Store;
use crate::time::now_ts;
use crate::transform::{manifest_extract, pgpmime, raw, NormalizedMessage};

/// An inbound envelope as handed off by the SMTP front-end.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub recipients: Vec<String>,
    pub data: Vec<u8>,
}

/// Ingest one envelope: resolve recipients, classify, normalize, and fan
/// out the per-recipient file/thread/email writes plus notifications.
///
/// Returns the ids of the `Email` rows inserted, one per local recipient,
/// in account-resolution order.
pub async fn ingest(
    cfg: &IngestConfig,
    store: &dyn Store,
    publisher: &dyn Publisher,
    codec: &dyn ManifestCodec,
    envelope: &Envelope,
) -> Result<Vec<String>> {
    let result = run(cfg, store, publisher, codec, envelope).await;
    if let Err(err) = &result {
        tracing_error(err);
    }
    result
}

fn tracing_error(err: &crate::error::IngestError) {
    log::error!("envelope ingestion failed: {err}");
}

async fn run(
    cfg: &IngestConfig,
    store: &dyn Store,
    publisher: &dyn Publisher,
    codec: &dyn ManifestCodec,
    envelope: &Envelope,
) -> Result<Vec<String>> {
    let locals = domain::filter_local_recipients(cfg, &envelope.recipients)?;
    let recipients = resolver::resolve_recipients(store, &locals).await?;

    let root = mime::parse(&envelope.data)?;
    let kind = classify::classify(&root);
    let normalized = normalize(cfg, &root, kind, &recipients, codec)?;

    let mut email_ids = Vec::with_capacity(recipients.len());
    for recipient in &recipients {
        let eid = persist_for_recipient(store, publisher, cfg, &root, &normalized, recipient).await?;
        email_ids.push(eid);
    }
    Ok(email_ids)
}

fn normalize(
    cfg: &IngestConfig,
    root: &MimePart,
    kind: Kind,
    recipients: &[ResolvedRecipient],
    codec: &dyn ManifestCodec,
) -> Result<NormalizedMessage> {
    match kind {
        Kind::Raw => {
            let keyring = resolver::union_keyring(recipients);
            raw::transform(root, cfg, recipients, &keyring, codec)
        }
        Kind::Manifest => manifest_extract::extract(root, recipients),
        Kind::Pgpmime => pgpmime::extract(root),
    }
}

/// Compute the subject hash used for thread lookup (§4.8 step 2):
/// verbatim from `Subject-Hash` if the sender supplied one, otherwise the
/// hex SHA-256 of the subject the classified transformer (C5/C6/C7) already
/// produced — not the root message's own `Subject` header, which may not
/// even carry the subject for `manifest`/`pgpmime` mail (§4.5–§4.7).
fn compute_subject_hash(root: &MimePart, normalized: &NormalizedMessage) -> Result<String> {
    if let Some(trusted) = root.header("Subject-Hash") {
        return Ok(trusted.to_string());
    }
    Ok(headers::subject_hash(&normalized.subject))
}

/// Derive `from`/`to`/`cc` from the raw headers and drop self-addressing
/// (§4.8 step 3).
fn derive_addresses(
    cfg: &IngestConfig,
    root: &MimePart,
    account_name: &str,
) -> Result<(String, Vec<String>, Vec<String>)> {
    let is_self = |addr: &str| -> bool {
        cfg.local_domains
            .iter()
            .any(|d| addr.eq_ignore_ascii_case(&format!("{account_name}@{d}")))
    };

    let from = headers::parse_address_list(root.header("From").unwrap_or_default())?
        .into_iter()
        .next()
        .unwrap_or_default();
    let to = headers::parse_address_list(root.header("To").unwrap_or_default())?
        .into_iter()
        .filter(|a| !is_self(a))
        .collect();
    let cc = headers::parse_address_list(root.header("Cc").unwrap_or_default())?
        .into_iter()
        .filter(|a| !is_self(a))
        .collect();
    Ok((from, to, cc))
}

async fn reconcile_thread(
    store: &dyn Store,
    owner: &str,
    subject_hash: &str,
    inbox: &Label,
    members_seed: &[String],
    email_id: &str,
) -> Result<Thread> {
    let mut existing = store
        .find_threads_by_subject_hash(owner, subject_hash)
        .await?;
    if existing.is_empty() {
        let thread = Thread {
            id: ids::generate_id(16),
            date_created: now_ts(),
            date_modified: now_ts(),
            name: Thread::DEFAULT_NAME.to_string(),
            owner: owner.to_string(),
            emails: vec![email_id.to_string()],
            labels: vec![inbox.id.clone()],
            members: members_seed.to_vec(),
            is_read: false,
            subject_hash: subject_hash.to_string(),
        };
        store.insert_thread(&thread).await?;
        Ok(thread)
    } else {
        let mut thread = existing.remove(0);
        thread.emails.push(email_id.to_string());
        if !thread.labels.contains(&inbox.id) {
            thread.labels.push(inbox.id.clone());
        }
        thread.date_modified = now_ts();
        thread.is_read = false;
        store.update_thread(&thread).await?;
        Ok(thread)
    }
}

async fn persist_for_recipient(
    store: &dyn Store,
    publisher: &dyn Publisher,
    cfg: &IngestConfig,
    root: &MimePart,
    normalized: &NormalizedMessage,
    recipient: &ResolvedRecipient,
) -> Result<String> {
    let owner = recipient.account.id.clone();

    let inbox = store
        .find_inbox_label(&owner)
        .await?
        .ok_or_else(|| crate::error::IngestError::NoInbox(owner.clone()))?;

    let subject_hash = compute_subject_hash(root, normalized)?;
    let (from, to, cc) = derive_addresses(cfg, root, &recipient.account.name)?;

    let files = normalized
        .files_by_recipient
        .get(&owner)
        .cloned()
        .unwrap_or_default();
    let mut file_ids = Vec::with_capacity(files.len());
    for file in &files {
        store.insert_file(file).await?;
        file_ids.push(file.id.clone());
    }

    let members_seed: Vec<String> = to
        .iter()
        .chain(cc.iter())
        .cloned()
        .chain(std::iter::once(from.clone()))
        .collect();
    let email_id = ids::generate_id(cfg.id_len);
    let thread = reconcile_thread(
        store,
        &owner,
        &subject_hash,
        &inbox,
        &members_seed,
        &email_id,
    )
    .await?;

    let email = Email {
        id: email_id.clone(),
        date_created: now_ts(),
        date_modified: now_ts(),
        name: normalized.subject.clone(),
        owner: owner.clone(),
        kind: normalized.kind,
        from,
        to,
        cc,
        body: normalized.body_armored.clone(),
        manifest: normalized.manifest_armored.clone(),
        files: file_ids,
        thread: thread.id.clone(),
        status: Email::STATUS_RECEIVED.to_string(),
    };
    store.insert_email(&email).await?;

    events::publish_email_receipt(publisher, &email_id, &owner).await?;
    log::info!("ingested email {email_id} for account {owner}");

    Ok(email_id)
}
