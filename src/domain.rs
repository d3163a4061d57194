//! Domain Filter (C1).
//!
//! Filters envelope recipients down to the local-part of addresses whose
//! domain is served by this deployment.

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};

/// Split an addr-spec into `(local, domain)`, lower-casing the domain the
/// way the teacher normalizes addresses in `contact.rs`.
fn split_addr(addr: &str) -> Result<(&str, String)> {
    let mut parts = addr.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next();
    match (local.is_empty(), domain) {
        (false, Some(d)) if !d.is_empty() && !d.contains('@') => {
            Ok((local, d.to_ascii_lowercase()))
        }
        _ => Err(IngestError::InvalidRecipient(addr.to_string())),
    }
}

/// Filter envelope recipients to the local-part of those served locally.
///
/// Fails with [`IngestError::InvalidRecipient`] if any recipient address
/// does not contain exactly one `@`. Fails with
/// [`IngestError::NoLocalDomain`] if none of the recipients are local.
pub fn filter_local_recipients(
    cfg: &IngestConfig,
    recipients: &[String],
) -> Result<Vec<String>> {
    let mut locals = Vec::new();
    for addr in recipients {
        let (local, domain) = split_addr(addr)?;
        if cfg.local_domains.iter().any(|d| d == &domain) {
            locals.push(local.to_string());
        }
    }
    if locals.is_empty() {
        return Err(IngestError::NoLocalDomain);
    }
    Ok(locals)
}
