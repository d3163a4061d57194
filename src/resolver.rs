//! Recipient Resolver (C2).

use pgp::composed::SignedPublicKey;

use crate::crypto;
use crate::error::{IngestError, Result};
use crate::model::Account;
use crate::store::Store;

/// A local recipient with its account record and resolved encryption key.
#[derive(Debug, Clone)]
pub struct ResolvedRecipient {
    pub account: Account,
    pub public_key: SignedPublicKey,
}

/// Resolve every local-part in `locals` to an account and a usable public
/// key (§4.2).
///
/// Fails with [`IngestError::UnknownRecipient`] if any local-part has no
/// matching account (whole envelope rejected, no partial acceptance).
/// Fails with [`IngestError::NoKey`] if a resolved account has no key.
pub async fn resolve_recipients(
    store: &dyn Store,
    locals: &[String],
) -> Result<Vec<ResolvedRecipient>> {
    let mut accounts = store.find_accounts_by_name(locals).await?;
    if accounts.len() != locals.len() {
        let found: std::collections::HashSet<&str> =
            accounts.iter().map(|a| a.name.as_str()).collect();
        let missing = locals
            .iter()
            .find(|name| !found.contains(name.as_str()))
            .cloned()
            .unwrap_or_default();
        return Err(IngestError::UnknownRecipient(missing));
    }

    // `Store::find_accounts_by_name` makes no ordering guarantee; the
    // per-recipient loop must run in input-account order (§5), so resort
    // to match `locals` before building the resolved list.
    let position: std::collections::HashMap<&str, usize> = locals
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    accounts.sort_by_key(|a| position.get(a.name.as_str()).copied().unwrap_or(usize::MAX));

    let mut resolved = Vec::with_capacity(accounts.len());
    for account in accounts {
        let key_record = match &account.public_key_ref {
            Some(key_id) => store.find_key_by_id(key_id).await?,
            None => store
                .find_keys_by_owner(&account.id)
                .await?
                .into_iter()
                .next(),
        };
        let key_record = key_record.ok_or_else(|| IngestError::NoKey(account.id.clone()))?;
        let public_key = crypto::parse_public_key(&key_record.armored_key_material)?;
        resolved.push(ResolvedRecipient {
            account,
            public_key,
        });
    }
    Ok(resolved)
}

/// Build the union keyring used by the Crypto Layer from resolved
/// recipients.
pub fn union_keyring(recipients: &[ResolvedRecipient]) -> crypto::Keyring<SignedPublicKey> {
    recipients
        .iter()
        .map(|r| r.public_key.clone())
        .collect::<crypto::Keyring<SignedPublicKey>>()
}
