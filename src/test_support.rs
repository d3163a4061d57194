//! In-memory fakes for the external [`Store`]/[`Publisher`] contracts,
//! plus a throwaway key-generation helper. Grounded in the teacher's
//! `test_utils.rs` convention of providing a fully wired fake so domain
//! logic can be exercised without a real database or message bus.

use std::sync::Mutex;

use async_trait::async_trait;
use pgp::composed::{KeyType, SecretKeyParamsBuilder};
use pgp::types::SecretKeyTrait;

use crate::error::{IngestError, Result};
use crate::model::{Account, Email, File, Key, Label, Thread};
use crate::store::Store;

/// A single-process, `Mutex`-guarded stand-in for the document store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<Account>,
    keys: Vec<Key>,
    labels: Vec<Label>,
    threads: Vec<Thread>,
    files: Vec<File>,
    emails: Vec<Email>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_account(&self, account: Account) {
        self.inner.lock().unwrap().accounts.push(account);
    }

    pub fn seed_key(&self, key: Key) {
        self.inner.lock().unwrap().keys.push(key);
    }

    pub fn seed_inbox(&self, owner: &str) {
        self.inner.lock().unwrap().labels.push(Label {
            id: format!("inbox-{owner}"),
            owner: owner.to_string(),
            name: Label::INBOX_NAME.to_string(),
            builtin: true,
        });
    }

    pub fn is_empty(&self) -> bool {
        let t = self.inner.lock().unwrap();
        t.threads.is_empty() && t.files.is_empty() && t.emails.is_empty()
    }

    pub fn emails(&self) -> Vec<Email> {
        self.inner.lock().unwrap().emails.clone()
    }

    pub fn files(&self) -> Vec<File> {
        self.inner.lock().unwrap().files.clone()
    }

    pub fn threads(&self) -> Vec<Thread> {
        self.inner.lock().unwrap().threads.clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_accounts_by_name(&self, names: &[String]) -> Result<Vec<Account>> {
        let t = self.inner.lock().unwrap();
        Ok(t.accounts
            .iter()
            .filter(|a| names.contains(&a.name))
            .cloned()
            .collect())
    }

    async fn find_key_by_id(&self, id: &str) -> Result<Option<Key>> {
        let t = self.inner.lock().unwrap();
        Ok(t.keys.iter().find(|k| k.id == id).cloned())
    }

    async fn find_keys_by_owner(&self, owner: &str) -> Result<Vec<Key>> {
        let t = self.inner.lock().unwrap();
        Ok(t.keys.iter().filter(|k| k.owner == owner).cloned().collect())
    }

    async fn find_inbox_label(&self, owner: &str) -> Result<Option<Label>> {
        let t = self.inner.lock().unwrap();
        Ok(t.labels
            .iter()
            .find(|l| l.owner == owner && l.builtin && l.name == Label::INBOX_NAME)
            .cloned())
    }

    async fn find_threads_by_subject_hash(
        &self,
        owner: &str,
        subject_hash: &str,
    ) -> Result<Vec<Thread>> {
        let t = self.inner.lock().unwrap();
        Ok(t.threads
            .iter()
            .filter(|th| th.owner == owner && th.subject_hash == subject_hash)
            .cloned()
            .collect())
    }

    async fn insert_thread(&self, thread: &Thread) -> Result<()> {
        self.inner.lock().unwrap().threads.push(thread.clone());
        Ok(())
    }

    async fn update_thread(&self, thread: &Thread) -> Result<()> {
        let mut t = self.inner.lock().unwrap();
        if let Some(existing) = t.threads.iter_mut().find(|th| th.id == thread.id) {
            *existing = thread.clone();
            Ok(())
        } else {
            Err(IngestError::Store(format!("no such thread {}", thread.id)))
        }
    }

    async fn insert_file(&self, file: &File) -> Result<()> {
        self.inner.lock().unwrap().files.push(file.clone());
        Ok(())
    }

    async fn insert_email(&self, email: &Email) -> Result<()> {
        self.inner.lock().unwrap().emails.push(email.clone());
        Ok(())
    }
}

/// Generate a throwaway OpenPGP keypair for tests, armored the way
/// [`Key::armored_key_material`] stores it.
pub fn generate_test_keypair(user_id: &str) -> (String, String) {
    let mut params = SecretKeyParamsBuilder::default();
    params
        .key_type(KeyType::EdDSA)
        .can_create_certificates(false)
        .can_sign(true)
        .can_encrypt(true)
        .primary_user_id(user_id.to_string())
        .passphrase(None);
    let secret_key_params = params.build().expect("valid key params");
    let secret_key = secret_key_params.generate().expect("key generation");
    let signed_secret_key = secret_key.sign(String::new).expect("self-sign secret key");
    let public_key = signed_secret_key
        .public_key()
        .sign(&signed_secret_key, String::new)
        .expect("self-sign public key");

    let armored_secret = signed_secret_key
        .to_armored_string(None.into())
        .expect("armor secret key");
    let armored_public = public_key
        .to_armored_string(None.into())
        .expect("armor public key");
    (armored_secret, armored_public)
}
