//! Document store contract (§6).
//!
//! The store engine is an external collaborator; this trait is the shape
//! the core needs from it, one method per logical table operation. This
//! plays the role the teacher's `context.sql` wrapper plays around
//! `rusqlite` (`query_row`, `query_map`, `execute` in `contact.rs`), except
//! the engine itself is not assumed — a deployment provides the `impl`.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Account, Email, File, Key, Label, Thread};

/// Everything the ingestion core reads from or writes to the document
/// store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load accounts whose `name` is in `names`. The returned vec may be
    /// shorter than `names` if some names have no matching account; the
    /// caller (resolver) is responsible for detecting partial matches.
    async fn find_accounts_by_name(&self, names: &[String]) -> Result<Vec<Account>>;

    /// Load a specific key by id.
    async fn find_key_by_id(&self, id: &str) -> Result<Option<Key>>;

    /// Load keys owned by `owner`, in store order (order unspecified,
    /// §9 "Key selection").
    async fn find_keys_by_owner(&self, owner: &str) -> Result<Vec<Key>>;

    /// Load the built-in Inbox label for `owner`.
    async fn find_inbox_label(&self, owner: &str) -> Result<Option<Label>>;

    /// Load threads for `(owner, subject_hash)`, in store order.
    async fn find_threads_by_subject_hash(
        &self,
        owner: &str,
        subject_hash: &str,
    ) -> Result<Vec<Thread>>;

    async fn insert_thread(&self, thread: &Thread) -> Result<()>;
    async fn update_thread(&self, thread: &Thread) -> Result<()>;
    async fn insert_file(&self, file: &File) -> Result<()>;
    async fn insert_email(&self, email: &Email) -> Result<()>;
}
