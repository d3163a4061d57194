//! Pub/sub notification (§6).
//!
//! The pub/sub client is an external collaborator; [`Publisher`] is the
//! contract the core consumes from it. [`LocalBus`] is an in-process
//! stand-in over `async-channel` for tests, in the spirit of the teacher's
//! own `Events`/`EventEmitter` split (`events.rs`, `events/ui_events.rs`)
//! over the same crate.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{IngestError, Result};

/// Topic every delivery notification is published to.
pub const TOPIC_EMAIL_RECEIPT: &str = "email_receipt";

/// Payload published on [`TOPIC_EMAIL_RECEIPT`].
#[derive(Debug, Clone, Serialize)]
pub struct EmailReceipt {
    pub id: String,
    pub owner: String,
}

/// The pub/sub contract the ingestion core consumes.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` as UTF-8 JSON to `topic`.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;
}

/// Publish the `email_receipt` notification for one recipient (§4.8 step 6).
pub async fn publish_email_receipt(
    publisher: &dyn Publisher,
    id: &str,
    owner: &str,
) -> Result<()> {
    let payload = EmailReceipt {
        id: id.to_string(),
        owner: owner.to_string(),
    };
    let bytes = serde_json::to_vec(&payload)
        .map_err(|err| IngestError::Publish(format!("encoding receipt: {err}")))?;
    publisher.publish(TOPIC_EMAIL_RECEIPT, &bytes).await
}

/// In-process bus backed by an unbounded `async-channel`, for tests and
/// single-process deployments.
#[derive(Debug, Clone)]
pub struct LocalBus {
    sender: async_channel::Sender<(String, Vec<u8>)>,
}

/// Receiving half of a [`LocalBus`].
#[derive(Debug, Clone)]
pub struct LocalBusReceiver {
    receiver: async_channel::Receiver<(String, Vec<u8>)>,
}

impl LocalBus {
    /// Create a connected bus/receiver pair.
    pub fn new() -> (Self, LocalBusReceiver) {
        let (sender, receiver) = async_channel::unbounded();
        (LocalBus { sender }, LocalBusReceiver { receiver })
    }
}

impl LocalBusReceiver {
    pub async fn recv(&self) -> Option<(String, Vec<u8>)> {
        self.receiver.recv().await.ok()
    }
}

#[async_trait]
impl Publisher for LocalBus {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        self.sender
            .send((topic.to_string(), payload.to_vec()))
            .await
            .map_err(|err| IngestError::Publish(err.to_string()))
    }
}
