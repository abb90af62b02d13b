//! Reply outbox port
//!
//! The engine never talks to the chat platform. It enqueues structured
//! replies, and the transport adapter drains and renders them.

use async_trait::async_trait;

use crate::{error::ApplicationError, reply::Reply};

/// Port for handing replies to the transport
#[async_trait]
pub trait ReplyOutbox: Send + Sync {
    /// Enqueue a reply for delivery
    ///
    /// Replies for one identity are delivered in the order they were enqueued.
    async fn enqueue(&self, reply: Reply) -> Result<(), ApplicationError>;
}
