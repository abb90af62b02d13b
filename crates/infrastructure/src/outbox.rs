//! Reply outbox backed by a tokio channel
//!
//! The engine enqueues replies; the transport owns the receiving half and
//! renders or sends them in order.

use application::{Reply, error::ApplicationError, ports::ReplyOutbox};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Outbox writing to an unbounded mpsc channel
#[derive(Debug, Clone)]
pub struct ChannelOutbox {
    sender: mpsc::UnboundedSender<Reply>,
}

impl ChannelOutbox {
    /// Create an outbox and the receiver the transport drains
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Reply>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ReplyOutbox for ChannelOutbox {
    async fn enqueue(&self, reply: Reply) -> Result<(), ApplicationError> {
        trace!(identity = %reply.identity, "Enqueueing reply");
        self.sender.send(reply).map_err(|e| {
            warn!(identity = %e.0.identity, "Reply receiver is gone");
            ApplicationError::Delivery("reply receiver closed".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use application::ReplyMessage;
    use domain::Identity;

    use super::*;

    #[tokio::test]
    async fn replies_arrive_in_order() {
        let (outbox, mut receiver) = ChannelOutbox::channel();
        let id = Identity::from(1);

        outbox
            .enqueue(Reply::new(id.clone(), None, ReplyMessage::ChooseLanguage))
            .await
            .unwrap();
        outbox
            .enqueue(Reply::new(id, None, ReplyMessage::AskGivenName))
            .await
            .unwrap();

        assert_eq!(
            receiver.recv().await.unwrap().message,
            ReplyMessage::ChooseLanguage
        );
        assert_eq!(
            receiver.recv().await.unwrap().message,
            ReplyMessage::AskGivenName
        );
    }

    #[tokio::test]
    async fn closed_receiver_is_delivery_error() {
        let (outbox, receiver) = ChannelOutbox::channel();
        drop(receiver);

        let result = outbox
            .enqueue(Reply::new(Identity::from(1), None, ReplyMessage::Processing))
            .await;

        assert!(matches!(result, Err(ApplicationError::Delivery(_))));
    }
}
