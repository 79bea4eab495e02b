use async_trait::async_trait;
use thiserror::Error;

use crate::model::Reply;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to deliver reply: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound side of the chat channel.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, user_id: i64, reply: &Reply) -> Result<(), TransportError>;
}
