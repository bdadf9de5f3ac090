//! The message-transport seam between the chains.
//!
//! The concrete relay (oracle-based, native rollup bridge, ...) is an
//! external collaborator; this crate only depends on the trait. The
//! doubles here cover tests and local wiring.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors surfaced by a bridge transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("bridge send failed: {0}")]
    Send(String),
}

/// Opaque message transport toward the remote chain's controller.
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn send_message(&self, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Transport double that queues messages on an in-process channel; the
/// test (or local relay loop) drains the receiver into the remote
/// controller's inbound entry point.
pub struct ChannelBridge {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelBridge {
    /// Create the sender half plus the receiver the relay drains.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Bridge for ChannelBridge {
    async fn send_message(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(payload)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// Transport double that records every sent payload for inspection.
#[derive(Clone, Default)]
pub struct CaptureBridge {
    sent: Arc<RwLock<Vec<Vec<u8>>>>,
}

impl CaptureBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.read().clone()
    }
}

#[async_trait]
impl Bridge for CaptureBridge {
    async fn send_message(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.sent.write().push(payload);
        Ok(())
    }
}
