use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error};

use crate::relay::errors::RelayError;

const BUS_CAPACITY: usize = 64;

/// Host window message channel.
///
/// Anything posted is delivered to every subscribed listener.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<Value>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Post a message; returns how many listeners received it.
    pub fn post(&self, message: Value) -> usize {
        // Err only means nobody is listening.
        self.tx.send(message).unwrap_or_else(|_| {
            debug!(event = "core.relay.bus_no_listeners");
            0
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to the mounted instance frame.
///
/// Written when the frame mounts, read whenever the relay posts to it. The
/// last mount wins.
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    inner: Arc<RwLock<Option<mpsc::UnboundedSender<Value>>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a frame and return the receiving end of its message inbox.
    pub fn mount(&self) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut slot = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if slot.replace(tx).is_some() {
            debug!(event = "core.relay.frame_replaced");
        }
        rx
    }

    pub fn unmount(&self) {
        let mut slot = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    pub fn is_mounted(&self) -> bool {
        let slot = self.inner.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Post to the mounted frame. Logs and fails when nothing is mounted.
    pub fn post(&self, message: Value) -> Result<(), RelayError> {
        let slot = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let delivered = slot.as_ref().is_some_and(|tx| tx.send(message).is_ok());
        if !delivered {
            error!(event = "core.relay.frame_unavailable");
            return Err(RelayError::FrameNotMounted);
        }
        Ok(())
    }
}
