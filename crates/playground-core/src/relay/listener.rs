use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::relay::bus::MessageBus;
use crate::relay::messages::RelayMessage;
use crate::relay::responder::Responder;

/// Routes messages posted by the instance frame to a [`Responder`].
#[derive(Clone)]
pub struct Relay {
    responder: Responder,
}

impl Relay {
    pub fn new(responder: Responder) -> Self {
        Self { responder }
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    pub fn dispatch(&self, message: &RelayMessage) {
        match message {
            RelayMessage::Advertise { online: true } => self.responder.announce(),
            RelayMessage::Advertise { online: false } => self.responder.unannounce(),
            RelayMessage::Online => {
                self.responder.announce();
                self.responder.set_status(true);
            }
            // Offline does not unannounce.
            RelayMessage::Offline => self.responder.set_status(false),
            RelayMessage::AnswerOffline(answer) | RelayMessage::AnswerError(answer) => {
                error!(
                    event = "core.relay.answer_failed",
                    tag = message.tag(),
                    uuid = answer.uuid.as_deref(),
                    data = %answer.data
                );
                self.responder.respond(message);
            }
            RelayMessage::Answer(_) => {
                self.responder.respond(message);
            }
            RelayMessage::Unknown { raw, .. } => {
                error!(
                    event = "core.relay.unknown_message",
                    tag = message.tag(),
                    raw = %raw
                );
            }
        }
    }

    /// Start listening to `bus`. The listener lives until the returned
    /// subscription is closed or dropped.
    pub fn listen(self, bus: &MessageBus) -> RelaySubscription {
        let mut rx = bus.subscribe();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let responder = self.responder.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(raw) => self.dispatch(&RelayMessage::from_value(raw)),
                        Err(RecvError::Lagged(n)) => {
                            warn!(event = "core.relay.messages_dropped", count = n);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            drop(rx);
            self.responder.close();
            debug!(event = "core.relay.listener_stopped");
        });

        RelaySubscription {
            responder,
            cancel,
            task: Some(task),
        }
    }
}

/// Scoped registration of a [`Relay`] on a message bus.
pub struct RelaySubscription {
    responder: Responder,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RelaySubscription {
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Unregister the listener and close the responder.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(event = "core.relay.join_failed", error = %e);
        }
        // Covers a listener task that never got to run.
        self.responder.close();
    }
}

impl Drop for RelaySubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
