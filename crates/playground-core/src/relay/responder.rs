use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::relay::bus::FrameSlot;
use crate::relay::errors::RelayError;
use crate::relay::messages::{Answer, RelayMessage, action_request};

type Reply = Result<Value, RelayError>;

/// Availability of the instance as last reported by the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponderState {
    /// The frame advertised the instance. Together with `online` this only
    /// gates [`Responder::request`]; `Relay::dispatch` handles every message
    /// whatever the state.
    pub announced: bool,
    pub online: bool,
}

impl ResponderState {
    pub fn is_available(&self) -> bool {
        self.announced && self.online
    }
}

struct Inner {
    owner: Option<String>,
    frame: FrameSlot,
    state: watch::Sender<ResponderState>,
    pending: Mutex<HashMap<String, oneshot::Sender<Reply>>>,
    closed: AtomicBool,
}

/// Bridge between callers and the instance running in the frame.
///
/// Tracks whether the instance is announced and online, forwards action
/// requests to the frame and routes answers back by `uuid`. Cheap to clone.
#[derive(Clone)]
pub struct Responder {
    inner: Arc<Inner>,
}

impl Responder {
    /// `owner` is the id of the logged-in user the instance belongs to.
    pub fn new(owner: Option<String>, frame: FrameSlot) -> Self {
        let (state, _) = watch::channel(ResponderState::default());
        Self {
            inner: Arc::new(Inner {
                owner,
                frame,
                state,
                pending: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.inner.owner.as_deref()
    }

    pub fn state(&self) -> ResponderState {
        *self.inner.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResponderState> {
        self.inner.state.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    pub fn announce(&self) {
        self.update("announce", |s| s.announced = true);
    }

    pub fn unannounce(&self) {
        self.update("unannounce", |s| s.announced = false);
    }

    pub fn set_status(&self, online: bool) {
        self.update("set_status", |s| s.online = online);
    }

    fn update(&self, op: &'static str, apply: impl FnOnce(&mut ResponderState)) {
        if self.is_closed() {
            debug!(event = "core.relay.update_after_close", op = op);
            return;
        }
        self.inner.state.send_if_modified(|state| {
            let before = *state;
            apply(state);
            let changed = before != *state;
            if changed {
                info!(
                    event = "core.relay.state_changed",
                    owner = self.owner(),
                    announced = state.announced,
                    online = state.online
                );
            }
            changed
        });
    }

    /// Complete the pending request matching the answer's `uuid`.
    ///
    /// Returns false when the message is not an answer or nothing was
    /// waiting for it.
    pub fn respond(&self, message: &RelayMessage) -> bool {
        let (answer, reply): (&Answer, Reply) = match message {
            RelayMessage::Answer(answer) => (answer, Ok(answer.data.clone())),
            RelayMessage::AnswerOffline(answer) => (answer, Err(RelayError::InstanceOffline)),
            RelayMessage::AnswerError(answer) => (
                answer,
                Err(RelayError::Remote {
                    uuid: answer.uuid.clone().unwrap_or_default(),
                    message: answer.error_message(),
                }),
            ),
            _ => return false,
        };

        let Some(uuid) = answer.uuid.as_deref() else {
            warn!(event = "core.relay.answer_without_uuid", tag = message.tag());
            return false;
        };
        let Some(waiter) = self.pending().remove(uuid) else {
            debug!(event = "core.relay.answer_unmatched", uuid = uuid);
            return false;
        };
        // The requester may have given up already.
        waiter.send(reply).is_ok()
    }

    /// Ask the instance to run `name` with `args` and wait for its answer.
    pub async fn request(&self, name: &str, args: Value) -> Result<Value, RelayError> {
        if self.is_closed() {
            return Err(RelayError::Closed);
        }
        let state = self.state();
        if !state.is_available() {
            return Err(RelayError::NotAvailable {
                announced: state.announced,
                online: state.online,
            });
        }

        let uuid = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        {
            // Checked under the lock so `close` cannot drain in between.
            let mut pending = self.pending();
            if self.is_closed() {
                return Err(RelayError::Closed);
            }
            pending.insert(uuid.clone(), tx);
        }

        if let Err(e) = self.inner.frame.post(action_request(&uuid, name, &args)) {
            self.pending().remove(&uuid);
            return Err(e);
        }
        debug!(event = "core.relay.request_sent", uuid = uuid, name = name);

        rx.await.unwrap_or(Err(RelayError::Closed))
    }

    /// Fail every pending request and release the availability state.
    /// Later updates are ignored.
    pub fn close(&self) {
        let waiters: Vec<_> = {
            let mut pending = self.pending();
            if self.inner.closed.swap(true, Ordering::SeqCst) {
                return;
            }
            pending.drain().map(|(_, tx)| tx).collect()
        };
        let failed = waiters.len();
        for waiter in waiters {
            let _ = waiter.send(Err(RelayError::Closed));
        }
        self.inner.state.send_replace(ResponderState::default());
        info!(event = "core.relay.closed", owner = self.owner(), failed_requests = failed);
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<String, oneshot::Sender<Reply>>> {
        self.inner.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}
