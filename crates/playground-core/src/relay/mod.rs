//! Message relay between the console and the instance frame.
//!
//! The instance posts tagged messages (`{"type", "data"}`) on the host
//! [`MessageBus`]. A [`Relay`] listening on the bus keeps the [`Responder`]
//! availability state current and routes answers back to the requests that
//! the responder forwarded to the mounted [`FrameSlot`].

pub mod bus;
pub mod errors;
pub mod listener;
pub mod messages;
pub mod responder;

pub use bus::{FrameSlot, MessageBus};
pub use errors::RelayError;
pub use listener::{Relay, RelaySubscription};
pub use messages::{Answer, RelayMessage};
pub use responder::{Responder, ResponderState};
