//! Chat client for the math tutor relay.
//!
//! The transcript is plain data updated by a pure reducer ([`update`]); the
//! reducer returns [`Effect`]s that a driver ([`ChatSession`]) executes
//! against a [`Relay`]. Front ends only render [`ChatState`] and forward user
//! input.

pub mod message;
pub mod relay;
pub mod session;
pub mod state;

pub use message::{Message, Role, Transcript};
pub use relay::{ClientError, Relay, RelayClient};
pub use session::ChatSession;
pub use state::{ChatEvent, ChatState, DEFAULT_GREETING, Effect, Notice, update};
