//! Remote-access session lifecycle.
//!
//! Sessions are never stored locally. The device farm owns their state and
//! every status request is a fresh vendor read; this module only decides
//! which caller may see a session and when a client can stop polling.

mod manager;
mod poll;

pub use manager::{SessionManager, SessionStatus};
pub use poll::{PollOutcome, poll_until};
