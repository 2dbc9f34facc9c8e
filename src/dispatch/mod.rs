//! JSON command surface.
//!
//! Accepts `{ command, params, token }` objects from whatever transport
//! carries them and answers `{ success, command, result | error, status,
//! timestamp }`. The transport itself is out of scope.

mod dispatcher;
mod reply;
mod request;

pub use dispatcher::Dispatcher;
pub use reply::{CommandError, CommandReply};
pub use request::{CommandRequest, Operation};
