//! A small actor runtime for state machines driven by asynchronous I/O.
//!
//! An actor owns its state on a dedicated Tokio task. The only way to
//! touch that state is to post an [`Event`], and events are applied
//! strictly one after another. This gives the run-to-completion model of
//! an event loop: the state is never observed half-updated, and the only
//! suspension points are the tasks an event chooses to spawn.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::MailboxClosed;
pub use handle::{Actor, WeakActor};
pub use mailbox::Event;
