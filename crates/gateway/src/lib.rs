//! The contract between the support-desk client and its remote assistant.
//!
//! The remote side answers chat turns and places or hangs up phone calls.
//! This crate describes what the client sends and what it reads back, and
//! the trait a transport has to implement to carry those exchanges. It
//! defines no behavior of its own: the HTTP transport lives in
//! `support-desk-http-gateway`, and a scripted in-process one for tests in
//! `support-desk-test-gateway`.

#![deny(missing_docs)]

mod error;
mod gateway;
mod request;
mod response;

pub use error::*;
pub use gateway::*;
pub use request::*;
pub use response::*;
