//! An out-of-the-box support desk client that bundles the chat and voice
//! managers over one gateway.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring the support desk into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod desk;
mod settings;

pub use desk::{SupportDesk, SupportDeskBuilder};
pub use settings::{Settings, SettingsError};

/// Re-exports of [`support_desk_core`] crate.
pub mod core {
    pub use support_desk_core::*;
}

/// Re-exports of [`support_desk_http_gateway`] crate.
pub mod http {
    pub use support_desk_http_gateway::*;
}
