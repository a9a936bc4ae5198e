//! Client-side core of the support desk: the chat conversation with the
//! remote assistant and the outbound voice call, both driven through an
//! [`AssistantGateway`](support_desk_gateway::AssistantGateway).

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod chat;
pub mod conversation;
mod error;
mod gateway_client;
mod reply;
mod voice;

pub use chat::{ChatManager, ChatManagerBuilder, ChatSnapshot};
pub use error::{Error, ErrorKind};
pub use voice::{
    USER_ENDED_REASON, VoiceSessionBuilder, VoiceSessionManager,
    VoiceSnapshot, VoiceStatus,
};
