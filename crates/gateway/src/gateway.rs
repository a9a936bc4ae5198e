use std::error::Error;

use crate::error::ErrorKind;
use crate::request::{ChatTurnRequest, EndVoiceRequest, StartVoiceRequest};
use crate::response::{ChatTurnResponse, VoiceSessionEnded, VoiceSessionStarted};

/// The error type for a gateway.
pub trait GatewayError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A transport to the remote assistant service.
///
/// Every operation captures what it needs from the request when it is
/// called, and returns a future that owns everything else. The future can
/// therefore outlive both the request and `self`, and may be moved to
/// another task. Once created, the future always runs to completion when
/// polled; there is no cancellation besides dropping it.
///
/// Gateways should behave like stateless objects. Callers may clone or
/// drop them at any time and must not rely on state kept between calls.
pub trait AssistantGateway: Send + Sync {
    /// The error type that may be returned by the gateway.
    type Error: GatewayError;

    /// Sends one chat turn and waits for the assistant's answer.
    fn send_chat_turn(
        &self,
        req: &ChatTurnRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static;

    /// Asks the gateway to place a voice call to a phone number.
    fn start_voice_session(
        &self,
        req: &StartVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionStarted, Self::Error>>
    + Send
    + 'static;

    /// Asks the gateway to hang up a voice call it started earlier.
    fn end_voice_session(
        &self,
        req: &EndVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionEnded, Self::Error>> + Send + 'static;
}
