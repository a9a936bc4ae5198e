use support_desk_gateway::{ANONYMOUS_CALLER_ID, AssistantGateway};

use super::VoiceSessionManager;
use crate::gateway_client::GatewayClient;

/// [`VoiceSessionManager`] builder.
pub struct VoiceSessionBuilder {
    pub(crate) gateway: GatewayClient,
    pub(crate) caller_id: String,
}

impl VoiceSessionBuilder {
    /// Creates a new builder with the specified gateway.
    #[inline]
    pub fn with_gateway<G: AssistantGateway + 'static>(gateway: G) -> Self {
        Self {
            gateway: GatewayClient::new(gateway),
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        }
    }

    /// Sets the caller id sent when placing a call.
    #[inline]
    pub fn with_caller_id<S: Into<String>>(mut self, caller_id: S) -> Self {
        self.caller_id = caller_id.into();
        self
    }

    /// Builds the manager.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[inline]
    pub fn build(self) -> VoiceSessionManager {
        VoiceSessionManager::spawn_from_builder(self)
    }
}
