use support_desk_gateway::{ANONYMOUS_CALLER_ID, AssistantGateway};

use super::ChatManager;
use crate::gateway_client::GatewayClient;

/// [`ChatManager`] builder.
pub struct ChatManagerBuilder {
    pub(crate) gateway: GatewayClient,
    pub(crate) caller_id: String,
}

impl ChatManagerBuilder {
    /// Creates a new builder with the specified gateway.
    #[inline]
    pub fn with_gateway<G: AssistantGateway + 'static>(gateway: G) -> Self {
        Self {
            gateway: GatewayClient::new(gateway),
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        }
    }

    /// Sets the caller id sent with every turn.
    ///
    /// Defaults to [`ANONYMOUS_CALLER_ID`].
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
    pub fn build(self) -> ChatManager {
        ChatManager::spawn_from_builder(self)
    }
}
