use support_desk_core::{
    ChatManager, ChatManagerBuilder, VoiceSessionBuilder, VoiceSessionManager,
};
use support_desk_gateway::AssistantGateway;

/// A support desk builder.
///
/// See [`SupportDesk`].
pub struct SupportDeskBuilder {
    chat_builder: ChatManagerBuilder,
    voice_builder: VoiceSessionBuilder,
}

impl SupportDeskBuilder {
    /// Creates a support desk builder with a specified gateway.
    ///
    /// The chat and voice managers each get their own clone of `gateway`.
    pub fn with_gateway<G: AssistantGateway + Clone + 'static>(
        gateway: G,
    ) -> Self {
        Self {
            chat_builder: ChatManagerBuilder::with_gateway(gateway.clone()),
            voice_builder: VoiceSessionBuilder::with_gateway(gateway),
        }
    }

    /// Sets the caller id sent with chat turns and call requests.
    #[inline]
    pub fn with_caller_id<S: Into<String>>(mut self, caller_id: S) -> Self {
        let caller_id = caller_id.into();
        self.chat_builder = self.chat_builder.with_caller_id(caller_id.clone());
        self.voice_builder = self.voice_builder.with_caller_id(caller_id);
        self
    }

    /// Builds a new support desk.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> SupportDesk {
        SupportDesk {
            chat: self.chat_builder.build(),
            voice: self.voice_builder.build(),
        }
    }
}

/// The client side of a support desk, like a window with a chat pane and
/// a call button.
///
/// The chat and the call are independent of each other; a call can be
/// placed while a chat turn is in flight and vice versa.
pub struct SupportDesk {
    chat: ChatManager,
    voice: VoiceSessionManager,
}

impl SupportDesk {
    /// Returns the chat manager.
    #[inline]
    pub fn chat(&self) -> &ChatManager {
        &self.chat
    }

    /// Returns the voice session manager.
    #[inline]
    pub fn voice(&self) -> &VoiceSessionManager {
        &self.voice
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use support_desk_core::{USER_ENDED_REASON, VoiceStatus};
    use support_desk_test_gateway::{
        PresetReply, RecordedRequest, TestGateway,
    };

    use super::*;

    #[tokio::test]
    async fn test_managers_share_the_gateway() {
        let gateway = TestGateway::default();
        gateway.add_reply(PresetReply::with_content("Hi"));
        let desk = SupportDeskBuilder::with_gateway(gateway.clone())
            .with_caller_id("user-42")
            .build();

        desk.chat().send_message("Hello").await.unwrap();
        desk.voice().start("+15551234567").await.unwrap();

        let requests = gateway.requests();
        assert_eq!(requests.len(), 2);
        let RecordedRequest::ChatTurn(turn) = &requests[0] else {
            panic!("expected a chat turn first");
        };
        let RecordedRequest::StartVoice(call) = &requests[1] else {
            panic!("expected a call request second");
        };
        assert_eq!(turn.caller_id, "user-42");
        assert_eq!(call.caller_id, "user-42");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_and_call_are_independent() {
        let gateway = TestGateway::default();
        gateway.set_delay(Duration::from_secs(1));
        gateway.add_reply(PresetReply::with_content("Hi"));
        let desk = SupportDeskBuilder::with_gateway(gateway).build();

        let answer = desk.chat().send_message("Hello");
        desk.voice().start("+15551234567").await.unwrap();
        assert_eq!(desk.voice().status(), VoiceStatus::Active);

        answer.await.unwrap();
        desk.chat().clear_conversation();
        assert_eq!(desk.voice().status(), VoiceStatus::Active);

        desk.voice().end(USER_ENDED_REASON).await.unwrap();
        assert_eq!(desk.voice().status(), VoiceStatus::Idle);
    }
}
