use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::time::Duration;

use support_desk_gateway::{
    ANONYMOUS_CALLER_ID, AssistantGateway, ChatTurnRequest, ChatTurnResponse,
    EndVoiceRequest, ErrorKind, GatewayError, StartVoiceRequest,
    VoiceSessionEnded, VoiceSessionStarted,
};
use tokio::time::sleep;

#[derive(Debug)]
struct FakeGatewayError(ErrorKind);

impl Display for FakeGatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeGatewayError {}

impl GatewayError for FakeGatewayError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes chat turns back and accepts every call.
struct EchoGateway;

impl AssistantGateway for EchoGateway {
    type Error = FakeGatewayError;

    fn send_chat_turn(
        &self,
        req: &ChatTurnRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static
    {
        let result = if req.message.is_empty() {
            Err(FakeGatewayError(ErrorKind::Rejected))
        } else {
            let conversation_id = req
                .conversation_id
                .clone()
                .unwrap_or_else(|| "conversation:0".to_owned());
            Ok(ChatTurnResponse::new(
                format!("You said {}", req.message),
                conversation_id,
            ))
        };
        async move {
            // Pretend to go over the network.
            sleep(Duration::from_millis(1)).await;
            result
        }
    }

    fn start_voice_session(
        &self,
        req: &StartVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionStarted, Self::Error>>
    + Send
    + 'static {
        ready(Ok(VoiceSessionStarted {
            session_id: format!("session:{}", req.phone_number),
            status: Some("active".to_owned()),
            assistant_id: None,
        }))
    }

    fn end_voice_session(
        &self,
        req: &EndVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionEnded, Self::Error>> + Send + 'static
    {
        ready(Ok(VoiceSessionEnded {
            session_id: Some(req.session_id.clone()),
            status: Some("ended".to_owned()),
            duration_secs: None,
        }))
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_future_outlives_request() {
        let gateway = EchoGateway;
        let fut = {
            let req = ChatTurnRequest {
                message: "Good morning".to_owned(),
                conversation_id: None,
                caller_id: ANONYMOUS_CALLER_ID.to_owned(),
            };
            gateway.send_chat_turn(&req)
        };
        let resp = tokio::spawn(fut).await.unwrap().unwrap();
        assert_eq!(resp.content, "You said Good morning");
        assert_eq!(resp.conversation_id, "conversation:0");
        assert_eq!(resp.confidence, None);
    }

    #[tokio::test]
    async fn test_error() {
        let gateway = EchoGateway;
        let req = ChatTurnRequest {
            message: String::new(),
            conversation_id: Some("conversation:1".to_owned()),
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        };
        let err = gateway.send_chat_turn(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
    }

    #[tokio::test]
    async fn test_voice_round() {
        let gateway = EchoGateway;
        let started = gateway
            .start_voice_session(&StartVoiceRequest {
                phone_number: "+15551234567".to_owned(),
                caller_id: ANONYMOUS_CALLER_ID.to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(started.session_id, "session:+15551234567");

        let ended = gateway
            .end_voice_session(&EndVoiceRequest {
                session_id: started.session_id.clone(),
                reason: "user_ended".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(ended.session_id.as_deref(), Some("session:+15551234567"));
    }
}
