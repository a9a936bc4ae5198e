use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;

use support_desk_gateway::{
    AssistantGateway, ChatTurnRequest, ChatTurnResponse, EndVoiceRequest,
    GatewayError, StartVoiceRequest, VoiceSessionEnded, VoiceSessionStarted,
};
use tracing::Instrument;

use crate::error::Error;

type GatewayResult<T> = Result<T, Box<dyn GatewayError>>;
type BoxedGatewayFuture<T> =
    Pin<Box<dyn Future<Output = GatewayResult<T>> + Send>>;
#[rustfmt::skip]
type HandlerFn<Req, Resp> = Arc<
    dyn Fn(&Req) -> BoxedGatewayFuture<Resp> + Send + Sync
>;

/// A wrapper around a gateway that provides a type-erased interface for
/// the chat and voice managers.
#[derive(Clone)]
pub struct GatewayClient {
    chat_fn: HandlerFn<ChatTurnRequest, ChatTurnResponse>,
    start_voice_fn: HandlerFn<StartVoiceRequest, VoiceSessionStarted>,
    end_voice_fn: HandlerFn<EndVoiceRequest, VoiceSessionEnded>,
}

impl GatewayClient {
    pub fn new<G: AssistantGateway + 'static>(gateway: G) -> Self {
        // All three handlers share one gateway, so `G` is erased behind
        // the closures instead of becoming a type parameter here.
        let gateway = Arc::new(gateway);
        let chat_fn: HandlerFn<ChatTurnRequest, ChatTurnResponse> = {
            let gateway = Arc::clone(&gateway);
            Arc::new(move |req: &ChatTurnRequest| {
                erase(gateway.send_chat_turn(req))
            })
        };
        let start_voice_fn: HandlerFn<StartVoiceRequest, VoiceSessionStarted> = {
            let gateway = Arc::clone(&gateway);
            Arc::new(move |req: &StartVoiceRequest| {
                erase(gateway.start_voice_session(req))
            })
        };
        let end_voice_fn: HandlerFn<EndVoiceRequest, VoiceSessionEnded> =
            Arc::new(move |req: &EndVoiceRequest| {
                erase(gateway.end_voice_session(req))
            });
        Self {
            chat_fn,
            start_voice_fn,
            end_voice_fn,
        }
    }

    /// Sends one chat turn.
    ///
    /// The request is handed to the gateway before this returns, so the
    /// future doesn't borrow `self`.
    pub fn send_chat_turn(
        &self,
        req: ChatTurnRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Error>> + Send + 'static
    {
        let fut = (self.chat_fn)(&req);
        call(fut, req).instrument(trace_span!("gateway", op = "chat turn"))
    }

    pub fn start_voice_session(
        &self,
        req: StartVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionStarted, Error>> + Send + 'static
    {
        let fut = (self.start_voice_fn)(&req);
        call(fut, req)
            .instrument(trace_span!("gateway", op = "start voice session"))
    }

    pub fn end_voice_session(
        &self,
        req: EndVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionEnded, Error>> + Send + 'static
    {
        let fut = (self.end_voice_fn)(&req);
        call(fut, req)
            .instrument(trace_span!("gateway", op = "end voice session"))
    }
}

fn erase<T, E, F>(fut: F) -> BoxedGatewayFuture<T>
where
    E: GatewayError,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::pin(async move {
        fut.await.map_err(|err| Box::new(err) as Box<dyn GatewayError>)
    })
}

async fn call<Req: Debug, Resp: Debug>(
    fut: BoxedGatewayFuture<Resp>,
    req: Req,
) -> Result<Resp, Error> {
    trace!("got a request: {req:?}");
    match fut.await {
        Ok(resp) => {
            trace!("got a response: {resp:?}");
            Ok(resp)
        }
        Err(err) => {
            error!("got an error: {err:?}");
            Err(Error::remote(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use support_desk_gateway::{
        ANONYMOUS_CALLER_ID, ErrorKind as GatewayErrorKind,
    };
    use support_desk_test_gateway::{PresetReply, TestGateway};

    use super::*;
    use crate::error::ErrorKind;

    fn chat_request(message: &str) -> ChatTurnRequest {
        ChatTurnRequest {
            message: message.to_owned(),
            conversation_id: None,
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_send_chat_turn() {
        let gateway = TestGateway::default();
        gateway.add_reply(PresetReply::with_content("Hi").with_confidence(0.8));
        let client = GatewayClient::new(gateway.clone());

        // The future must not depend on the client staying alive.
        let fut = client.send_chat_turn(chat_request("Hello"));
        drop(client);
        let resp = tokio::spawn(fut).await.unwrap().unwrap();
        assert_eq!(resp.content, "Hi");
        assert_eq!(resp.confidence, Some(0.8));
        assert_eq!(gateway.chat_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let gateway = TestGateway::default();
        gateway.add_failure(GatewayErrorKind::Rejected);
        let client = GatewayClient::new(gateway);

        let err = client
            .send_chat_turn(chat_request("Hello"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote(GatewayErrorKind::Rejected));
    }
}
