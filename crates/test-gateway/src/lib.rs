//! A scripted, in-process gateway for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use support_desk_gateway::{
    AssistantGateway, ChatTurnRequest, ChatTurnResponse, EndVoiceRequest,
    ErrorKind, GatewayError, StartVoiceRequest, VoiceSessionEnded,
    VoiceSessionStarted,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl GatewayError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A request as the gateway received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedRequest {
    /// A chat turn.
    ChatTurn(ChatTurnRequest),
    /// A call request.
    StartVoice(StartVoiceRequest),
    /// A hang-up request.
    EndVoice(EndVoiceRequest),
}

#[derive(Default)]
struct Script {
    chat_steps: VecDeque<PresetStep>,
    voice_start_failures: VecDeque<ErrorKind>,
    voice_end_failures: VecDeque<ErrorKind>,
    delay: Option<Duration>,
    conversations_created: u64,
    sessions_created: u64,
    requests: Vec<RecordedRequest>,
}

impl Script {
    fn conversation_id_for(
        &mut self,
        req: &ChatTurnRequest,
        preset: Option<String>,
    ) -> String {
        if let Some(id) = preset.or_else(|| req.conversation_id.clone()) {
            return id;
        }
        self.conversations_created += 1;
        format!("conversation:{}", self.conversations_created)
    }
}

/// A fake gateway that answers from a script.
///
/// Chat turns consume the scripted steps in order; once the script runs
/// out, every further turn fails. Voice calls always succeed unless a
/// failure has been queued for the next one. Each call to the gateway is
/// recorded, so tests can check what the client actually sent.
///
/// Clones share the same script and recordings, which lets a test keep a
/// handle after giving the gateway away.
#[derive(Clone, Default)]
pub struct TestGateway {
    script: Arc<Mutex<Script>>,
}

impl TestGateway {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answers the next unscripted chat turn with `reply`.
    #[inline]
    pub fn add_reply(&self, reply: PresetReply) {
        self.script().chat_steps.push_back(PresetStep::Reply(reply));
    }

    /// Fails the next unscripted chat turn.
    #[inline]
    pub fn add_failure(&self, kind: ErrorKind) {
        self.script().chat_steps.push_back(PresetStep::Failure(kind));
    }

    /// Appends several steps at once, e.g. a script loaded from JSON.
    #[inline]
    pub fn add_steps(&self, steps: impl IntoIterator<Item = PresetStep>) {
        self.script().chat_steps.extend(steps);
    }

    /// Fails the next call request that has no failure queued yet.
    #[inline]
    pub fn fail_next_voice_start(&self, kind: ErrorKind) {
        self.script().voice_start_failures.push_back(kind);
    }

    /// Fails the next hang-up request that has no failure queued yet.
    #[inline]
    pub fn fail_next_voice_end(&self, kind: ErrorKind) {
        self.script().voice_end_failures.push_back(kind);
    }

    /// Delays every answer by `duration`.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.script().delay = Some(duration);
    }

    /// Returns every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script().requests.clone()
    }

    /// Returns the chat turns received so far, oldest first.
    pub fn chat_requests(&self) -> Vec<ChatTurnRequest> {
        self.script()
            .requests
            .iter()
            .filter_map(|req| match req {
                RecordedRequest::ChatTurn(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }
}

async fn answer_after<T>(delay: Option<Duration>, answer: T) -> T {
    if let Some(delay) = delay {
        sleep(delay).await;
    }
    answer
}

impl AssistantGateway for TestGateway {
    type Error = crate::Error;

    fn send_chat_turn(
        &self,
        req: &ChatTurnRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.requests.push(RecordedRequest::ChatTurn(req.clone()));
        let answer = match script.chat_steps.pop_front() {
            Some(PresetStep::Reply(reply)) => {
                let preset_id = reply.conversation_id.clone();
                let conversation_id = script.conversation_id_for(req, preset_id);
                Ok(reply.into_response(conversation_id))
            }
            Some(PresetStep::Failure(kind)) => Err(Error {
                message: "scripted failure",
                kind,
            }),
            None => Err(Error {
                message: "no more scripted steps",
                kind: ErrorKind::Other,
            }),
        };
        answer_after(script.delay, answer)
    }

    fn start_voice_session(
        &self,
        req: &StartVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionStarted, Self::Error>>
    + Send
    + 'static {
        let mut script = self.script();
        script.requests.push(RecordedRequest::StartVoice(req.clone()));
        let answer = match script.voice_start_failures.pop_front() {
            Some(kind) => Err(Error {
                message: "scripted failure",
                kind,
            }),
            None => {
                script.sessions_created += 1;
                Ok(VoiceSessionStarted {
                    session_id: format!("session:{}", script.sessions_created),
                    status: Some("active".to_owned()),
                    assistant_id: None,
                })
            }
        };
        answer_after(script.delay, answer)
    }

    fn end_voice_session(
        &self,
        req: &EndVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionEnded, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.requests.push(RecordedRequest::EndVoice(req.clone()));
        let answer = match script.voice_end_failures.pop_front() {
            Some(kind) => Err(Error {
                message: "scripted failure",
                kind,
            }),
            None => Ok(VoiceSessionEnded {
                session_id: Some(req.session_id.clone()),
                status: Some("ended".to_owned()),
                duration_secs: None,
            }),
        };
        answer_after(script.delay, answer)
    }
}

#[cfg(test)]
mod tests {
    use support_desk_gateway::ANONYMOUS_CALLER_ID;
    use tokio::time::Instant;

    use super::*;

    fn turn(message: &str, conversation_id: Option<&str>) -> ChatTurnRequest {
        ChatTurnRequest {
            message: message.to_owned(),
            conversation_id: conversation_id.map(ToOwned::to_owned),
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_follows_the_script() {
        let gateway = TestGateway::default();
        gateway.add_reply(
            PresetReply::with_content("Hi, how can I help?")
                .with_confidence(0.8),
        );
        gateway.add_failure(ErrorKind::Server);
        gateway.add_reply(PresetReply::with_content("Try restarting it."));

        let resp = gateway.send_chat_turn(&turn("Hello", None)).await.unwrap();
        assert_eq!(resp.content, "Hi, how can I help?");
        assert_eq!(resp.confidence, Some(0.8));
        assert_eq!(resp.conversation_id, "conversation:1");

        let err = gateway
            .send_chat_turn(&turn("My phone is stuck", Some("conversation:1")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);

        let resp = gateway
            .send_chat_turn(&turn("My phone is stuck", Some("conversation:1")))
            .await
            .unwrap();
        assert_eq!(resp.conversation_id, "conversation:1");

        // The script is exhausted.
        let err = gateway
            .send_chat_turn(&turn("Thanks", Some("conversation:1")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        assert_eq!(gateway.chat_requests().len(), 4);
    }

    #[tokio::test]
    async fn test_preset_conversation_id_wins() {
        let gateway = TestGateway::default();
        gateway.add_reply(
            PresetReply::with_content("Hi").with_conversation_id("other"),
        );
        let resp = gateway
            .send_chat_turn(&turn("Hello", Some("conversation:7")))
            .await
            .unwrap();
        assert_eq!(resp.conversation_id, "other");
    }

    #[tokio::test]
    async fn test_voice_sessions() {
        let gateway = TestGateway::default();
        gateway.fail_next_voice_start(ErrorKind::Transport);

        let start = StartVoiceRequest {
            phone_number: "+15551234567".to_owned(),
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        };
        let err = gateway.start_voice_session(&start).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let started = gateway.start_voice_session(&start).await.unwrap();
        assert_eq!(started.session_id, "session:1");

        let end = EndVoiceRequest {
            session_id: started.session_id,
            reason: "user_ended".to_owned(),
        };
        let ended = gateway.end_voice_session(&end).await.unwrap();
        assert_eq!(ended.session_id.as_deref(), Some("session:1"));

        assert_eq!(
            gateway.requests(),
            vec![
                RecordedRequest::StartVoice(start.clone()),
                RecordedRequest::StartVoice(start),
                RecordedRequest::EndVoice(end),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let gateway = TestGateway::default();
        gateway.set_delay(Duration::from_secs(2));
        gateway.add_reply(PresetReply::with_content("Hi"));

        let begin = Instant::now();
        gateway.send_chat_turn(&turn("Hello", None)).await.unwrap();
        assert!(begin.elapsed() >= Duration::from_secs(2));
    }
}
