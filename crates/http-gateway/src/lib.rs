//! A gateway that talks JSON over HTTP to the support assistant service.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use support_desk_gateway::{
    AssistantGateway, ChatTurnRequest, ChatTurnResponse, EndVoiceRequest,
    ErrorKind, GatewayError, StartVoiceRequest, VoiceSessionEnded,
    VoiceSessionStarted,
};

pub use config::{HttpGatewayConfig, HttpGatewayConfigBuilder};

/// Error type for [`HttpGateway`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<StatusCode>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if let Some(status) = err.status() {
            kind_of_status(status)
        } else if err.is_decode() {
            ErrorKind::InvalidResponse
        } else if err.is_timeout()
            || err.is_connect()
            || err.is_request()
            || err.is_body()
        {
            ErrorKind::Transport
        } else {
            ErrorKind::Other
        };
        Self {
            message: format!("{err}"),
            kind,
            status: err.status(),
        }
    }

    /// Builds the error for an unsuccessful status, preferring the
    /// `detail` the service puts in its error bodies.
    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<proto::ErrorResponse>(body) {
            Ok(resp) => resp.detail,
            Err(_) => format!("server responded with {status}"),
        };
        Self {
            message,
            kind: kind_of_status(status),
            status: Some(status),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status the service answered with, if it answered.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        self.status.map(|status| status.as_u16())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl GatewayError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

fn kind_of_status(status: StatusCode) -> ErrorKind {
    if status.is_client_error() {
        ErrorKind::Rejected
    } else if status.is_server_error() {
        ErrorKind::Server
    } else {
        ErrorKind::InvalidResponse
    }
}

/// Gateway to the support assistant service over HTTP.
///
/// Cloning is cheap, clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    config: Arc<HttpGatewayConfig>,
}

impl HttpGateway {
    /// Creates a new `HttpGateway` with the given configuration.
    #[inline]
    pub fn new(config: HttpGatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this gateway.
    #[inline]
    pub fn config(&self) -> &HttpGatewayConfig {
        &self.config
    }

    /// Checks that the service is up and reports itself healthy.
    pub async fn check_health(&self) -> Result<(), Error> {
        let req = self
            .client
            .get(self.config.endpoint("/health"))
            .timeout(self.config.timeout);
        let health: proto::HealthResponse = exchange(req).await?;
        if health.status != "healthy" {
            return Err(Error::new(
                format!("service reports status {:?}", health.status),
                ErrorKind::Server,
            ));
        }
        Ok(())
    }

    fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> RequestBuilder {
        self.client
            .post(self.config.endpoint(path))
            .timeout(self.config.timeout)
            .header(header::ACCEPT, "application/json")
            .json(body)
    }
}

/// Sends the request and decodes a successful JSON answer.
///
/// The request is dispatched when the returned future is first polled,
/// but everything it needs is owned by then.
async fn exchange<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, Error> {
    let resp = match req.send().await {
        Ok(resp) => resp,
        Err(err) => {
            error!("request failed: {err}");
            return Err(Error::from_reqwest(err));
        }
    };
    trace!("got a response: {} {}", resp.status(), resp.url());
    read_json(resp).await.inspect_err(|err| {
        warn!("unusable response: {err} ({:?})", err.kind());
    })
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::from_status(status, &body));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let is_json = content_type
        .as_deref()
        .and_then(|v| v.parse::<Mime>().ok())
        .map(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
        .unwrap_or(false);
    if !is_json {
        return Err(Error::new(
            format!("unexpected content type: {content_type:?}"),
            ErrorKind::InvalidResponse,
        ));
    }

    let body = resp.bytes().await.map_err(Error::from_reqwest)?;
    serde_json::from_slice(&body).map_err(|err| {
        Error::new(
            format!("malformed response body: {err}"),
            ErrorKind::InvalidResponse,
        )
    })
}

impl AssistantGateway for HttpGateway {
    type Error = Error;

    fn send_chat_turn(
        &self,
        req: &ChatTurnRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static
    {
        let http_req = self.post("/api/chat", &proto::create_chat_request(req));
        async move {
            let resp: proto::ChatResponse = exchange(http_req).await?;
            Ok(proto::into_chat_response(resp))
        }
    }

    fn start_voice_session(
        &self,
        req: &StartVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionStarted, Self::Error>>
    + Send
    + 'static {
        let http_req =
            self.post("/api/voice/start", &proto::create_start_voice_body(req));
        async move {
            let resp: proto::StartVoiceResponse = exchange(http_req).await?;
            Ok(proto::into_voice_started(resp))
        }
    }

    fn end_voice_session(
        &self,
        req: &EndVoiceRequest,
    ) -> impl Future<Output = Result<VoiceSessionEnded, Self::Error>> + Send + 'static
    {
        let http_req =
            self.post("/api/voice/end", &proto::create_end_voice_body(req));
        async move {
            let resp: proto::EndVoiceResponse = exchange(http_req).await?;
            Ok(proto::into_voice_ended(resp))
        }
    }
}

#[cfg(test)]
mod tests {
    use support_desk_gateway::ANONYMOUS_CALLER_ID;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serves one canned HTTP response and hands back the raw request.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (HttpGateway, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).into_owned();
                let Some(head_end) = text.find("\r\n\r\n") else {
                    continue;
                };
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + content_length {
                    break;
                }
            }
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8(raw).unwrap()
        });
        let config = HttpGatewayConfigBuilder::new()
            .with_base_url(format!("http://{addr}"))
            .build();
        (HttpGateway::new(config), server)
    }

    fn chat_turn(conversation_id: Option<&str>) -> ChatTurnRequest {
        ChatTurnRequest {
            message: "My Mac won't boot".to_owned(),
            conversation_id: conversation_id.map(ToOwned::to_owned),
            caller_id: ANONYMOUS_CALLER_ID.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_send_chat_turn() {
        let (gateway, server) = serve_once(
            "200 OK",
            "application/json",
            r#"{"message":"Try Safe Mode.","conversation_id":"c1","sources":[],"confidence":0.6,"metadata":{"guardrail_triggered":false}}"#,
        )
        .await;
        let resp = gateway.send_chat_turn(&chat_turn(Some("c1"))).await.unwrap();
        assert_eq!(resp.content, "Try Safe Mode.");
        assert_eq!(resp.conversation_id, "c1");
        assert_eq!(resp.confidence, Some(0.6));
        assert_eq!(resp.sources, Some(vec![]));

        let raw_req = server.await.unwrap();
        assert!(raw_req.starts_with("POST /api/chat HTTP/1.1\r\n"));
        assert!(raw_req.contains(r#""conversation_id":"c1""#));
        assert!(raw_req.contains(r#""user_id":"anonymous""#));
    }

    #[tokio::test]
    async fn test_server_error_detail() {
        let (gateway, server) = serve_once(
            "500 Internal Server Error",
            "application/json",
            r#"{"detail":"Vapi API key not configured"}"#,
        )
        .await;
        let err = gateway
            .start_voice_session(&StartVoiceRequest {
                phone_number: "+15551234567".to_owned(),
                caller_id: ANONYMOUS_CALLER_ID.to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message(), "Vapi API key not configured");

        let raw_req = server.await.unwrap();
        assert!(raw_req.starts_with("POST /api/voice/start HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_not_found_is_rejected() {
        let (gateway, _server) =
            serve_once("404 Not Found", "text/plain", "no such session").await;
        let err = gateway
            .end_voice_session(&EndVoiceRequest {
                session_id: "gone".to_owned(),
                reason: "user_ended".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.message(), "server responded with 404 Not Found");
    }

    #[tokio::test]
    async fn test_unexpected_content_type() {
        let (gateway, _server) =
            serve_once("200 OK", "text/html", "<html></html>").await;
        let err = gateway.send_chat_turn(&chat_turn(None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (gateway, _server) =
            serve_once("200 OK", "application/json", r#"{"status":"ok"}"#)
                .await;
        let err = gateway.send_chat_turn(&chat_turn(None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpGateway::new(
            HttpGatewayConfigBuilder::new()
                .with_base_url(format!("http://{addr}"))
                .build(),
        );
        let err = gateway.send_chat_turn(&chat_turn(None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_check_health() {
        let (gateway, server) =
            serve_once("200 OK", "application/json", r#"{"status":"healthy"}"#)
                .await;
        gateway.check_health().await.unwrap();
        let raw_req = server.await.unwrap();
        assert!(raw_req.starts_with("GET /health HTTP/1.1\r\n"));

        let (gateway, _server) = serve_once(
            "200 OK",
            "application/json",
            r#"{"status":"degraded"}"#,
        )
        .await;
        let err = gateway.check_health().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }
}
