use serde::{Deserialize, Serialize};
use support_desk_gateway::{
    ChatTurnRequest, ChatTurnResponse, EndVoiceRequest, Source,
    StartVoiceRequest, VoiceSessionEnded, VoiceSessionStarted,
};

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequest<'a> {
    message: &'a str,
    conversation_id: Option<&'a str>,
    user_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StartVoiceBody<'a> {
    phone_number: &'a str,
    user_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EndVoiceBody<'a> {
    session_id: &'a str,
    reason: &'a str,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatMetadata {
    pub guardrail_triggered: Option<bool>,
    pub guardrail_type: Option<String>,
    pub tool_used: Option<String>,
    pub meeting_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub conversation_id: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub metadata: Option<ChatMetadata>,
    // Also accept the metadata fields at the top level.
    #[serde(flatten)]
    pub top_level: ChatMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StartVoiceResponse {
    pub session_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub vapi_assistant_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EndVoiceResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// The error body the service answers with on failures.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_chat_request(req: &ChatTurnRequest) -> ChatRequest<'_> {
    ChatRequest {
        message: &req.message,
        conversation_id: req.conversation_id.as_deref(),
        user_id: &req.caller_id,
    }
}

#[inline]
pub fn create_start_voice_body(req: &StartVoiceRequest) -> StartVoiceBody<'_> {
    StartVoiceBody {
        phone_number: &req.phone_number,
        user_id: &req.caller_id,
    }
}

#[inline]
pub fn create_end_voice_body(req: &EndVoiceRequest) -> EndVoiceBody<'_> {
    EndVoiceBody {
        session_id: &req.session_id,
        reason: &req.reason,
    }
}

pub fn into_chat_response(resp: ChatResponse) -> ChatTurnResponse {
    let ChatResponse {
        message,
        conversation_id,
        sources,
        confidence,
        metadata,
        top_level,
    } = resp;
    let nested = metadata.unwrap_or_default();
    ChatTurnResponse {
        content: message,
        confidence,
        sources,
        conversation_id,
        guardrail_triggered: top_level
            .guardrail_triggered
            .or(nested.guardrail_triggered),
        guardrail_type: top_level.guardrail_type.or(nested.guardrail_type),
        tool_used: top_level.tool_used.or(nested.tool_used),
        meeting_id: top_level.meeting_id.or(nested.meeting_id),
    }
}

#[inline]
pub fn into_voice_started(resp: StartVoiceResponse) -> VoiceSessionStarted {
    VoiceSessionStarted {
        session_id: resp.session_id,
        status: resp.status,
        assistant_id: resp.vapi_assistant_id,
    }
}

#[inline]
pub fn into_voice_ended(resp: EndVoiceResponse) -> VoiceSessionEnded {
    VoiceSessionEnded {
        session_id: resp.session_id,
        status: resp.status,
        duration_secs: resp.duration,
    }
}
