use serde::{Deserialize, Serialize};

/// The caller identity sent with every request.
///
/// There is no sign-in, so every caller is the same anonymous user.
pub const ANONYMOUS_CALLER_ID: &str = "anonymous";

/// One user turn of a text conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    /// The user's message.
    pub message: String,
    /// The conversation to continue. `None` starts a new one.
    pub conversation_id: Option<String>,
    /// Who is asking.
    pub caller_id: String,
}

/// A request to call the user back on the phone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StartVoiceRequest {
    /// The number to dial.
    pub phone_number: String,
    /// Who is asking.
    pub caller_id: String,
}

/// A request to hang up a call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndVoiceRequest {
    /// The session returned when the call was started.
    pub session_id: String,
    /// Why the call is being ended, e.g. `user_ended`.
    pub reason: String,
}
