use serde::{Deserialize, Serialize};

/// Title shown for sources that don't carry one.
pub const DEFAULT_SOURCE_TITLE: &str = "Support Documentation";

/// A document the assistant cited in its answer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    /// Title of the document.
    pub title: Option<String>,
    /// Where the document can be read.
    pub url: Option<String>,
    /// The product the document is about.
    pub product: Option<String>,
    /// What kind of document it is, e.g. an article or a manual.
    pub content_type: Option<String>,
    /// How relevant the document was to the question, in `[0, 1]`.
    pub relevance_score: Option<f64>,
}

impl Source {
    /// Returns the title, or a generic label if the source has none.
    #[inline]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_SOURCE_TITLE)
    }
}

/// The assistant's answer to a chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    /// The answer text. May contain markdown.
    pub content: String,
    /// How confident the assistant is in the answer, in `[0, 1]`.
    pub confidence: Option<f64>,
    /// Documents the answer is based on.
    pub sources: Option<Vec<Source>>,
    /// The conversation this turn was recorded in.
    pub conversation_id: String,
    /// Whether a safety check fired on the user's message.
    pub guardrail_triggered: Option<bool>,
    /// Which safety check fired.
    pub guardrail_type: Option<String>,
    /// The tool the assistant used to produce the answer, if any.
    pub tool_used: Option<String>,
    /// The meeting booked while answering, if any.
    pub meeting_id: Option<String>,
}

impl ChatTurnResponse {
    /// Creates a plain response with no metadata.
    #[inline]
    pub fn new<S1: Into<String>, S2: Into<String>>(
        content: S1,
        conversation_id: S2,
    ) -> Self {
        Self {
            content: content.into(),
            confidence: None,
            sources: None,
            conversation_id: conversation_id.into(),
            guardrail_triggered: None,
            guardrail_type: None,
            tool_used: None,
            meeting_id: None,
        }
    }
}

/// The gateway's answer to [`StartVoiceRequest`](crate::StartVoiceRequest).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceSessionStarted {
    /// Identifies the call in later requests.
    pub session_id: String,
    /// Status reported by the gateway, e.g. `active`.
    pub status: Option<String>,
    /// The remote voice assistant handling the call.
    pub assistant_id: Option<String>,
}

/// The gateway's answer to [`EndVoiceRequest`](crate::EndVoiceRequest).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceSessionEnded {
    /// The session that was ended.
    pub session_id: Option<String>,
    /// Status reported by the gateway, e.g. `ended`.
    pub status: Option<String>,
    /// How long the call lasted according to the gateway, in seconds.
    pub duration_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display_title() {
        let mut source = Source::default();
        assert_eq!(source.display_title(), DEFAULT_SOURCE_TITLE);

        source.title = Some("  ".to_owned());
        assert_eq!(source.display_title(), DEFAULT_SOURCE_TITLE);

        source.title = Some("Reset your AirPods".to_owned());
        assert_eq!(source.display_title(), "Reset your AirPods");
    }
}
