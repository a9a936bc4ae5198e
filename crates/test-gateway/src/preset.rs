use serde::{Deserialize, Serialize};
use support_desk_gateway::{ChatTurnResponse, ErrorKind, Source};

/// One scripted outcome for a chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PresetStep {
    /// Answer with the reply.
    Reply(PresetReply),
    /// Fail with an error of this kind.
    Failure(ErrorKind),
}

/// The preset answer for a chat turn.
///
/// A preset without a conversation identity echoes the one from the
/// request, or makes up a fresh one on the first turn, like the real
/// service does.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetReply {
    /// The answer text.
    pub content: String,
    /// Confidence score to report, if any.
    pub confidence: Option<f64>,
    /// Sources to report. Reported as absent when empty.
    pub sources: Vec<Source>,
    /// Overrides the conversation identity in the response.
    pub conversation_id: Option<String>,
    /// Marks the answer as produced by this safety check.
    pub guardrail_type: Option<String>,
    /// The tool the assistant claims to have used.
    pub tool_used: Option<String>,
    /// The meeting the assistant claims to have booked.
    pub meeting_id: Option<String>,
}

impl PresetReply {
    /// Creates a `PresetReply` with the specified content.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Sets the confidence score.
    #[inline]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets the cited sources.
    #[inline]
    pub fn with_sources(mut self, sources: impl Into<Vec<Source>>) -> Self {
        self.sources = sources.into();
        self
    }

    /// Forces the conversation identity in the response.
    #[inline]
    pub fn with_conversation_id<S: Into<String>>(mut self, id: S) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Reports that a safety check of this type fired.
    #[inline]
    pub fn with_guardrail<S: Into<String>>(mut self, guardrail_type: S) -> Self {
        self.guardrail_type = Some(guardrail_type.into());
        self
    }

    /// Reports a tool call, optionally with the meeting it booked.
    #[inline]
    pub fn with_tool<S: Into<String>>(
        mut self,
        tool_used: S,
        meeting_id: Option<String>,
    ) -> Self {
        self.tool_used = Some(tool_used.into());
        self.meeting_id = meeting_id;
        self
    }

    pub(crate) fn into_response(
        self,
        conversation_id: String,
    ) -> ChatTurnResponse {
        let guardrail_triggered = self.guardrail_type.as_ref().map(|_| true);
        ChatTurnResponse {
            content: self.content,
            confidence: self.confidence,
            sources: (!self.sources.is_empty()).then_some(self.sources),
            conversation_id,
            guardrail_triggered,
            guardrail_type: self.guardrail_type,
            tool_used: self.tool_used,
            meeting_id: self.meeting_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_script_from_json() {
        let script = r#"[
            {"type": "reply", "data": {
                "content": "Hold the power button for ten seconds.",
                "confidence": 0.9,
                "sources": [{"title": "Restart your iPhone", "relevance_score": 0.82}]
            }},
            {"type": "failure", "data": "server"},
            {"type": "reply", "data": {
                "content": "I can't help with that.",
                "guardrail_type": "personal_info"
            }}
        ]"#;
        let steps: Vec<PresetStep> = serde_json::from_str(script).unwrap();
        assert_eq!(steps.len(), 3);

        let PresetStep::Reply(first) = &steps[0] else {
            panic!("unexpected step: {:?}", steps[0]);
        };
        assert_eq!(first.confidence, Some(0.9));
        assert_eq!(first.sources[0].display_title(), "Restart your iPhone");
        assert_eq!(first.sources[0].url, None);

        assert_eq!(steps[1], PresetStep::Failure(ErrorKind::Server));

        let PresetStep::Reply(third) = steps[2].clone() else {
            panic!("unexpected step: {:?}", steps[2]);
        };
        let resp = third.into_response("conversation:1".to_owned());
        assert_eq!(resp.guardrail_triggered, Some(true));
        assert_eq!(resp.guardrail_type.as_deref(), Some("personal_info"));
        assert_eq!(resp.sources, None);
        assert_eq!(resp.confidence, None);
    }
}
