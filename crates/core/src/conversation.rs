//! Conversation-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use support_desk_gateway::{ChatTurnResponse, Source};

/// Answers at or above this confidence are considered reliable.
pub const HIGH_CONFIDENCE: f64 = 0.7;
/// Answers below this confidence are considered unreliable.
pub const MEDIUM_CONFIDENCE: f64 = 0.4;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking for support.
    User,
    /// The remote assistant.
    Assistant,
}

/// A coarse bucket for an answer's confidence score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfidenceLevel {
    /// Below [`MEDIUM_CONFIDENCE`].
    Low,
    /// At least [`MEDIUM_CONFIDENCE`] but below [`HIGH_CONFIDENCE`].
    Medium,
    /// At least [`HIGH_CONFIDENCE`].
    High,
}

impl ConfidenceLevel {
    /// Buckets a score in `[0, 1]`.
    #[inline]
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            ConfidenceLevel::High
        } else if score >= MEDIUM_CONFIDENCE {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Extra information the assistant attached to an answer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// Confidence in `[0, 1]`; `0` when the gateway didn't report one.
    pub confidence: f64,
    /// Documents the answer cites.
    pub sources: Vec<Source>,
    /// Whether a safety check fired on the user's message.
    pub guardrail_triggered: bool,
    /// Which safety check fired.
    pub guardrail_type: Option<String>,
    /// The tool the assistant used, if any.
    pub tool_used: Option<String>,
    /// The meeting booked while answering, if any.
    pub meeting_id: Option<String>,
}

impl Annotations {
    /// Returns the bucket the confidence falls in.
    #[inline]
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

/// A message in the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub(crate) role: Role,
    pub(crate) content: String,
    pub(crate) timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) annotations: Option<Annotations>,
}

impl Message {
    pub(crate) fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
            timestamp: Utc::now(),
            annotations: None,
        }
    }

    pub(crate) fn assistant(resp: ChatTurnResponse) -> Self {
        let confidence = resp.confidence.map_or(0.0, clamp_score);
        let mut sources = resp.sources.unwrap_or_default();
        for source in &mut sources {
            source.relevance_score = source.relevance_score.map(clamp_score);
        }
        let guardrail_triggered = resp
            .guardrail_triggered
            .unwrap_or(resp.guardrail_type.is_some());

        Self {
            role: Role::Assistant,
            content: resp.content,
            timestamp: Utc::now(),
            annotations: Some(Annotations {
                confidence,
                sources,
                guardrail_triggered,
                guardrail_type: resp.guardrail_type,
                tool_used: resp.tool_used,
                meeting_id: resp.meeting_id,
            }),
        }
    }

    /// Returns who authored this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the message text. Assistant messages may contain markdown.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message was added to the conversation.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the annotations of an assistant message.
    ///
    /// User messages never carry annotations.
    #[inline]
    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }

    /// Returns the documents this message cites, if any.
    #[inline]
    pub fn sources(&self) -> &[Source] {
        self.annotations
            .as_ref()
            .map(|annotations| annotations.sources.as_slice())
            .unwrap_or_default()
    }
}

/// Clamps a score reported by the gateway into `[0, 1]`.
fn clamp_score(score: f64) -> f64 {
    if (0.0..=1.0).contains(&score) {
        return score;
    }
    warn!("clamping out-of-range score {score}");
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}

/// Represents a conversation.
#[derive(Clone, Default, Debug)]
pub(crate) struct Conversation {
    pub(crate) id: Option<String>,
    pub(crate) messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(ConfidenceLevel::from_score(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.4), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.1), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::Low);
    }

    #[test]
    fn test_assistant_message_defaults() {
        let msg = Message::assistant(ChatTurnResponse::new("Hi", "c-1"));
        let annotations = msg.annotations().unwrap();
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(annotations.confidence, 0.0);
        assert_eq!(annotations.confidence_level(), ConfidenceLevel::Low);
        assert!(!annotations.guardrail_triggered);
        assert!(msg.sources().is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let mut resp = ChatTurnResponse::new("Hi", "c-1");
        resp.confidence = Some(1.7);
        let msg = Message::assistant(resp.clone());
        assert_eq!(msg.annotations().unwrap().confidence, 1.0);

        resp.confidence = Some(-0.2);
        let msg = Message::assistant(resp.clone());
        assert_eq!(msg.annotations().unwrap().confidence, 0.0);

        resp.confidence = Some(f64::NAN);
        resp.sources = Some(vec![Source {
            relevance_score: Some(3.0),
            ..Default::default()
        }]);
        let msg = Message::assistant(resp);
        assert_eq!(msg.annotations().unwrap().confidence, 0.0);
        assert_eq!(msg.sources()[0].relevance_score, Some(1.0));
    }

    #[test]
    fn test_guardrail_type_implies_trigger() {
        let mut resp = ChatTurnResponse::new("I can't help with that.", "c-1");
        resp.guardrail_type = Some("off_topic".to_owned());
        let msg = Message::assistant(resp);
        assert!(msg.annotations().unwrap().guardrail_triggered);
    }

    #[test]
    fn test_user_message_serializes_without_annotations() {
        let msg = Message::user("Hello".to_owned());
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "Hello");
        assert!(value["timestamp"].is_string());
        assert!(value.get("annotations").is_none());
    }
}
