//! Turns the model's raw text into a [`ChatReply`].
//!
//! Models often wrap JSON in a Markdown code fence. The framing is classified
//! first and stripped accordingly; whatever remains must decode into a valid
//! reply, otherwise the cleaned text becomes a plain chat message.

use crate::error::{CoreError, Result};
use crate::model::ChatReply;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// How the reply text opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningFence {
    None,
    Generic,
    JsonTagged,
}

impl OpeningFence {
    pub fn classify(text: &str) -> Self {
        if text.starts_with(JSON_FENCE) {
            OpeningFence::JsonTagged
        } else if text.starts_with(FENCE) {
            OpeningFence::Generic
        } else {
            OpeningFence::None
        }
    }

    pub fn strip(self, text: &str) -> &str {
        match self {
            OpeningFence::None => text,
            OpeningFence::Generic => &text[FENCE.len()..],
            OpeningFence::JsonTagged => &text[JSON_FENCE.len()..],
        }
    }
}

/// How the reply text closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingFence {
    None,
    Fence,
}

impl ClosingFence {
    pub fn classify(text: &str) -> Self {
        if text.ends_with(FENCE) {
            ClosingFence::Fence
        } else {
            ClosingFence::None
        }
    }

    pub fn strip(self, text: &str) -> &str {
        match self {
            ClosingFence::None => text,
            ClosingFence::Fence => &text[..text.len() - FENCE.len()],
        }
    }
}

/// Removes an opening and a closing fence, trimming around both.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = OpeningFence::classify(text).strip(text);
    let text = ClosingFence::classify(text).strip(text);
    text.trim()
}

fn decode_reply(cleaned: &str) -> Result<ChatReply> {
    let reply: ChatReply = serde_json::from_str(cleaned)
        .map_err(|e| CoreError::InvalidReply(e.to_string()))?;
    reply.validated()
}

/// Never fails: malformed or off-schema replies fall back to a chat envelope.
pub fn normalize_reply(raw: &str) -> ChatReply {
    let cleaned = strip_fences(raw);

    match decode_reply(cleaned) {
        Ok(reply) => {
            log::debug!(
                "Parsed model reply: action={:?}, events={}",
                reply.action,
                reply.events.len()
            );
            reply
        }
        Err(e) => {
            log::warn!("Model reply is not a valid ChatReply: {}", e);
            log::warn!(
                "Raw reply text: {}",
                cleaned.chars().take(500).collect::<String>()
            );
            ChatReply::fallback(cleaned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, ReplyAction};

    #[test]
    fn classifies_opening_fences() {
        assert_eq!(OpeningFence::classify("```json\n{}"), OpeningFence::JsonTagged);
        assert_eq!(OpeningFence::classify("```\n{}"), OpeningFence::Generic);
        assert_eq!(OpeningFence::classify("```JSON\n{}"), OpeningFence::Generic);
        assert_eq!(OpeningFence::classify("{}"), OpeningFence::None);
        assert_eq!(OpeningFence::classify("{}\n```"), OpeningFence::None);
    }

    #[test]
    fn json_tag_strips_only_the_exact_marker() {
        assert_eq!(OpeningFence::JsonTagged.strip("```json\n{}"), "\n{}");
        assert_eq!(OpeningFence::Generic.strip("```JSON\n{}"), "JSON\n{}");
    }

    #[test]
    fn classifies_closing_fence() {
        assert_eq!(ClosingFence::classify("{}\n```"), ClosingFence::Fence);
        assert_eq!(ClosingFence::classify("{}"), ClosingFence::None);
        assert_eq!(ClosingFence::Fence.strip("{}\n```"), "{}\n");
    }

    #[test]
    fn unwraps_json_fenced_reply() {
        let raw = "```json\n{\"message\":\"hi\",\"action\":\"chat\",\"events\":[]}\n```";
        let reply = normalize_reply(raw);

        assert_eq!(reply, ChatReply::fallback("hi"));
    }

    #[test]
    fn unwraps_generic_fence_with_surrounding_whitespace() {
        let raw = "  \n```\n{\"message\":\"ok\",\"action\":\"query\",\"events\":[]}\n```  \n";
        let reply = normalize_reply(raw);

        assert_eq!(reply.message, "ok");
        assert_eq!(reply.action, ReplyAction::Query);
    }

    #[test]
    fn closing_fence_alone_is_stripped_from_the_end_only() {
        let raw = "{\"message\":\"late\",\"action\":\"chat\"}\n```";
        assert_eq!(strip_fences(raw), "{\"message\":\"late\",\"action\":\"chat\"}");
        assert_eq!(normalize_reply(raw).message, "late");
    }

    #[test]
    fn unfenced_json_passes_straight_to_decode() {
        let raw = r#"{"message":"Booked!","action":"schedule","events":[{"title":"Gym","date":"2024-11-23","startTime":"18:00","endTime":"19:00","type":"workout","duration":60}]}"#;
        let reply = normalize_reply(raw);

        assert_eq!(reply.action, ReplyAction::Schedule);
        assert_eq!(reply.events.len(), 1);
        assert_eq!(reply.events[0].kind, EventType::Workout);
    }

    #[test]
    fn plain_text_becomes_chat_message() {
        let reply = normalize_reply("Sure, I'll schedule that for you!");

        assert_eq!(reply, ChatReply::fallback("Sure, I'll schedule that for you!"));
    }

    #[test]
    fn fallback_keeps_cleaned_text_not_raw() {
        let reply = normalize_reply("```json\nnot json at all\n```");
        assert_eq!(reply.message, "not json at all");
        assert_eq!(reply.action, ReplyAction::Chat);
        assert!(reply.events.is_empty());
    }

    #[test]
    fn valid_json_with_wrong_shape_falls_back() {
        let raw = r#"{"reply":"hello"}"#;
        assert_eq!(normalize_reply(raw), ChatReply::fallback(raw));

        let array = "[1, 2, 3]";
        assert_eq!(normalize_reply(array), ChatReply::fallback(array));
    }

    #[test]
    fn event_with_bad_time_falls_back() {
        let raw = r#"{"message":"Done","action":"schedule","events":[{"title":"Call","date":"2024-11-23","startTime":"3pm","endTime":"16:00","type":"meeting"}]}"#;
        assert_eq!(normalize_reply(raw), ChatReply::fallback(raw));
    }

    #[test]
    fn missing_duration_is_filled_from_times() {
        let raw = r#"{"message":"Done","action":"schedule","events":[{"title":"Deep work","date":"2024-11-23","startTime":"14:00","endTime":"15:30","type":"coding"}]}"#;
        let reply = normalize_reply(raw);

        assert_eq!(reply.events[0].duration, 90);
    }

    #[test]
    fn bare_fence_normalizes_to_empty_message() {
        assert_eq!(strip_fences("```"), "");
        assert_eq!(normalize_reply("```"), ChatReply::fallback(""));
    }
}
