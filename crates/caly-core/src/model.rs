//! Scheduling types exchanged with the frontend and the model.
//!
//! Everything the caller sends is defaulted field by field: a context with
//! missing collections or preferences still produces a usable prompt.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

pub const DEFAULT_WORK_START: &str = "09:00";
pub const DEFAULT_WORK_END: &str = "18:00";
pub const DEFAULT_TASK_DURATION: u32 = 60;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const COLOR_KEY: &str = "color";

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Event category tag. Unknown tags decode as [`EventType::Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Meeting,
    Study,
    Workout,
    Routine,
    Break,
    Coding,
    #[default]
    #[serde(other)]
    Task,
}

impl EventType {
    /// Duration used when neither the user nor the model gives one.
    pub fn default_duration(self) -> u32 {
        match self {
            EventType::Coding => 90,
            _ => DEFAULT_TASK_DURATION,
        }
    }

    /// Calendar colour used by the frontend.
    pub fn color(self) -> &'static str {
        match self {
            EventType::Meeting => "#667eea",
            EventType::Study => "#f5576c",
            EventType::Workout => "#4facfe",
            EventType::Routine => "#00f2fe",
            EventType::Coding => "#764ba2",
            EventType::Task | EventType::Break => "#fee140",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub duration: u32,
    /// Keys the frontend attaches (`id`, `color`, ...), passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        kind: EventType,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            kind,
            duration: 0,
            extra: Map::new(),
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn parsed_date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }

    /// Start and end as minutes since midnight.
    pub fn minute_range(&self) -> Result<(u32, u32)> {
        Ok((parse_minutes(&self.start_time)?, parse_minutes(&self.end_time)?))
    }

    /// Checks the fields a scheduled event must carry.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::InvalidEvent("missing title".to_string()));
        }
        self.parsed_date()?;
        self.minute_range()?;
        Ok(())
    }

    /// Fills a missing duration from the time range, or the type default.
    pub fn fill_duration(&mut self) {
        if self.duration > 0 {
            return;
        }
        self.duration = match self.minute_range() {
            Ok((start, end)) if end > start => end - start,
            _ => self.kind.default_duration(),
        };
    }

    /// Sets the calendar colour for the event type unless one is present.
    pub fn fill_color(&mut self) {
        let has_color = matches!(
            self.extra.get(COLOR_KEY),
            Some(Value::String(color)) if !color.is_empty()
        );
        if !has_color {
            self.extra
                .insert(COLOR_KEY.to_string(), Value::from(self.kind.color()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub work_start: String,
    pub work_end: String,
    pub preferred_task_duration: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            work_start: DEFAULT_WORK_START.to_string(),
            work_end: DEFAULT_WORK_END.to_string(),
            preferred_task_duration: DEFAULT_TASK_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Speaker of a history turn. Only the exact tag `user` is the user; any
/// other value, `null` or a missing role is the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(tag) if tag == "user" => Role::User,
            _ => Role::Assistant,
        })
    }
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Scheduling state the caller re-submits with every chat request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
    #[serde(deserialize_with = "null_as_default")]
    pub preferences: Preferences,
    #[serde(deserialize_with = "null_as_default")]
    pub available_slots: Vec<TimeSlot>,
    #[serde(deserialize_with = "null_as_default")]
    pub chat_history: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyAction {
    Schedule,
    Query,
    Chat,
}

/// Structured reply returned to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub action: ReplyAction,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

impl ChatReply {
    /// Plain chat envelope carrying `message` verbatim.
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: ReplyAction::Chat,
            events: Vec::new(),
        }
    }

    /// Validates every returned event and fills in missing durations and colours.
    pub fn validated(mut self) -> Result<Self> {
        for (index, event) in self.events.iter_mut().enumerate() {
            event
                .validate()
                .map_err(|e| CoreError::InvalidReply(format!("event {}: {}", index, e)))?;
            event.fill_duration();
            event.fill_color();
        }
        Ok(self)
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}

/// Parses `HH:MM` into minutes since midnight.
pub fn parse_minutes(value: &str) -> Result<u32> {
    use chrono::Timelike;

    let time = NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| CoreError::InvalidTime(value.to_string()))?;
    Ok(time.hour() * 60 + time.minute())
}

pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
