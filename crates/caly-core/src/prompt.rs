//! Prompt assembly.
//!
//! The model never does date arithmetic itself: today's and tomorrow's dates
//! are stated explicitly in the context block.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::model::ChatContext;

/// Maximum number of events described to the model.
pub const MAX_EVENTS: usize = 10;
/// Maximum number of free slots listed.
pub const MAX_SLOTS: usize = 5;
/// Number of trailing history turns replayed.
pub const MAX_HISTORY: usize = 10;

pub const NO_EVENTS_PLACEHOLDER: &str = "No events scheduled";
pub const NO_SLOTS_PLACEHOLDER: &str = "Check user's schedule above to find gaps";

pub const SYSTEM_PROMPT: &str = r#"You are CalyAI, a friendly and intelligent calendar assistant.

Your role is to help users schedule tasks, meetings, and events through natural conversation.

CRITICAL BEHAVIOR:
- DO NOT ask questions or ask for confirmation
- AUTOMATICALLY schedule events when the user mentions them
- Find the best available time slot and schedule immediately
- Be proactive and decisive
- Always display the EXACT date and time in your response

CRITICAL: You MUST respond with valid JSON in this exact format:

{
  "message": "Your friendly response with EXACT date and time details",
  "action": "schedule|query|chat",
  "events": [
    {
      "title": "Event Title",
      "date": "YYYY-MM-DD",
      "startTime": "HH:MM",
      "endTime": "HH:MM",
      "type": "meeting|study|workout|task|routine|break|coding",
      "duration": 60
    }
  ]
}

Guidelines:
- Always wrap your response in valid JSON
- Be conversational and warm in the "message" field
- ALWAYS mention the exact date (e.g., "Sunday, November 23rd") and exact time (e.g., "10:00 AM to 11:30 AM") in your message
- Use emojis sparingly but effectively
- For schedule requests, AUTOMATICALLY find available time and schedule - NO questions
- For queries or chat, set "events" to empty array []
- Detect event type automatically (meeting, study, workout, coding, etc.)
- Use 24-hour time format in JSON (HH:MM)
- Infer reasonable durations if not specified (coding: 90min, meetings: 60min, gym: 60min)
- If user says "afternoon", use 14:00-16:00
- If user says "morning", use 09:00-11:00
- If user says "evening", use 18:00-20:00
- Remember conversation history and context

Context will be provided about:
- Current date and time
- User's existing events
- User's preferences (work hours, etc.)
- Available time slots
- Previous conversation

Respond ONLY with valid JSON, no other text."#;

const FINAL_REMINDER: &str =
    "IMPORTANT: Respond ONLY with valid JSON. No other text before or after the JSON.";

/// Assembles the prompt for one request. `now` is the server's local time.
pub struct PromptBuilder<'a> {
    context: &'a ChatContext,
    now: NaiveDateTime,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(context: &'a ChatContext, now: NaiveDateTime) -> Self {
        Self { context, now }
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn tomorrow(&self) -> NaiveDate {
        let today = self.today();
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    }

    /// First [`MAX_EVENTS`] events as indented JSON, or the placeholder.
    pub fn events_block(&self) -> String {
        let events = &self.context.events;
        if events.is_empty() {
            return NO_EVENTS_PLACEHOLDER.to_string();
        }
        let shown = &events[..events.len().min(MAX_EVENTS)];
        serde_json::to_string_pretty(shown).unwrap_or_default()
    }

    /// First [`MAX_SLOTS`] slots as `start-end`, comma separated.
    pub fn slots_block(&self) -> String {
        let slots = &self.context.available_slots;
        if slots.is_empty() {
            return NO_SLOTS_PLACEHOLDER.to_string();
        }
        slots
            .iter()
            .take(MAX_SLOTS)
            .map(|slot| format!("{}-{}", slot.start, slot.end))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Last [`MAX_HISTORY`] turns; empty when there is no history.
    pub fn history_block(&self) -> String {
        let history = &self.context.chat_history;
        if history.is_empty() {
            return String::new();
        }

        let skip = history.len().saturating_sub(MAX_HISTORY);
        let mut block = String::from("\n\nPREVIOUS CONVERSATION:\n");
        for turn in &history[skip..] {
            block.push_str(turn.role.label());
            block.push_str(": ");
            block.push_str(&turn.content);
            block.push('\n');
        }
        block
    }

    pub fn context_block(&self, user_message: &str) -> String {
        let current_date = self.today().format("%Y-%m-%d").to_string();
        let current_day = self.now.format("%A").to_string();
        let current_time = self.now.format("%H:%M").to_string();
        let tomorrow = self.tomorrow();
        let tomorrow_long = tomorrow.format("%A, %Y-%m-%d").to_string();
        let tomorrow_date = tomorrow.format("%Y-%m-%d").to_string();
        let preferences = &self.context.preferences;

        format!(
            r#"
IMPORTANT DATE CONTEXT:
- TODAY is: {current_day}, {current_date} at {current_time}
- Current day of week: {current_day}
- When user says "tomorrow", that means: {tomorrow_long}
- When user says "next Monday", calculate from today ({current_day})
- When user says "this afternoon", use today's date: {current_date}

User Preferences:
- Work hours: {work_start} to {work_end}

Current Schedule (showing upcoming events):
{events}

Available Time Slots (for today):
{slots}
{history}
User's NEW request: "{user_message}"

CRITICAL INSTRUCTIONS:
1. ALWAYS use EXACT dates in YYYY-MM-DD format in JSON
2. ALWAYS mention exact date like "Sunday, November 23rd" in your message
3. ALWAYS mention exact time like "10:00 AM to 11:30 AM" or "15:00 to 16:00" in your message
4. Calculate dates relative to TODAY ({current_date})
5. If user says "tomorrow afternoon", use date {tomorrow_date} and time 14:00-16:00
6. If user says "this afternoon", use date {current_date} and time 14:00-16:00
7. DO NOT ask questions - just schedule automatically
8. Find available time slots from the schedule above and pick the best one

Respond ONLY with valid JSON. No extra text.
"#,
            work_start = preferences.work_start,
            work_end = preferences.work_end,
            events = self.events_block(),
            slots = self.slots_block(),
            history = self.history_block(),
        )
    }

    pub fn build(&self, user_message: &str) -> String {
        let mut prompt = String::from(SYSTEM_PROMPT);
        prompt.push_str("\n\n");
        prompt.push_str(&self.context_block(user_message));
        prompt.push_str("\n\n");
        prompt.push_str(FINAL_REMINDER);
        prompt
    }
}

pub fn build_prompt(user_message: &str, context: &ChatContext, now: NaiveDateTime) -> String {
    PromptBuilder::new(context, now).build(user_message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, EventType, HistoryMessage, TimeSlot};

    fn friday_afternoon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 22)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap()
    }

    fn numbered_events(count: usize) -> Vec<Event> {
        (0..count)
            .map(|i| {
                Event::new(
                    format!("event-{:02}", i),
                    "2024-11-25",
                    "10:00",
                    "11:00",
                    EventType::Meeting,
                )
                .with_duration(60)
            })
            .collect()
    }

    #[test]
    fn states_tomorrow_and_afternoon_band_explicitly() {
        let context = ChatContext::default();
        let prompt = build_prompt("schedule tomorrow afternoon", &context, friday_afternoon());

        assert!(prompt.contains("TODAY is: Friday, 2024-11-22 at 13:05"));
        assert!(prompt.contains("that means: Saturday, 2024-11-23"));
        assert!(prompt.contains("use date 2024-11-23 and time 14:00-16:00"));
        assert!(prompt.contains("If user says \"afternoon\", use 14:00-16:00"));
    }

    #[test]
    fn tomorrow_rolls_over_month_end() {
        let context = ChatContext::default();
        let now = NaiveDate::from_ymd_opt(2024, 11, 30)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        assert_eq!(
            PromptBuilder::new(&context, now).tomorrow(),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }

    #[test]
    fn includes_exactly_first_ten_events() {
        let context = ChatContext {
            events: numbered_events(12),
            ..ChatContext::default()
        };
        let block = PromptBuilder::new(&context, friday_afternoon()).events_block();

        assert!(block.contains("event-00"));
        assert!(block.contains("event-09"));
        assert!(!block.contains("event-10"));
        assert!(!block.contains("event-11"));

        let parsed: Vec<Event> = serde_json::from_str(&block).unwrap();
        assert_eq!(parsed.len(), MAX_EVENTS);
    }

    #[test]
    fn events_are_indented_json() {
        let context = ChatContext {
            events: numbered_events(1),
            ..ChatContext::default()
        };
        let block = PromptBuilder::new(&context, friday_afternoon()).events_block();

        assert!(block.starts_with("[\n  {\n    \"title\": \"event-00\""));
        assert!(block.contains("\"startTime\": \"10:00\""));
    }

    #[test]
    fn empty_schedule_uses_placeholders() {
        let context = ChatContext::default();
        let prompt = build_prompt("hi", &context, friday_afternoon());

        assert!(prompt.contains("Current Schedule (showing upcoming events):\nNo events scheduled\n"));
        assert!(prompt.contains("Available Time Slots (for today):\nCheck user's schedule above to find gaps\n"));
        assert!(!prompt.contains("PREVIOUS CONVERSATION"));
    }

    #[test]
    fn includes_exactly_first_five_slots() {
        let context = ChatContext {
            available_slots: (9..16)
                .map(|h| TimeSlot::new(format!("{:02}:00", h), format!("{:02}:00", h + 1)))
                .collect(),
            ..ChatContext::default()
        };
        let block = PromptBuilder::new(&context, friday_afternoon()).slots_block();

        assert_eq!(
            block,
            "09:00-10:00, 10:00-11:00, 11:00-12:00, 12:00-13:00, 13:00-14:00"
        );
    }

    #[test]
    fn includes_last_ten_history_turns_in_order() {
        let chat_history = (0..13)
            .map(|i| {
                if i % 2 == 0 {
                    HistoryMessage::user(format!("turn {}", i))
                } else {
                    HistoryMessage::assistant(format!("turn {}", i))
                }
            })
            .collect();
        let context = ChatContext {
            chat_history,
            ..ChatContext::default()
        };
        let block = PromptBuilder::new(&context, friday_afternoon()).history_block();

        let lines: Vec<&str> = block.trim().lines().skip(1).collect();
        assert_eq!(lines.len(), MAX_HISTORY);
        assert_eq!(lines[0], "Assistant: turn 3");
        assert_eq!(lines[1], "User: turn 4");
        assert_eq!(lines[9], "User: turn 12");
        assert!(!block.contains("turn 2\n"));
    }

    #[test]
    fn work_hours_come_from_preferences() {
        let mut context = ChatContext::default();
        context.preferences.work_start = "07:30".to_string();
        let prompt = build_prompt("hi", &context, friday_afternoon());

        assert!(prompt.contains("- Work hours: 07:30 to 18:00"));
    }

    #[test]
    fn message_is_quoted_and_prompt_ends_with_json_reminder() {
        let context = ChatContext::default();
        let prompt = build_prompt("gym at 6pm", &context, friday_afternoon());

        assert!(prompt.starts_with("You are CalyAI"));
        assert!(prompt.contains("User's NEW request: \"gym at 6pm\""));
        assert!(prompt.ends_with(FINAL_REMINDER));
    }
}
