//! Scheduling assistant core: request context model, prompt assembly and
//! normalization of the model's free-text reply.

pub mod error;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod slots;

pub use error::{CoreError, Result};
pub use model::{
    ChatContext, ChatReply, Event, EventType, HistoryMessage, Preferences, ReplyAction, Role,
    TimeSlot,
};
pub use normalize::{normalize_reply, strip_fences, ClosingFence, OpeningFence};
pub use prompt::{build_prompt, PromptBuilder, SYSTEM_PROMPT};
pub use slots::find_free_slots;
