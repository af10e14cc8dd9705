mod answer;
mod cleanup;
pub mod discord_text;
mod error;
mod events;
pub mod filter;
mod handlers;
pub mod menu;
mod message_question;
mod options;
mod reaction_question;
mod session;

// Re-export public API
pub use answer::Answer;
pub use cleanup::{CleanupAction, CleanupAttempt, CleanupLog};
pub use error::{CollectorError, Schema};
pub use events::{Actor, BotMessage, IncomingMessage, IncomingReaction, emoji_position, same_emoji};
pub use handlers::{MessageHandler, ReactionHandler, ReactionMap};
pub use menu::{
    MenuController, MenuHandle, Page, PageMessageHandler, PageReactionHandler, PageRef,
};
pub use message_question::MessageCollector;
pub use options::{
    CollectorOptions, DEFAULT_WAIT, MessageQuestionOptions, ReactAsyncQuestionOptions,
    ReactMenuOptions, ReactQuestionOptions, TimerOptions, default_back_emoji,
    default_forward_emoji, default_yes_no,
};
pub use reaction_question::{AttachFailure, ReactionCollector};
pub use session::{
    Collector, EndReason, Predicate, SessionControl, SessionEvent, SessionHandle, SessionOutcome,
};
