pub mod adapters;
pub mod collector;

pub use collector::{
    Actor, Answer, BotMessage, CollectorError, CollectorOptions, EndReason, IncomingMessage,
    IncomingReaction, SessionHandle, SessionOutcome,
};
