use reactkit::adapters::EventHub;
use reactkit::collector::{Actor, BotMessage, IncomingMessage, IncomingReaction};
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId, UserId};
use std::time::Duration;

pub const CHANNEL: u64 = 500;
pub const BOT_MESSAGE: u64 = 900;
pub const USER: u64 = 42;
pub const OTHER_USER: u64 = 43;
pub const BOT_USER: u64 = 7;

pub fn bot_message() -> BotMessage {
    BotMessage::new(MessageId::new(BOT_MESSAGE), ChannelId::new(CHANNEL))
}

pub fn user() -> UserId {
    UserId::new(USER)
}

pub fn emoji(s: &str) -> ReactionType {
    ReactionType::Unicode(s.to_string())
}

pub fn message(id: u64, author: Actor, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: MessageId::new(id),
        channel_id: ChannelId::new(CHANNEL),
        author,
        content: content.to_string(),
    }
}

pub fn user_message(id: u64, content: &str) -> IncomingMessage {
    message(id, Actor::user(user()), content)
}

pub fn reaction(user: Actor, emoji_text: &str) -> IncomingReaction {
    IncomingReaction {
        message_id: MessageId::new(BOT_MESSAGE),
        channel_id: ChannelId::new(CHANNEL),
        user,
        emoji: emoji(emoji_text),
    }
}

pub fn user_reaction(emoji_text: &str) -> IncomingReaction {
    reaction(Actor::user(user()), emoji_text)
}

/// Let spawned session tasks run until they are all waiting again
///
/// Tests run with a paused clock, so the short sleep only completes once
/// every other task is idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Publish an event and let sessions process it
pub async fn publish_reaction(hub: &EventHub, reaction: IncomingReaction) {
    hub.publish_reaction(reaction);
    settle().await;
}

pub async fn publish_message(hub: &EventHub, message: IncomingMessage) {
    hub.publish_message(message);
    settle().await;
}
