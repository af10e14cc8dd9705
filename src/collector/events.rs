use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::id::{ChannelId, MessageId, UserId};

/// Identity of the user behind an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: UserId,
    pub bot: bool,
}

impl Actor {
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            bot: false,
        }
    }

    pub fn bot(id: UserId) -> Self {
        Self {
            id,
            bot: true,
        }
    }
}

impl From<&serenity::model::user::User> for Actor {
    fn from(user: &serenity::model::user::User) -> Self {
        Self {
            id: user.id,
            bot: user.bot,
        }
    }
}

/// The bot-authored message interactions are attached to.
///
/// Only the identifiers are held; every edit or delete goes through the
/// `DiscordService` so the platform stays the owner of the message itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BotMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
}

impl BotMessage {
    pub fn new(id: MessageId, channel_id: ChannelId) -> Self {
        Self { id, channel_id }
    }
}

impl From<&Message> for BotMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
        }
    }
}

/// A message received in a channel, captured at collection time
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author: Actor,
    pub content: String,
}

impl From<&Message> for IncomingMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            author: Actor::from(&message.author),
            content: message.content.clone(),
        }
    }
}

/// A reaction added to a message
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingReaction {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub user: Actor,
    pub emoji: ReactionType,
}

impl IncomingReaction {
    /// Convert a gateway reaction
    ///
    /// Returns `None` when Discord omitted the reacting user.
    /// The bot flag comes from the guild member; DM reactions carry no member
    /// and are treated as human.
    pub fn from_reaction(reaction: &Reaction) -> Option<Self> {
        let user_id = reaction.user_id?;
        let bot = reaction
            .member
            .as_ref()
            .map(|member| member.user.bot)
            .unwrap_or(false);

        Some(Self {
            message_id: reaction.message_id,
            channel_id: reaction.channel_id,
            user: Actor { id: user_id, bot },
            emoji: reaction.emoji.clone(),
        })
    }
}

/// Compare two emoji by identity
///
/// Unicode emoji compare by their text, custom emoji by id only, so a
/// renamed custom emoji still matches.
pub fn same_emoji(a: &ReactionType, b: &ReactionType) -> bool {
    match (a, b) {
        (ReactionType::Unicode(a), ReactionType::Unicode(b)) => a == b,
        (ReactionType::Custom { id: a, .. }, ReactionType::Custom { id: b, .. }) => a == b,
        _ => false,
    }
}

/// Position of an emoji within an ordered reaction set
pub fn emoji_position(set: &[ReactionType], emoji: &ReactionType) -> Option<usize> {
    set.iter().position(|candidate| same_emoji(candidate, emoji))
}
