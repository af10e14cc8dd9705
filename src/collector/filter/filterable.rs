use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;

use crate::collector::events::{IncomingMessage, IncomingReaction};

/// Trait for filterable message objects
///
/// This trait abstracts the properties of a message the filter looks at,
/// allowing the filtering logic to be tested without serenity's Message type.
pub trait FilterableMessage {
    fn author_id(&self) -> UserId;
    fn is_bot(&self) -> bool;
}

impl FilterableMessage for IncomingMessage {
    fn author_id(&self) -> UserId {
        self.author.id
    }

    fn is_bot(&self) -> bool {
        self.author.bot
    }
}

/// Trait for types that can be filtered as reactions
pub trait FilterableReaction {
    /// Get the user ID who added the reaction
    fn user_id(&self) -> UserId;

    /// Check if the user is a bot
    fn is_bot(&self) -> bool;

    fn emoji(&self) -> &ReactionType;
}

impl FilterableReaction for IncomingReaction {
    fn user_id(&self) -> UserId {
        self.user.id
    }

    fn is_bot(&self) -> bool {
        self.user.bot
    }

    fn emoji(&self) -> &ReactionType {
        &self.emoji
    }
}
