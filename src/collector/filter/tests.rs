use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;

use super::filterable::{FilterableMessage, FilterableReaction};

/// Mock message implementation for unit testing
#[derive(Debug)]
pub(super) struct MockMessage {
    author_id: UserId,
    is_bot: bool,
}

impl MockMessage {
    pub(super) fn new(author_id: u64) -> Self {
        Self {
            author_id: UserId::new(author_id),
            is_bot: false,
        }
    }

    pub(super) fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}

impl FilterableMessage for MockMessage {
    fn author_id(&self) -> UserId {
        self.author_id
    }

    fn is_bot(&self) -> bool {
        self.is_bot
    }
}

/// Mock reaction implementation for unit testing
#[derive(Debug)]
pub(super) struct MockReaction {
    user_id: UserId,
    is_bot: bool,
    emoji: ReactionType,
}

impl MockReaction {
    pub(super) fn new(user_id: u64, emoji: &str) -> Self {
        Self {
            user_id: UserId::new(user_id),
            is_bot: false,
            emoji: ReactionType::Unicode(emoji.to_string()),
        }
    }

    pub(super) fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}

impl FilterableReaction for MockReaction {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_bot(&self) -> bool {
        self.is_bot
    }

    fn emoji(&self) -> &ReactionType {
        &self.emoji
    }
}
