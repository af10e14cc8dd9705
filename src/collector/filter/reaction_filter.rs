use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;

use super::filterable::FilterableReaction;
use crate::collector::events::emoji_position;

/// Reaction predicate scoped to one target user and a reaction set
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionFilter {
    target: UserId,
    reactions: Vec<ReactionType>,
}

impl ReactionFilter {
    pub fn new(target: UserId, reactions: Vec<ReactionType>) -> Self {
        Self { target, reactions }
    }

    pub fn reactions(&self) -> &[ReactionType] {
        &self.reactions
    }

    /// Check if a reaction belongs to this collection session
    ///
    /// True iff the target user (not a bot) added one of the expected emoji.
    pub fn should_collect<R: FilterableReaction>(&self, reaction: &R) -> bool {
        reaction.user_id() == self.target
            && !reaction.is_bot()
            && emoji_position(&self.reactions, reaction.emoji()).is_some()
    }
}
