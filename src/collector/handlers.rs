use serenity::async_trait;
use serenity::model::channel::ReactionType;
use std::future::Future;
use std::sync::Arc;

use super::error::CollectorError;
use super::events::{BotMessage, IncomingMessage, IncomingReaction, emoji_position, same_emoji};

/// Callback invoked for every collected message
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(
        &self,
        bot_message: BotMessage,
        message: IncomingMessage,
    ) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(BotMessage, IncomingMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_message(
        &self,
        bot_message: BotMessage,
        message: IncomingMessage,
    ) -> anyhow::Result<()> {
        (self)(bot_message, message).await
    }
}

/// Callback invoked for a collected reaction
#[async_trait]
pub trait ReactionHandler: Send + Sync {
    async fn on_react(
        &self,
        bot_message: BotMessage,
        reaction: IncomingReaction,
    ) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> ReactionHandler for F
where
    F: Fn(BotMessage, IncomingReaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_react(
        &self,
        bot_message: BotMessage,
        reaction: IncomingReaction,
    ) -> anyhow::Result<()> {
        (self)(bot_message, reaction).await
    }
}

/// Ordered mapping from reaction to handler
///
/// Entry order is the order reactions are attached to the bot message.
/// Every reaction in the set has exactly one handler, so dispatch is a
/// lookup by emoji rather than by array position.
#[derive(Clone, Default)]
pub struct ReactionMap {
    entries: Vec<(ReactionType, Arc<dyn ReactionHandler>)>,
}

impl ReactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reaction and its handler
    ///
    /// Registering the same emoji twice is reported by `validate`.
    pub fn on<H>(mut self, emoji: ReactionType, handler: H) -> Self
    where
        H: ReactionHandler + 'static,
    {
        self.entries.push((emoji, Arc::new(handler)));
        self
    }

    /// Add a reaction with an already shared handler
    pub fn on_shared(mut self, emoji: ReactionType, handler: Arc<dyn ReactionHandler>) -> Self {
        self.entries.push((emoji, handler));
        self
    }

    /// Build a map from parallel reaction and handler lists
    ///
    /// The handler at index k answers the reaction at index k.
    pub fn positional(
        reactions: Vec<ReactionType>,
        handlers: Vec<Arc<dyn ReactionHandler>>,
    ) -> Result<Self, CollectorError> {
        if reactions.len() != handlers.len() {
            return Err(CollectorError::InvalidConfiguration(format!(
                "{} reactions but {} handlers",
                reactions.len(),
                handlers.len()
            )));
        }

        let map = Self {
            entries: reactions.into_iter().zip(handlers).collect(),
        };
        map.validate()?;
        Ok(map)
    }

    /// Check the mapping is usable: non-empty and one handler per emoji
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.entries.is_empty() {
            return Err(CollectorError::InvalidConfiguration(
                "no reactions configured".to_string(),
            ));
        }

        let emojis = self.emojis();
        for (i, emoji) in emojis.iter().enumerate() {
            if emoji_position(&emojis[..i], emoji).is_some() {
                return Err(CollectorError::InvalidConfiguration(format!(
                    "reaction {emoji} is mapped more than once"
                )));
            }
        }
        Ok(())
    }

    /// Reactions in attach order
    pub fn emojis(&self) -> Vec<ReactionType> {
        self.entries.iter().map(|(emoji, _)| emoji.clone()).collect()
    }

    /// Handler for a collected emoji
    pub fn handler_for(&self, emoji: &ReactionType) -> Option<Arc<dyn ReactionHandler>> {
        self.entries
            .iter()
            .find(|(candidate, _)| same_emoji(candidate, emoji))
            .map(|(_, handler)| handler.clone())
    }
}
