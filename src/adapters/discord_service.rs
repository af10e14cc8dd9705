use crate::collector::menu::Page;
use serenity::async_trait;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId, UserId};

/// Interface for the Discord operations collectors need
///
/// Every method is a single platform call. Collectors decide which failures
/// are fatal and which are best-effort.
#[async_trait]
pub trait DiscordService: Send + Sync {
    /// Check that the bot can still access a channel
    ///
    /// # Arguments
    ///
    /// * `channel_id` - The channel the bot message lives in
    async fn check_channel(&self, channel_id: ChannelId) -> Result<(), serenity::Error>;

    /// Add a reaction from the bot to a message
    ///
    /// # Arguments
    ///
    /// * `channel_id` - The channel where the message was sent
    /// * `message_id` - The message to react to
    /// * `emoji` - Unicode or custom emoji
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &ReactionType,
    ) -> Result<(), serenity::Error>;

    /// Remove a single user's reaction from a message
    async fn remove_user_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        emoji: &ReactionType,
    ) -> Result<(), serenity::Error>;

    /// Remove every reaction from a message
    async fn remove_all_reactions(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), serenity::Error>;

    /// Delete a message
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), serenity::Error>;

    /// Replace the rendered content of a message with a page
    ///
    /// This is a full replace: content and embed are both overwritten.
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        page: &Page,
    ) -> Result<(), serenity::Error>;
}
