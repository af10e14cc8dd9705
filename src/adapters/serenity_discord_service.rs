use super::discord_service::DiscordService;
use crate::collector::discord_text::truncate_content;
use crate::collector::menu::Page;
use serenity::async_trait;
use serenity::builder::EditMessage;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId, UserId};
use std::sync::Arc;

/// Implementation for Discord operations via Serenity
pub struct SerenityDiscordService {
    http: Arc<serenity::http::Http>,
}

impl SerenityDiscordService {
    /// Create a new SerenityDiscordService
    ///
    /// # Arguments
    ///
    /// * `http` - The serenity HTTP client (usually `ctx.http`)
    pub fn new(http: Arc<serenity::http::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DiscordService for SerenityDiscordService {
    async fn check_channel(&self, channel_id: ChannelId) -> Result<(), serenity::Error> {
        self.http.get_channel(channel_id).await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &ReactionType,
    ) -> Result<(), serenity::Error> {
        self.http
            .create_reaction(channel_id, message_id, emoji)
            .await
    }

    async fn remove_user_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        emoji: &ReactionType,
    ) -> Result<(), serenity::Error> {
        self.http
            .delete_reaction(channel_id, message_id, user_id, emoji)
            .await
    }

    async fn remove_all_reactions(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), serenity::Error> {
        self.http.delete_message_reactions(channel_id, message_id).await
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), serenity::Error> {
        self.http.delete_message(channel_id, message_id, None).await
    }

    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        page: &Page,
    ) -> Result<(), serenity::Error> {
        // Full replace: an absent content/embed clears the previous one
        let mut builder = EditMessage::new()
            .content(truncate_content(page.content.as_deref().unwrap_or_default()));
        builder = match &page.embed {
            Some(embed) => builder.embed(embed.clone()),
            None => builder.embeds(Vec::new()),
        };

        channel_id
            .edit_message(&self.http, message_id, builder)
            .await?;
        Ok(())
    }
}
