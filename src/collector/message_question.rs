use std::sync::Arc;
use tracing::{debug, error};

use super::answer::Answer;
use super::cleanup::Cleanup;
use super::error::{CollectorError, Schema};
use super::events::IncomingMessage;
use super::filter::MessageFilter;
use super::handlers::MessageHandler;
use super::options::MessageQuestionOptions;
use super::session::{Collector, Predicate, SessionHandle};
use crate::adapters::{DiscordService, EventHub};

/// Collects replies from one user in the bot message's channel
pub struct MessageCollector<D: DiscordService> {
    discord: Arc<D>,
    hub: EventHub,
}

impl<D: DiscordService + 'static> MessageCollector<D> {
    /// Create a new MessageCollector
    ///
    /// # Arguments
    ///
    /// * `discord` - The Discord service for platform calls
    /// * `hub` - The event hub fed by the gateway event handler
    pub fn new(discord: Arc<D>, hub: EventHub) -> Self {
        Self { discord, hub }
    }

    /// Run a streaming question
    ///
    /// Every qualifying message is optionally deleted and then handed to
    /// `handler`, one at a time in arrival order. The handler receives the
    /// message as captured, so deleting it first is safe.
    ///
    /// # Returns
    ///
    /// The live session, which the caller may stop early
    pub async fn question<H>(
        &self,
        options: MessageQuestionOptions,
        handler: H,
    ) -> Result<SessionHandle, CollectorError>
    where
        H: MessageHandler + 'static,
    {
        let options = options.validate(Schema::MessageQuestion)?;
        let mut collector = self.open(&options).await?;

        let control = collector.control();
        let cleanup = Cleanup::new(self.discord.clone());
        let cleanup_log = cleanup.log();
        let delete_message = options.delete_message;

        let task = tokio::spawn(async move {
            let bot_message = collector.bot_message();
            while let Some(message) = collector.next().await {
                if delete_message {
                    cleanup.delete_message(&message).await;
                }
                if let Err(err) = handler.on_message(bot_message, message).await {
                    error!(?err, message_id = %bot_message.id, "Message handler failed");
                }
            }
            collector.outcome()
        });

        Ok(SessionHandle::new(control, task, cleanup_log))
    }

    /// Wait for a single reply
    ///
    /// Settles once: with the first qualifying message, or with
    /// `Answer::TimedOut` when `time` elapses first. When `delete_message`
    /// is set the delete has been attempted before this returns.
    pub async fn ask(
        &self,
        options: MessageQuestionOptions,
    ) -> Result<Answer<IncomingMessage>, CollectorError> {
        let options = options.validate(Schema::MessageAsyncQuestion)?;
        let collector = self.open(&options).await?;

        let Some(message) = collector.first().await else {
            debug!(
                message_id = %options.bot_message.id,
                user_id = %options.user,
                "Message question timed out"
            );
            return Ok(Answer::TimedOut);
        };

        if options.delete_message {
            Cleanup::new(self.discord.clone())
                .delete_message(&message)
                .await;
        }
        Ok(Answer::Answered(message))
    }

    /// Open a raw streaming session without a handler
    ///
    /// The caller drives it with `Collector::next`.
    pub async fn collector(
        &self,
        options: MessageQuestionOptions,
    ) -> Result<Collector<IncomingMessage>, CollectorError> {
        let options = options.validate(Schema::MessageCollector)?;
        self.open(&options).await
    }

    async fn open(
        &self,
        options: &MessageQuestionOptions,
    ) -> Result<Collector<IncomingMessage>, CollectorError> {
        let channel_id = options.bot_message.channel_id;
        self.discord
            .check_channel(channel_id)
            .await
            .map_err(|source| CollectorError::ChannelUnavailable { channel_id, source })?;

        let filter = MessageFilter::for_user(options.user);
        let predicate: Predicate<IncomingMessage> =
            Arc::new(move |message: &IncomingMessage| filter.should_collect(message));

        Ok(Collector::new(
            options.bot_message,
            self.hub.subscribe_messages(),
            predicate,
            options.collector_options,
        ))
    }
}
