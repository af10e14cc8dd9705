use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::answer::Answer;
use super::cleanup::Cleanup;
use super::error::CollectorError;
use super::events::{BotMessage, IncomingReaction, emoji_position};
use super::filter::ReactionFilter;
use super::options::{CollectorOptions, ReactAsyncQuestionOptions, ReactQuestionOptions};
use super::session::{Collector, Predicate, SessionHandle};
use crate::adapters::{DiscordService, EventHub};

/// A reaction the bot could not attach to its message
#[derive(Debug)]
pub struct AttachFailure {
    pub emoji: ReactionType,
    pub error: serenity::Error,
}

/// Collects reactions from one user on one bot message
pub struct ReactionCollector<D: DiscordService> {
    discord: Arc<D>,
    hub: EventHub,
}

impl<D: DiscordService + 'static> ReactionCollector<D> {
    /// Create a new ReactionCollector
    ///
    /// # Arguments
    ///
    /// * `discord` - The Discord service for platform calls
    /// * `hub` - The event hub fed by the gateway event handler
    pub fn new(discord: Arc<D>, hub: EventHub) -> Self {
        Self { discord, hub }
    }

    pub(crate) fn discord(&self) -> Arc<D> {
        self.discord.clone()
    }

    pub(crate) fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Run a streaming reaction question
    ///
    /// Attaches every mapped reaction in order, then dispatches each
    /// qualifying reaction to its handler, one at a time. A reaction that
    /// fails to attach is reported on the handle and does not stop the
    /// others.
    ///
    /// # Returns
    ///
    /// The live session, which the caller may stop early
    pub async fn question(
        &self,
        options: ReactQuestionOptions,
    ) -> Result<SessionHandle, CollectorError> {
        let options = options.validate()?;
        let bot_message = options.bot_message;
        let emojis = options.reactions.emojis();

        self.check_channel(&bot_message).await?;
        let mut collector = self.open(bot_message, options.user, &emojis, options.collector_options);
        let attach_failures = attach_reactions(self.discord.as_ref(), &bot_message, &emojis).await;

        let control = collector.control();
        let cleanup = Cleanup::new(self.discord.clone());
        let cleanup_log = cleanup.log();
        let reactions = options.reactions;
        let delete_reaction = options.delete_reaction;
        let delete_all_on_end = options.delete_all_on_end;

        let task = tokio::spawn(async move {
            while let Some(reaction) = collector.next().await {
                if delete_reaction {
                    cleanup
                        .delete_reaction(&bot_message, reaction.user.id, &reaction.emoji)
                        .await;
                }

                let Some(handler) = reactions.handler_for(&reaction.emoji) else {
                    debug!(emoji = %reaction.emoji, "No handler mapped for collected reaction");
                    continue;
                };
                if let Err(err) = handler.on_react(bot_message, reaction).await {
                    error!(?err, message_id = %bot_message.id, "Reaction handler failed");
                }
            }

            if delete_all_on_end {
                cleanup.clear_reactions(&bot_message).await;
            }
            collector.outcome()
        });

        Ok(SessionHandle::new(control, task, cleanup_log).with_attach_failures(attach_failures))
    }

    /// Ask a yes/no question
    ///
    /// The first reaction of the set is "yes". Resolves to
    /// `Answered(true)` for it, `Answered(false)` for any other reaction of
    /// the set and `TimedOut` when nobody answers in time.
    pub async fn ask(
        &self,
        options: ReactAsyncQuestionOptions,
    ) -> Result<Answer<bool>, CollectorError> {
        Ok(self.choose(options).await?.map(|index| index == 0))
    }

    /// Wait for one reaction and resolve to its position in the set
    ///
    /// Requested cleanup has been attempted before this returns.
    pub async fn choose(
        &self,
        options: ReactAsyncQuestionOptions,
    ) -> Result<Answer<usize>, CollectorError> {
        let options = options.validate()?;
        let bot_message = options.bot_message;

        self.check_channel(&bot_message).await?;
        let collector = self.open(
            bot_message,
            options.user,
            &options.reactions,
            options.collector_options,
        );
        for failure in attach_reactions(self.discord.as_ref(), &bot_message, &options.reactions).await
        {
            warn!(emoji = %failure.emoji, error = ?failure.error, "Question reaction missing");
        }

        let cleanup = Cleanup::new(self.discord.clone());
        let answer = match collector.first().await {
            Some(reaction) => {
                if options.delete_reaction {
                    cleanup
                        .delete_reaction(&bot_message, reaction.user.id, &reaction.emoji)
                        .await;
                }
                // The filter only admits emoji of the set
                let index = emoji_position(&options.reactions, &reaction.emoji).unwrap_or_default();
                Answer::Answered(index)
            }
            None => {
                debug!(
                    message_id = %bot_message.id,
                    user_id = %options.user,
                    "Reaction question timed out"
                );
                Answer::TimedOut
            }
        };

        if options.delete_all_on_end {
            cleanup.clear_reactions(&bot_message).await;
        }
        Ok(answer)
    }

    pub(crate) async fn check_channel(&self, bot_message: &BotMessage) -> Result<(), CollectorError> {
        let channel_id = bot_message.channel_id;
        self.discord
            .check_channel(channel_id)
            .await
            .map_err(|source| CollectorError::ChannelUnavailable { channel_id, source })
    }

    /// Subscribe before attaching so a fast user is not missed
    fn open(
        &self,
        bot_message: BotMessage,
        user: UserId,
        emojis: &[ReactionType],
        collector_options: CollectorOptions,
    ) -> Collector<IncomingReaction> {
        let filter = ReactionFilter::new(user, emojis.to_vec());
        let predicate: Predicate<IncomingReaction> =
            Arc::new(move |reaction: &IncomingReaction| filter.should_collect(reaction));

        Collector::new(
            bot_message,
            self.hub.subscribe_reactions(),
            predicate,
            collector_options,
        )
    }
}

/// Attach reactions in order, collecting failures instead of aborting
pub(crate) async fn attach_reactions<D: DiscordService>(
    discord: &D,
    bot_message: &BotMessage,
    emojis: &[ReactionType],
) -> Vec<AttachFailure> {
    let mut failures = Vec::new();
    for emoji in emojis {
        if let Err(error) = discord
            .add_reaction(bot_message.channel_id, bot_message.id, emoji)
            .await
        {
            warn!(
                ?error,
                %emoji,
                message_id = %bot_message.id,
                "Failed to attach reaction, continuing with next"
            );
            failures.push(AttachFailure {
                emoji: emoji.clone(),
                error,
            });
        }
    }
    failures
}
