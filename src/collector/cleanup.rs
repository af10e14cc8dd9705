use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::events::{BotMessage, IncomingMessage};
use crate::adapters::DiscordService;

/// Best-effort side effect performed by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    /// Delete a collected message
    DeleteMessage,
    /// Remove the collected user's reaction
    DeleteReaction,
    /// Remove every reaction from the bot message
    ClearReactions,
}

/// One attempted cleanup and whether the platform accepted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupAttempt {
    pub action: CleanupAction,
    pub succeeded: bool,
}

/// Record of every cleanup a session attempted
///
/// Cleanup failures are swallowed, so this is the only place a caller can
/// tell "attempted" apart from "succeeded".
#[derive(Debug, Clone, Default)]
pub struct CleanupLog {
    attempts: Arc<Mutex<Vec<CleanupAttempt>>>,
}

impl CleanupLog {
    pub fn attempts(&self) -> Vec<CleanupAttempt> {
        self.lock().clone()
    }

    /// Attempts of a single kind
    pub fn attempts_of(&self, action: CleanupAction) -> Vec<CleanupAttempt> {
        self.lock()
            .iter()
            .filter(|attempt| attempt.action == action)
            .cloned()
            .collect()
    }

    fn record(&self, action: CleanupAction, succeeded: bool) {
        self.lock().push(CleanupAttempt { action, succeeded });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CleanupAttempt>> {
        // A poisoned log still holds valid attempts
        self.attempts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Runs best-effort side effects against the platform
///
/// Every method logs and records its outcome; none of them return an error.
pub(crate) struct Cleanup<D: DiscordService> {
    discord: Arc<D>,
    log: CleanupLog,
}

impl<D: DiscordService> Cleanup<D> {
    pub(crate) fn new(discord: Arc<D>) -> Self {
        Self {
            discord,
            log: CleanupLog::default(),
        }
    }

    pub(crate) fn log(&self) -> CleanupLog {
        self.log.clone()
    }

    pub(crate) async fn delete_message(&self, message: &IncomingMessage) {
        let result = self
            .discord
            .delete_message(message.channel_id, message.id)
            .await;
        self.finish(CleanupAction::DeleteMessage, result, message.channel_id.get(), message.id.get());
    }

    pub(crate) async fn delete_reaction(
        &self,
        bot_message: &BotMessage,
        user_id: UserId,
        emoji: &ReactionType,
    ) {
        let result = self
            .discord
            .remove_user_reaction(bot_message.channel_id, bot_message.id, user_id, emoji)
            .await;
        self.finish(
            CleanupAction::DeleteReaction,
            result,
            bot_message.channel_id.get(),
            bot_message.id.get(),
        );
    }

    pub(crate) async fn clear_reactions(&self, bot_message: &BotMessage) {
        let result = self
            .discord
            .remove_all_reactions(bot_message.channel_id, bot_message.id)
            .await;
        self.finish(
            CleanupAction::ClearReactions,
            result,
            bot_message.channel_id.get(),
            bot_message.id.get(),
        );
    }

    fn finish(
        &self,
        action: CleanupAction,
        result: Result<(), serenity::Error>,
        channel_id: u64,
        message_id: u64,
    ) {
        match result {
            Ok(()) => {
                debug!(?action, channel_id, message_id, "Cleanup succeeded");
                self.log.record(action, true);
            }
            Err(err) => {
                warn!(?err, ?action, channel_id, message_id, "Cleanup failed, continuing");
                self.log.record(action, false);
            }
        }
    }
}
