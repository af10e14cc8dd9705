use reactkit::adapters::DiscordService;
use reactkit::collector::Page;
use serenity::async_trait;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId, UserId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Platform call as seen by the mock, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CheckChannel(ChannelId),
    AddReaction(MessageId, ReactionType),
    RemoveUserReaction(MessageId, UserId, ReactionType),
    RemoveAllReactions(MessageId),
    DeleteMessage(MessageId),
    /// Edited message and the page content it was given
    EditMessage(MessageId, Option<String>),
}

#[derive(Default)]
struct Failures {
    channel: bool,
    reactions: Vec<ReactionType>,
    deletes: bool,
    clears: bool,
    /// Number of edits that succeed before every later edit fails
    edits_after: Option<usize>,
}

/// Simulated platform latency
#[derive(Default)]
struct Delays {
    clears: Option<Duration>,
    edits: Option<Duration>,
}

/// Records every platform call; individual calls can be made to fail
#[derive(Clone, Default)]
pub struct MockDiscordService {
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Arc<Mutex<Failures>>,
    delays: Arc<Mutex<Delays>>,
    edits_in_flight: Arc<AtomicUsize>,
    max_edits_in_flight: Arc<AtomicUsize>,
}

impl MockDiscordService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_channel(&self) {
        self.failures.lock().unwrap().channel = true;
    }

    pub fn fail_reaction(&self, emoji: ReactionType) {
        self.failures.lock().unwrap().reactions.push(emoji);
    }

    pub fn fail_deletes(&self) {
        self.failures.lock().unwrap().deletes = true;
    }

    pub fn fail_clears(&self) {
        self.failures.lock().unwrap().clears = true;
    }

    pub fn fail_edits_after(&self, successes: usize) {
        self.failures.lock().unwrap().edits_after = Some(successes);
    }

    pub fn delay_clears(&self, delay: Duration) {
        self.delays.lock().unwrap().clears = Some(delay);
    }

    pub fn delay_edits(&self, delay: Duration) {
        self.delays.lock().unwrap().edits = Some(delay);
    }

    /// Most edits that were ever running at the same time
    pub fn max_edits_in_flight(&self) -> usize {
        self.max_edits_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Reactions the bot attached successfully, in order
    pub fn added_reactions(&self) -> Vec<ReactionType> {
        let failed = self.failures.lock().unwrap().reactions.clone();
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddReaction(_, emoji) if !failed.contains(&emoji) => Some(emoji),
                _ => None,
            })
            .collect()
    }

    pub fn removed_reactions(&self) -> Vec<(UserId, ReactionType)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::RemoveUserReaction(_, user, emoji) => Some((user, emoji)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_messages(&self) -> Vec<MessageId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteMessage(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::RemoveAllReactions(_)))
            .count()
    }

    /// Content of every edit attempt, in order
    pub fn edits(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::EditMessage(_, content) => Some(content),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(reason: &'static str) -> Result<(), serenity::Error> {
        Err(serenity::Error::Other(reason))
    }
}

#[async_trait]
impl DiscordService for MockDiscordService {
    async fn check_channel(&self, channel_id: ChannelId) -> Result<(), serenity::Error> {
        self.record(Call::CheckChannel(channel_id));
        if self.failures.lock().unwrap().channel {
            return Self::failure("missing access");
        }
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: &ReactionType,
    ) -> Result<(), serenity::Error> {
        self.record(Call::AddReaction(message_id, emoji.clone()));
        if self.failures.lock().unwrap().reactions.contains(emoji) {
            return Self::failure("unknown emoji");
        }
        Ok(())
    }

    async fn remove_user_reaction(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        emoji: &ReactionType,
    ) -> Result<(), serenity::Error> {
        self.record(Call::RemoveUserReaction(message_id, user_id, emoji.clone()));
        if self.failures.lock().unwrap().deletes {
            return Self::failure("missing permissions");
        }
        Ok(())
    }

    async fn remove_all_reactions(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), serenity::Error> {
        self.record(Call::RemoveAllReactions(message_id));
        let delay = self.delays.lock().unwrap().clears;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().clears {
            return Self::failure("missing permissions");
        }
        Ok(())
    }

    async fn delete_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), serenity::Error> {
        self.record(Call::DeleteMessage(message_id));
        if self.failures.lock().unwrap().deletes {
            return Self::failure("missing permissions");
        }
        Ok(())
    }

    async fn edit_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        page: &Page,
    ) -> Result<(), serenity::Error> {
        let previous_edits = self.edits().len();
        self.record(Call::EditMessage(message_id, page.content.clone()));
        let delay = self.delays.lock().unwrap().edits;
        if let Some(delay) = delay {
            let running = self.edits_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_edits_in_flight.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.edits_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        let edits_after = self.failures.lock().unwrap().edits_after;
        if edits_after.is_some_and(|successes| previous_edits >= successes) {
            return Self::failure("unknown message");
        }
        Ok(())
    }
}
