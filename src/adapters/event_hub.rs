use crate::collector::{IncomingMessage, IncomingReaction};
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of buffered events per subscriber
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Fan-out point between the gateway event handler and collector sessions
///
/// The bot's `EventHandler` publishes every incoming message and reaction;
/// each collector session holds its own receiver, so sessions never share
/// state and a slow session cannot block another.
#[derive(Debug, Clone)]
pub struct EventHub {
    messages: broadcast::Sender<IncomingMessage>,
    reactions: broadcast::Sender<IncomingReaction>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

impl EventHub {
    /// Create a new EventHub
    ///
    /// # Arguments
    ///
    /// * `capacity` - Events buffered per subscriber before it starts lagging
    pub fn new(capacity: usize) -> Self {
        let (messages, _) = broadcast::channel(capacity.max(1));
        let (reactions, _) = broadcast::channel(capacity.max(1));
        Self {
            messages,
            reactions,
        }
    }

    /// Publish an incoming message to every live message session
    pub fn publish_message(&self, message: IncomingMessage) {
        // Err only means nobody is listening right now
        if self.messages.send(message).is_err() {
            trace!("No message collector is listening");
        }
    }

    /// Publish an added reaction to every live reaction session
    pub fn publish_reaction(&self, reaction: IncomingReaction) {
        if self.reactions.send(reaction).is_err() {
            trace!("No reaction collector is listening");
        }
    }

    pub fn subscribe_messages(&self) -> broadcast::Receiver<IncomingMessage> {
        self.messages.subscribe()
    }

    pub fn subscribe_reactions(&self) -> broadcast::Receiver<IncomingReaction> {
        self.reactions.subscribe()
    }

    /// Number of live message sessions
    pub fn message_subscribers(&self) -> usize {
        self.messages.receiver_count()
    }

    /// Number of live reaction sessions
    pub fn reaction_subscribers(&self) -> usize {
        self.reactions.receiver_count()
    }
}
