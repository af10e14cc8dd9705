use std::fmt;
use std::future::pending;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::cleanup::CleanupLog;
use super::events::{Actor, BotMessage, IncomingMessage, IncomingReaction};
use super::options::{CollectorOptions, TimerOptions};
use super::reaction_question::AttachFailure;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The `time` bound elapsed
    Time,
    /// No qualifying event arrived within `idle`
    Idle,
    /// `max` qualifying events were collected
    Limit,
    /// The session was stopped through its handle
    Stopped,
    /// The event source shut down
    SourceClosed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            EndReason::Time => "time",
            EndReason::Idle => "idle",
            EndReason::Limit => "limit",
            EndReason::Stopped => "stopped",
            EndReason::SourceClosed => "source_closed",
        };
        f.write_str(reason)
    }
}

/// Final state of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub reason: EndReason,
    pub collected: usize,
}

/// Event a session can collect
pub trait SessionEvent: Clone + Send + 'static {
    /// Whether the event is attached to the session's bot message at all
    ///
    /// Messages are scoped to the bot message's channel, reactions to the
    /// bot message itself.
    fn belongs_to(&self, bot_message: &BotMessage) -> bool;

    fn actor(&self) -> Actor;
}

impl SessionEvent for IncomingMessage {
    fn belongs_to(&self, bot_message: &BotMessage) -> bool {
        self.channel_id == bot_message.channel_id
    }

    fn actor(&self) -> Actor {
        self.author
    }
}

impl SessionEvent for IncomingReaction {
    fn belongs_to(&self, bot_message: &BotMessage) -> bool {
        self.message_id == bot_message.id
    }

    fn actor(&self) -> Actor {
        self.user
    }
}

/// Shared, side-effect-free test deciding whether an event qualifies
pub type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Stop and timer-reset switches shared between a collector and its handles
#[derive(Clone)]
pub struct SessionControl {
    token: CancellationToken,
    finished: CancellationToken,
    timers: Arc<watch::Sender<TimerOptions>>,
}

impl SessionControl {
    /// Stop the session; calling it again has no effect
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the collector has stopped collecting, for any reason
    ///
    /// Set before end cleanup runs, so it flips ahead of `SessionHandle::is_ended`.
    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }

    /// Wait until the collector has stopped collecting
    pub async fn finished(&self) {
        self.finished.cancelled().await;
    }

    /// Restart the time/idle deadlines from now
    ///
    /// Bounds left as `None` restart with the session's original value.
    pub fn reset_timer(&self, timer: TimerOptions) {
        self.timers.send_replace(timer);
    }
}

/// Turns a push-based event feed into a pull-based collect/end sequence
///
/// `next` yields zero or more qualifying events and then `None` forever.
/// Once it has returned `None` the collector is spent; a new session
/// needs a new collector.
pub struct Collector<E: SessionEvent> {
    bot_message: BotMessage,
    events: broadcast::Receiver<E>,
    predicate: Predicate<E>,
    options: CollectorOptions,
    control: SessionControl,
    timers: watch::Receiver<TimerOptions>,
    time_deadline: Option<Instant>,
    idle_deadline: Option<Instant>,
    collected: usize,
    ended: Option<EndReason>,
}

impl<E: SessionEvent> Collector<E> {
    /// Create a collector; deadlines start counting immediately
    ///
    /// # Arguments
    ///
    /// * `bot_message` - The message the session is attached to
    /// * `events` - Receiver subscribed to the platform event feed
    /// * `predicate` - Decides whether an attached event qualifies
    /// * `options` - Session bounds
    pub fn new(
        bot_message: BotMessage,
        events: broadcast::Receiver<E>,
        predicate: Predicate<E>,
        options: CollectorOptions,
    ) -> Self {
        let now = Instant::now();
        let (timers_tx, timers) = watch::channel(TimerOptions::default());

        Self {
            bot_message,
            events,
            predicate,
            options,
            control: SessionControl {
                token: CancellationToken::new(),
                finished: CancellationToken::new(),
                timers: Arc::new(timers_tx),
            },
            timers,
            time_deadline: deadline(now, options.time),
            idle_deadline: deadline(now, options.idle),
            collected: 0,
            ended: None,
        }
    }

    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    pub fn bot_message(&self) -> BotMessage {
        self.bot_message
    }

    pub fn is_ended(&self) -> bool {
        self.ended.is_some()
    }

    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            reason: self.ended.unwrap_or(EndReason::Stopped),
            collected: self.collected,
        }
    }

    /// Wait for the next qualifying event
    ///
    /// Returns `None` once the session has ended. Stop requests, deadlines
    /// and incoming events race; whichever is ready first wins and the
    /// others are dropped without being processed.
    pub async fn next(&mut self) -> Option<E> {
        loop {
            if self.ended.is_some() {
                return None;
            }
            if self.control.is_stopped() {
                self.end(EndReason::Stopped);
                continue;
            }

            let time_deadline = self.time_deadline;
            let idle_deadline = self.idle_deadline;
            let timers_open = self.timers.has_changed().is_ok();

            tokio::select! {
                biased;
                _ = self.control.token.cancelled() => self.end(EndReason::Stopped),
                _ = wait_until(time_deadline) => self.end(EndReason::Time),
                _ = wait_until(idle_deadline) => self.end(EndReason::Idle),
                changed = self.timers.changed(), if timers_open => {
                    if changed.is_ok() {
                        let timer = *self.timers.borrow_and_update();
                        self.restart_timers(timer);
                    }
                }
                received = self.events.recv() => match received {
                    Ok(event) => {
                        if let Some(event) = self.admit(event) {
                            return Some(event);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            message_id = %self.bot_message.id,
                            skipped,
                            "Collector lagged behind the event feed, events skipped"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => self.end(EndReason::SourceClosed),
                },
            }
        }
    }

    /// Bounded wait for the first qualifying event
    ///
    /// Consumes the collector: a `None` means the deadline (or a stop)
    /// won the race.
    pub async fn first(mut self) -> Option<E> {
        let first = self.next().await;
        if first.is_some() && self.ended.is_none() {
            self.end(EndReason::Limit);
        }
        first
    }

    fn admit(&mut self, event: E) -> Option<E> {
        if !event.belongs_to(&self.bot_message) {
            return None;
        }

        let predicate = &self.predicate;
        match catch_unwind(AssertUnwindSafe(|| predicate(&event))) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(_) => {
                error!(
                    message_id = %self.bot_message.id,
                    actor = %event.actor().id,
                    "Collector filter panicked, event dropped"
                );
                return None;
            }
        }

        self.collected += 1;
        if self.options.idle.is_some() {
            self.idle_deadline = deadline(Instant::now(), self.options.idle);
        }

        debug!(
            message_id = %self.bot_message.id,
            actor = %event.actor().id,
            collected = self.collected,
            "Event collected"
        );

        if self.options.max.is_some_and(|max| self.collected >= max) {
            self.end(EndReason::Limit);
        }
        Some(event)
    }

    fn restart_timers(&mut self, timer: TimerOptions) {
        let now = Instant::now();
        self.time_deadline = deadline(now, timer.time.or(self.options.time));
        self.idle_deadline = deadline(now, timer.idle.or(self.options.idle));

        debug!(
            message_id = %self.bot_message.id,
            ?timer,
            "Collector timers restarted"
        );
    }

    fn end(&mut self, reason: EndReason) {
        if self.ended.is_some() {
            return;
        }
        self.ended = Some(reason);
        self.control.finished.cancel();

        info!(
            message_id = %self.bot_message.id,
            channel_id = %self.bot_message.channel_id,
            %reason,
            collected = self.collected,
            "Collector ended"
        );
    }
}

/// Deadline `bound` after `now`
///
/// A bound too far out to be represented is no deadline at all.
fn deadline(now: Instant, bound: Option<Duration>) -> Option<Instant> {
    bound.and_then(|bound| now.checked_add(bound))
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

/// Handle to a running streaming session
///
/// Dropping the handle does not stop the session.
pub struct SessionHandle {
    control: SessionControl,
    task: JoinHandle<SessionOutcome>,
    cleanup: CleanupLog,
    attach_failures: Vec<AttachFailure>,
}

impl SessionHandle {
    pub(crate) fn new(
        control: SessionControl,
        task: JoinHandle<SessionOutcome>,
        cleanup: CleanupLog,
    ) -> Self {
        Self {
            control,
            task,
            cleanup,
            attach_failures: Vec::new(),
        }
    }

    pub(crate) fn with_attach_failures(mut self, attach_failures: Vec<AttachFailure>) -> Self {
        self.attach_failures = attach_failures;
        self
    }

    /// Stop collecting
    ///
    /// Idempotent. No event is delivered after the stop is observed; end
    /// cleanup still runs once.
    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn reset_timer(&self, timer: TimerOptions) {
        self.control.reset_timer(timer);
    }

    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    /// True once the session and its end cleanup have finished
    pub fn is_ended(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cleanup_log(&self) -> CleanupLog {
        self.cleanup.clone()
    }

    /// Reactions that could not be attached when the session started
    pub fn attach_failures(&self) -> &[AttachFailure] {
        &self.attach_failures
    }

    /// Wait for the session and its end cleanup to finish
    pub async fn wait(self) -> SessionOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                warn!(?err, "Collector task was cancelled by the runtime");
                SessionOutcome {
                    reason: EndReason::Stopped,
                    collected: 0,
                }
            }
        }
    }
}
