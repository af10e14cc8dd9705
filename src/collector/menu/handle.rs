use serenity::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::page::{Page, PageRef};
use super::state::Navigation;
use crate::collector::error::CollectorError;
use crate::collector::events::{BotMessage, IncomingMessage, IncomingReaction};
use crate::collector::options::TimerOptions;

/// A requested move between pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Change {
    Step(Navigation),
    GoTo(PageRef),
    Previous,
}

/// Operations a running menu exposes to its handles
#[async_trait]
pub(crate) trait MenuOps: Send + Sync {
    /// Apply a change and render; `Ok(false)` when nothing moved
    async fn change(&self, change: Change) -> Result<bool, CollectorError>;
    fn current_index(&self) -> usize;
    fn can_go_back(&self) -> bool;
    fn current_page(&self) -> Option<Page>;
    fn bot_message(&self) -> BotMessage;
    fn stop(&self);
    fn reset_timer(&self, timer: TimerOptions);
    fn is_stopped(&self) -> bool;
}

/// Cloneable access to a running menu
///
/// Handed to page handlers so they can move the menu they belong to.
/// Navigation through a handle follows the same rules as through the
/// `MenuController`.
#[derive(Clone)]
pub struct MenuHandle {
    ops: Arc<dyn MenuOps>,
}

impl MenuHandle {
    pub(crate) fn new(ops: Arc<dyn MenuOps>) -> Self {
        Self { ops }
    }

    pub async fn forward(&self) -> Result<(), CollectorError> {
        self.ops.change(Change::Step(Navigation::Forward)).await.map(drop)
    }

    pub async fn back(&self) -> Result<(), CollectorError> {
        self.ops.change(Change::Step(Navigation::Back)).await.map(drop)
    }

    pub async fn go_to(&self, target: impl Into<PageRef>) -> Result<(), CollectorError> {
        self.ops.change(Change::GoTo(target.into())).await.map(drop)
    }

    /// Return to the page shown before the last `go_to`
    pub async fn previous(&self) -> Result<bool, CollectorError> {
        self.ops.change(Change::Previous).await
    }

    pub fn current_index(&self) -> usize {
        self.ops.current_index()
    }

    pub fn can_go_back(&self) -> bool {
        self.ops.can_go_back()
    }

    pub fn current_page(&self) -> Option<Page> {
        self.ops.current_page()
    }

    pub fn bot_message(&self) -> BotMessage {
        self.ops.bot_message()
    }

    pub fn stop(&self) {
        self.ops.stop();
    }

    pub fn reset_timer(&self, timer: TimerOptions) {
        self.ops.reset_timer(timer);
    }

    /// True once the menu no longer accepts navigation
    pub fn is_ended(&self) -> bool {
        self.ops.is_stopped()
    }
}

/// Callback for a page's own reactions
#[async_trait]
pub trait PageReactionHandler: Send + Sync {
    async fn on_react(&self, menu: MenuHandle, reaction: IncomingReaction) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> PageReactionHandler for F
where
    F: Fn(MenuHandle, IncomingReaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_react(&self, menu: MenuHandle, reaction: IncomingReaction) -> anyhow::Result<()> {
        (self)(menu, reaction).await
    }
}

/// Callback for the menu user's messages while a page is shown
#[async_trait]
pub trait PageMessageHandler: Send + Sync {
    async fn on_message(&self, menu: MenuHandle, message: IncomingMessage) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> PageMessageHandler for F
where
    F: Fn(MenuHandle, IncomingMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_message(&self, menu: MenuHandle, message: IncomingMessage) -> anyhow::Result<()> {
        (self)(menu, message).await
    }
}
