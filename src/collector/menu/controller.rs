use serenity::async_trait;
use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

use super::handle::{Change, MenuHandle, MenuOps, PageReactionHandler};
use super::page::{Page, PageRef};
use super::state::{MenuState, Navigation};
use crate::adapters::DiscordService;
use crate::collector::cleanup::Cleanup;
use crate::collector::error::CollectorError;
use crate::collector::events::{
    BotMessage, IncomingMessage, IncomingReaction, emoji_position, same_emoji,
};
use crate::collector::filter::{MessageFilter, ReactionFilter};
use crate::collector::options::{CollectorOptions, ReactMenuOptions, TimerOptions};
use crate::collector::reaction_question::{AttachFailure, ReactionCollector, attach_reactions};
use crate::collector::session::{
    Collector, Predicate, SessionControl, SessionHandle, SessionOutcome,
};

/// What a collected reaction means on the page currently shown
enum Action {
    Move(Change),
    Page(Arc<dyn PageReactionHandler>),
    Ignore,
}

struct MenuInner<D: DiscordService> {
    discord: Arc<D>,
    cleanup: Cleanup<D>,
    bot_message: BotMessage,
    pages: Vec<Page>,
    back_emoji: ReactionType,
    forward_emoji: ReactionType,
    control: SessionControl,
    state: Mutex<MenuState>,
    // Reactions the current page wants; the collector only admits these
    active: Arc<Mutex<Vec<ReactionType>>>,
    // Reactions attached by the bot. Held across transition, render and
    // reaction sync so edits land in transition order.
    attached: tokio::sync::Mutex<Vec<ReactionType>>,
    // First render failure of reaction-driven navigation
    failure: Mutex<Option<CollectorError>>,
}

impl<D: DiscordService + 'static> MenuInner<D> {
    fn state(&self) -> MutexGuard<'_, MenuState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn failure(&self) -> MutexGuard<'_, Option<CollectorError>> {
        self.failure.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle(self: &Arc<Self>) -> MenuHandle {
        MenuHandle::new(self.clone())
    }

    /// Navigation pair followed by the page's own reactions
    fn reactions_for(&self, page: &Page) -> Vec<ReactionType> {
        [self.back_emoji.clone(), self.forward_emoji.clone()]
            .into_iter()
            .chain(page.extra_reactions().cloned())
            .collect()
    }

    /// Render the first page and attach its reactions
    async fn show_first_page(&self) -> Result<Vec<AttachFailure>, CollectorError> {
        let mut attached = self.attached.lock().await;
        let Some(first) = self.pages.first() else {
            return Ok(Vec::new());
        };
        self.render(first).await?;
        Ok(self.sync_reactions(first, &mut attached).await)
    }

    /// Apply a change and render the resulting page
    ///
    /// A rejected change leaves both state and message untouched. Nothing
    /// renders once the session has stopped collecting, even while its end
    /// cleanup is still running.
    async fn transition(&self, change: Change) -> Result<bool, CollectorError> {
        if self.is_stopped() {
            return Err(CollectorError::SessionEnded);
        }
        let mut attached = self.attached.lock().await;
        if self.is_stopped() {
            return Err(CollectorError::SessionEnded);
        }

        let page = {
            let mut state = self.state();
            let moved = match &change {
                Change::Step(step) => {
                    state.navigate(*step, &self.pages);
                    true
                }
                Change::GoTo(target) => {
                    state.go_to(target, &self.pages)?;
                    true
                }
                Change::Previous => state.previous(),
            };
            if !moved {
                return Ok(false);
            }
            debug!(
                message_id = %self.bot_message.id,
                ?change,
                location = ?state.location(),
                "Menu moved"
            );
            state.current_page(&self.pages).cloned()
        };

        if let Some(page) = page {
            self.render(&page).await?;
            self.sync_reactions(&page, &mut attached).await;
        }
        Ok(true)
    }

    async fn render(&self, page: &Page) -> Result<(), CollectorError> {
        self.discord
            .edit_message(self.bot_message.channel_id, self.bot_message.id, page)
            .await
            .map_err(|source| CollectorError::platform("failed to render menu page", source))
    }

    /// Make the attached reactions match what `page` wants
    ///
    /// Stale reactions (or a page asking for a clean slate) clear the
    /// message and attach the whole set again; otherwise only the missing
    /// ones are added.
    async fn sync_reactions(
        &self,
        page: &Page,
        attached: &mut Vec<ReactionType>,
    ) -> Vec<AttachFailure> {
        let wanted = self.reactions_for(page);
        *self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = wanted.clone();

        let stale = attached
            .iter()
            .any(|emoji| emoji_position(&wanted, emoji).is_none());
        let missing: Vec<ReactionType> = if page.clear_reactions || stale {
            self.cleanup.clear_reactions(&self.bot_message).await;
            wanted.clone()
        } else {
            wanted
                .iter()
                .filter(|emoji| emoji_position(attached, emoji).is_none())
                .cloned()
                .collect()
        };

        let failures = attach_reactions(self.discord.as_ref(), &self.bot_message, &missing).await;
        *attached = wanted;
        failures
    }

    /// Run a caller-driven change; a render failure stops the menu
    async fn run(&self, change: Change) -> Result<bool, CollectorError> {
        let result = self.transition(change).await;
        if let Err(CollectorError::Platform { source, .. }) = &result {
            error!(
                error = %source,
                message_id = %self.bot_message.id,
                "Menu render failed, stopping menu"
            );
            self.control.stop();
        }
        result
    }

    /// Stop the menu after a render failure during reaction navigation
    ///
    /// The first failure is kept for `MenuController::wait`.
    fn fail(&self, failure: CollectorError) {
        error!(
            error = %failure,
            message_id = %self.bot_message.id,
            "Menu render failed, stopping menu"
        );
        self.failure().get_or_insert(failure);
        self.control.stop();
    }

    fn action_for(&self, emoji: &ReactionType) -> Action {
        if same_emoji(emoji, &self.back_emoji) {
            return Action::Move(Change::Step(Navigation::Back));
        }
        if same_emoji(emoji, &self.forward_emoji) {
            return Action::Move(Change::Step(Navigation::Forward));
        }

        let state = self.state();
        let Some(page) = state.current_page(&self.pages) else {
            return Action::Ignore;
        };
        if page
            .back_emoji
            .as_ref()
            .is_some_and(|back| same_emoji(emoji, back))
        {
            return Action::Move(Change::Previous);
        }
        match (&page.on_react, emoji_position(&page.reactions, emoji)) {
            (Some(handler), Some(_)) => Action::Page(handler.clone()),
            _ => Action::Ignore,
        }
    }

    async fn dispatch_reaction(self: &Arc<Self>, reaction: IncomingReaction) {
        match self.action_for(&reaction.emoji) {
            Action::Move(change) => {
                debug!(?change, user_id = %reaction.user.id, "Menu navigation reaction");
                match self.transition(change).await {
                    Ok(_) | Err(CollectorError::SessionEnded) => {}
                    Err(failure) => self.fail(failure),
                }
            }
            Action::Page(handler) => {
                if let Err(err) = handler.on_react(self.handle(), reaction).await {
                    error!(?err, message_id = %self.bot_message.id, "Page reaction handler failed");
                }
            }
            Action::Ignore => {
                debug!(emoji = %reaction.emoji, "Reaction not bound on the current page");
            }
        }
    }

    async fn dispatch_message(self: &Arc<Self>, message: IncomingMessage) {
        let handler = self
            .state()
            .current_page(&self.pages)
            .and_then(|page| page.on_message.clone());
        let Some(handler) = handler else {
            debug!(message_id = %message.id, "Current page does not read messages");
            return;
        };
        if let Err(err) = handler.on_message(self.handle(), message).await {
            error!(?err, message_id = %self.bot_message.id, "Page message handler failed");
        }
    }
}

#[async_trait]
impl<D: DiscordService + 'static> MenuOps for MenuInner<D> {
    async fn change(&self, change: Change) -> Result<bool, CollectorError> {
        self.run(change).await
    }

    fn current_index(&self) -> usize {
        self.state().current_index()
    }

    fn can_go_back(&self) -> bool {
        self.state().can_go_back()
    }

    fn current_page(&self) -> Option<Page> {
        self.state().current_page(&self.pages).cloned()
    }

    fn bot_message(&self) -> BotMessage {
        self.bot_message
    }

    fn stop(&self) {
        self.control.stop();
    }

    fn reset_timer(&self, timer: TimerOptions) {
        self.control.reset_timer(timer);
    }

    fn is_stopped(&self) -> bool {
        self.failure().is_some() || self.control.is_stopped() || self.control.is_finished()
    }
}

/// Every emoji any page of the menu may attach
fn menu_reactions(options: &ReactMenuOptions) -> Vec<ReactionType> {
    fn collect(pages: &[Page], into: &mut Vec<ReactionType>) {
        for page in pages {
            for emoji in page.extra_reactions() {
                if emoji_position(into, emoji).is_none() {
                    into.push(emoji.clone());
                }
            }
            collect(&page.pages, into);
        }
    }

    let mut reactions = vec![options.back_emoji.clone(), options.forward_emoji.clone()];
    collect(&options.pages, &mut reactions);
    reactions
}

/// A live reaction-navigated menu on one bot message
///
/// Exactly one page is current at any time. Navigation after the menu has
/// ended is rejected with `CollectorError::SessionEnded`.
pub struct MenuController<D: DiscordService> {
    menu: Arc<MenuInner<D>>,
    session: SessionHandle,
    messages: Option<SessionHandle>,
}

impl<D: DiscordService + 'static> ReactionCollector<D> {
    /// Start a menu
    ///
    /// Checks the channel, renders the first page, then attaches the back
    /// and forward reactions in that order followed by the page's own.
    pub async fn menu(
        &self,
        options: ReactMenuOptions,
    ) -> Result<MenuController<D>, CollectorError> {
        let options = options.validate()?;
        let bot_message = options.bot_message;
        self.check_channel(&bot_message).await?;

        let active = Arc::new(Mutex::new(Vec::new()));
        let mut collector = self.open_menu(&options, active.clone());

        let discord = self.discord();
        let menu = Arc::new(MenuInner {
            discord: discord.clone(),
            cleanup: Cleanup::new(discord),
            bot_message,
            back_emoji: options.back_emoji,
            forward_emoji: options.forward_emoji,
            control: collector.control(),
            state: Mutex::new(MenuState::new()),
            active,
            attached: tokio::sync::Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            pages: options.pages,
        });

        let attach_failures = menu.show_first_page().await?;

        let messages = menu
            .pages
            .iter()
            .any(Page::reads_messages)
            .then(|| self.read_messages(&menu, options.user));

        let cleanup_log = menu.cleanup.log();
        let delete_reaction = options.delete_reaction;
        let delete_all_on_end = options.delete_all_on_end;
        let task = tokio::spawn({
            let menu = menu.clone();
            async move {
                while let Some(reaction) = collector.next().await {
                    if delete_reaction {
                        menu.cleanup
                            .delete_reaction(&bot_message, reaction.user.id, &reaction.emoji)
                            .await;
                    }
                    menu.dispatch_reaction(reaction).await;
                }

                if delete_all_on_end {
                    // A transition already rendering finishes before the clear
                    let _attached = menu.attached.lock().await;
                    menu.cleanup.clear_reactions(&bot_message).await;
                }
                collector.outcome()
            }
        });

        let session = SessionHandle::new(menu.control.clone(), task, cleanup_log)
            .with_attach_failures(attach_failures);
        Ok(MenuController {
            menu,
            session,
            messages,
        })
    }

    /// Subscribe to navigation and page reactions
    ///
    /// Only the reactions the current page wants are collected.
    fn open_menu(
        &self,
        options: &ReactMenuOptions,
        active: Arc<Mutex<Vec<ReactionType>>>,
    ) -> Collector<IncomingReaction> {
        let filter = ReactionFilter::new(options.user, menu_reactions(options));
        let predicate: Predicate<IncomingReaction> = Arc::new(move |reaction: &IncomingReaction| {
            filter.should_collect(reaction)
                && emoji_position(
                    &active.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
                    &reaction.emoji,
                )
                .is_some()
        });

        Collector::new(
            options.bot_message,
            self.hub().subscribe_reactions(),
            predicate,
            options.collector_options,
        )
    }

    /// Feed the menu user's messages to the current page until the menu ends
    fn read_messages(&self, menu: &Arc<MenuInner<D>>, user: UserId) -> SessionHandle {
        let filter = MessageFilter::for_user(user);
        let predicate: Predicate<IncomingMessage> =
            Arc::new(move |message: &IncomingMessage| filter.should_collect(message));
        let mut collector = Collector::new(
            menu.bot_message,
            self.hub().subscribe_messages(),
            predicate,
            CollectorOptions::default(),
        );

        let control = collector.control();
        let menu_control = menu.control.clone();
        let message_control = control.clone();
        tokio::spawn(async move {
            menu_control.finished().await;
            message_control.stop();
        });

        let task = tokio::spawn({
            let menu = menu.clone();
            async move {
                while let Some(message) = collector.next().await {
                    menu.dispatch_message(message).await;
                }
                collector.outcome()
            }
        });

        SessionHandle::new(control, task, menu.cleanup.log())
    }
}

impl<D: DiscordService + 'static> MenuController<D> {
    /// Show the next page of the active set, wrapping to the first
    pub async fn forward(&self) -> Result<(), CollectorError> {
        self.menu.change(Change::Step(Navigation::Forward)).await.map(drop)
    }

    /// Show the previous page of the active set, wrapping to the last
    pub async fn back(&self) -> Result<(), CollectorError> {
        self.menu.change(Change::Step(Navigation::Back)).await.map(drop)
    }

    /// Jump to a page by id or index
    ///
    /// An id is looked up among the current page's nested pages first, then
    /// among the top-level pages.
    pub async fn go_to(&self, target: impl Into<PageRef>) -> Result<(), CollectorError> {
        self.menu.change(Change::GoTo(target.into())).await.map(drop)
    }

    /// Return to the page shown before the last `go_to`
    ///
    /// Resolves to `false` without rendering when there is no history.
    pub async fn previous(&self) -> Result<bool, CollectorError> {
        self.menu.change(Change::Previous).await
    }

    /// A cloneable handle for moving the menu from other tasks
    pub fn handle(&self) -> MenuHandle {
        self.menu.handle()
    }

    pub fn can_go_back(&self) -> bool {
        self.menu.can_go_back()
    }

    pub fn current_index(&self) -> usize {
        self.menu.current_index()
    }

    pub fn current_page(&self) -> Option<Page> {
        self.menu.current_page()
    }

    pub fn bot_message(&self) -> BotMessage {
        self.menu.bot_message
    }

    pub fn stop(&self) {
        self.menu.stop();
    }

    pub fn reset_timer(&self, timer: TimerOptions) {
        self.menu.reset_timer(timer);
    }

    /// True once the menu and its end cleanup have finished
    pub fn is_ended(&self) -> bool {
        self.session.is_ended()
    }

    /// The underlying reaction session
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Wait for the menu to end
    ///
    /// Fails with the render error when a failed edit stopped the menu.
    pub async fn wait(self) -> Result<SessionOutcome, CollectorError> {
        let outcome = self.session.wait().await;
        if let Some(messages) = self.messages {
            messages.stop();
            messages.wait().await;
        }
        match self.menu.failure().take() {
            Some(failure) => Err(failure),
            None => Ok(outcome),
        }
    }
}
