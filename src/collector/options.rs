use serde::Deserialize;
use serenity::model::channel::ReactionType;
use serenity::model::id::UserId;
use std::time::Duration;
use tracing::warn;

use super::error::{CollectorError, Schema};
use super::events::{BotMessage, same_emoji};
use super::handlers::ReactionMap;
use super::menu::Page;

/// Wait applied to async questions that were given no `time` bound
pub const DEFAULT_WAIT: Duration = Duration::from_secs(60);

/// Deserialize an optional number of seconds into a Duration
fn deserialize_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs: Option<u64> = Option::deserialize(deserializer)?;
    Ok(secs.map(Duration::from_secs))
}

/// Bounds of a collector session
///
/// A session ends when any configured bound is reached:
/// - `time`: total session duration
/// - `idle`: longest gap between qualifying events
/// - `max`: number of qualifying events
///
/// With no bound at all a streaming session runs until it is stopped
/// explicitly. That is usually a leak; validation logs a warning for it
/// but never invents a timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CollectorOptions {
    #[serde(default, deserialize_with = "deserialize_secs")]
    pub time: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_secs")]
    pub idle: Option<Duration>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl CollectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(mut self, time: Duration) -> Self {
        self.time = Some(time);
        self
    }

    pub fn idle(mut self, idle: Duration) -> Self {
        self.idle = Some(idle);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// True when nothing but an explicit stop can end the session
    pub fn is_unbounded(&self) -> bool {
        self.time.is_none() && self.idle.is_none() && self.max.is_none()
    }

    fn check(&self, schema: Schema) -> Result<(), CollectorError> {
        if self.time == Some(Duration::ZERO) {
            return Err(CollectorError::invalid_options(schema, "time must be greater than zero"));
        }
        if self.idle == Some(Duration::ZERO) {
            return Err(CollectorError::invalid_options(schema, "idle must be greater than zero"));
        }
        if self.max == Some(0) {
            return Err(CollectorError::invalid_options(schema, "max must be greater than zero"));
        }
        Ok(())
    }

    /// Validate options for a streaming session
    fn validate_streaming(self, schema: Schema) -> Result<Self, CollectorError> {
        self.check(schema)?;
        if self.is_unbounded() {
            warn!(
                %schema,
                "Collector has no time, idle or max bound; it will run until stopped"
            );
        }
        Ok(self)
    }

    /// Validate options for a bounded wait, filling `time` when absent
    fn validate_bounded(self, schema: Schema) -> Result<Self, CollectorError> {
        self.check(schema)?;
        Ok(Self {
            time: Some(self.time.unwrap_or(DEFAULT_WAIT)),
            max: Some(1),
            ..self
        })
    }
}

/// Deadlines a running session can be restarted with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerOptions {
    pub time: Option<Duration>,
    pub idle: Option<Duration>,
}

/// Options of a message question (one-shot, async, or raw collector)
#[derive(Debug, Clone)]
pub struct MessageQuestionOptions {
    pub bot_message: BotMessage,
    pub user: UserId,
    pub collector_options: CollectorOptions,
    /// Delete the user's message once it has been collected
    pub delete_message: bool,
}

impl MessageQuestionOptions {
    pub fn new(bot_message: BotMessage, user: UserId) -> Self {
        Self {
            bot_message,
            user,
            collector_options: CollectorOptions::default(),
            delete_message: false,
        }
    }

    pub fn collector_options(mut self, collector_options: CollectorOptions) -> Self {
        self.collector_options = collector_options;
        self
    }

    pub fn delete_message(mut self, delete_message: bool) -> Self {
        self.delete_message = delete_message;
        self
    }

    /// Validate against a message schema
    ///
    /// `MessageAsyncQuestion` is a bounded wait for one message; the other
    /// message schemas are streaming.
    pub fn validate(mut self, schema: Schema) -> Result<Self, CollectorError> {
        self.collector_options = match schema {
            Schema::MessageAsyncQuestion => self.collector_options.validate_bounded(schema)?,
            Schema::MessageQuestion | Schema::MessageCollector => {
                self.collector_options.validate_streaming(schema)?
            }
            other => {
                return Err(CollectorError::invalid_options(
                    other,
                    "not a message schema",
                ));
            }
        };
        Ok(self)
    }
}

/// Options of a streaming reaction question
#[derive(Clone)]
pub struct ReactQuestionOptions {
    pub bot_message: BotMessage,
    pub user: UserId,
    pub reactions: ReactionMap,
    pub collector_options: CollectorOptions,
    /// Remove the user's reaction after each collect
    pub delete_reaction: bool,
    /// Remove every reaction from the bot message when the session ends
    pub delete_all_on_end: bool,
}

impl ReactQuestionOptions {
    pub fn new(bot_message: BotMessage, user: UserId, reactions: ReactionMap) -> Self {
        Self {
            bot_message,
            user,
            reactions,
            collector_options: CollectorOptions::default(),
            delete_reaction: false,
            delete_all_on_end: false,
        }
    }

    pub fn collector_options(mut self, collector_options: CollectorOptions) -> Self {
        self.collector_options = collector_options;
        self
    }

    pub fn delete_reaction(mut self, delete_reaction: bool) -> Self {
        self.delete_reaction = delete_reaction;
        self
    }

    pub fn delete_all_on_end(mut self, delete_all_on_end: bool) -> Self {
        self.delete_all_on_end = delete_all_on_end;
        self
    }

    pub fn validate(mut self) -> Result<Self, CollectorError> {
        self.reactions.validate()?;
        self.collector_options = self
            .collector_options
            .validate_streaming(Schema::ReactQuestion)?;
        Ok(self)
    }
}

impl std::fmt::Debug for ReactQuestionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactQuestionOptions")
            .field("bot_message", &self.bot_message)
            .field("user", &self.user)
            .field("reactions", &self.reactions.emojis())
            .field("collector_options", &self.collector_options)
            .field("delete_reaction", &self.delete_reaction)
            .field("delete_all_on_end", &self.delete_all_on_end)
            .finish()
    }
}

/// Default affirmative/negative pair of a yes/no question
pub fn default_yes_no() -> Vec<ReactionType> {
    vec![
        ReactionType::Unicode("✅".to_string()),
        ReactionType::Unicode("❌".to_string()),
    ]
}

/// Options of an async (yes/no shaped) reaction question
///
/// The first reaction is the affirmative answer.
#[derive(Debug, Clone)]
pub struct ReactAsyncQuestionOptions {
    pub bot_message: BotMessage,
    pub user: UserId,
    pub reactions: Vec<ReactionType>,
    pub collector_options: CollectorOptions,
    pub delete_reaction: bool,
    pub delete_all_on_end: bool,
}

impl ReactAsyncQuestionOptions {
    pub fn new(bot_message: BotMessage, user: UserId) -> Self {
        Self {
            bot_message,
            user,
            reactions: default_yes_no(),
            collector_options: CollectorOptions::default(),
            delete_reaction: false,
            delete_all_on_end: false,
        }
    }

    pub fn reactions(mut self, reactions: Vec<ReactionType>) -> Self {
        self.reactions = reactions;
        self
    }

    pub fn collector_options(mut self, collector_options: CollectorOptions) -> Self {
        self.collector_options = collector_options;
        self
    }

    pub fn delete_reaction(mut self, delete_reaction: bool) -> Self {
        self.delete_reaction = delete_reaction;
        self
    }

    pub fn delete_all_on_end(mut self, delete_all_on_end: bool) -> Self {
        self.delete_all_on_end = delete_all_on_end;
        self
    }

    pub fn validate(mut self) -> Result<Self, CollectorError> {
        let schema = Schema::ReactAsyncQuestion;
        if self.reactions.is_empty() {
            return Err(CollectorError::InvalidConfiguration(
                "async reaction question needs at least one reaction".to_string(),
            ));
        }
        if has_duplicates(&self.reactions) {
            return Err(CollectorError::invalid_options(schema, "reactions contain duplicates"));
        }
        self.collector_options = self.collector_options.validate_bounded(schema)?;
        Ok(self)
    }
}

/// Default navigation emoji of a menu
pub fn default_back_emoji() -> ReactionType {
    ReactionType::Unicode("◀️".to_string())
}

pub fn default_forward_emoji() -> ReactionType {
    ReactionType::Unicode("▶️".to_string())
}

/// Options of a reaction-navigated menu
#[derive(Debug, Clone)]
pub struct ReactMenuOptions {
    pub bot_message: BotMessage,
    pub user: UserId,
    pub pages: Vec<Page>,
    pub collector_options: CollectorOptions,
    pub back_emoji: ReactionType,
    pub forward_emoji: ReactionType,
    /// Menus remove the navigating reaction by default so it can be pressed again
    pub delete_reaction: bool,
    pub delete_all_on_end: bool,
}

impl ReactMenuOptions {
    pub fn new(bot_message: BotMessage, user: UserId, pages: Vec<Page>) -> Self {
        Self {
            bot_message,
            user,
            pages,
            collector_options: CollectorOptions::default(),
            back_emoji: default_back_emoji(),
            forward_emoji: default_forward_emoji(),
            delete_reaction: true,
            delete_all_on_end: false,
        }
    }

    pub fn collector_options(mut self, collector_options: CollectorOptions) -> Self {
        self.collector_options = collector_options;
        self
    }

    pub fn navigation(mut self, back_emoji: ReactionType, forward_emoji: ReactionType) -> Self {
        self.back_emoji = back_emoji;
        self.forward_emoji = forward_emoji;
        self
    }

    pub fn delete_reaction(mut self, delete_reaction: bool) -> Self {
        self.delete_reaction = delete_reaction;
        self
    }

    pub fn delete_all_on_end(mut self, delete_all_on_end: bool) -> Self {
        self.delete_all_on_end = delete_all_on_end;
        self
    }

    pub fn validate(mut self) -> Result<Self, CollectorError> {
        let schema = Schema::ReactMenu;
        if self.pages.is_empty() {
            return Err(CollectorError::InvalidConfiguration(
                "menu pages are empty".to_string(),
            ));
        }
        if same_emoji(&self.back_emoji, &self.forward_emoji) {
            return Err(CollectorError::invalid_options(
                schema,
                "back and forward emoji must differ",
            ));
        }
        let navigation = [&self.back_emoji, &self.forward_emoji];
        let invalid = first_invalid_page(&self.pages, &|page: &Page| {
            let extra: Vec<ReactionType> = page.extra_reactions().cloned().collect();
            if page.is_blank() {
                Some("has neither content nor embed")
            } else if !page.reactions.is_empty() && page.on_react.is_none() {
                Some("has reactions but no on_react handler")
            } else if has_duplicates(&extra) {
                Some("repeats a reaction")
            } else if extra
                .iter()
                .any(|emoji| navigation.iter().any(|nav| same_emoji(nav, emoji)))
            {
                Some("reuses a navigation emoji")
            } else {
                None
            }
        });
        if let Some((path, cause)) = invalid {
            return Err(CollectorError::invalid_options(
                schema,
                format!("page {path} {cause}"),
            ));
        }
        self.collector_options = self.collector_options.validate_streaming(schema)?;
        Ok(self)
    }
}

fn has_duplicates(reactions: &[ReactionType]) -> bool {
    reactions
        .iter()
        .enumerate()
        .any(|(i, emoji)| reactions[..i].iter().any(|earlier| same_emoji(earlier, emoji)))
}

/// Path and cause of the first page (nested pages included) failing `check`
fn first_invalid_page<F>(pages: &[Page], check: &F) -> Option<(String, &'static str)>
where
    F: Fn(&Page) -> Option<&'static str>,
{
    pages.iter().enumerate().find_map(|(i, page)| {
        if let Some(cause) = check(page) {
            return Some((i.to_string(), cause));
        }
        first_invalid_page(&page.pages, check).map(|(nested, cause)| (format!("{i}.{nested}"), cause))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use crate::collector::events::IncomingReaction;
    use crate::collector::menu::MenuHandle;
    use serenity::model::id::{ChannelId, MessageId};

    fn bot_message() -> BotMessage {
        BotMessage::new(MessageId::new(1), ChannelId::new(2))
    }

    async fn noop_page_handler(_: MenuHandle, _: IncomingReaction) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_deserialize_collector_options_from_seconds() {
        let options: CollectorOptions =
            serde_json::from_str(r#"{"time": 30, "max": 1}"#).unwrap();

        assert_eq!(options.time, Some(Duration::from_secs(30)));
        assert_eq!(options.idle, None);
        assert_eq!(options.max, Some(1));
    }

    #[test]
    fn test_streaming_question_keeps_unbounded_options() {
        let options = MessageQuestionOptions::new(bot_message(), UserId::new(3))
            .validate(Schema::MessageQuestion)
            .unwrap();

        assert!(options.collector_options.is_unbounded(), "no implicit timeout");
    }

    #[test]
    fn test_async_question_fills_default_wait() {
        let options = MessageQuestionOptions::new(bot_message(), UserId::new(3))
            .validate(Schema::MessageAsyncQuestion)
            .unwrap();

        assert_eq!(options.collector_options.time, Some(DEFAULT_WAIT));
        assert_eq!(options.collector_options.max, Some(1));
    }

    #[test]
    fn test_async_question_keeps_caller_time() {
        let options = MessageQuestionOptions::new(bot_message(), UserId::new(3))
            .collector_options(CollectorOptions::new().time(Duration::from_secs(5)))
            .validate(Schema::MessageAsyncQuestion)
            .unwrap();

        assert_eq!(options.collector_options.time, Some(Duration::from_secs(5)));
    }

    #[rstest]
    #[case::zero_time(CollectorOptions::new().time(Duration::ZERO), "time")]
    #[case::zero_idle(CollectorOptions::new().idle(Duration::ZERO), "idle")]
    #[case::zero_max(CollectorOptions::new().max(0), "max")]
    fn test_zero_bounds_rejected(#[case] collector_options: CollectorOptions, #[case] field: &str) {
        let err = MessageQuestionOptions::new(bot_message(), UserId::new(3))
            .collector_options(collector_options)
            .validate(Schema::MessageQuestion)
            .unwrap_err();

        match err {
            CollectorError::InvalidOptions { schema, cause } => {
                assert_eq!(schema, Schema::MessageQuestion);
                assert!(cause.contains(field), "cause '{}' should name {}", cause, field);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_message_options_reject_reaction_schema() {
        let result = MessageQuestionOptions::new(bot_message(), UserId::new(3))
            .validate(Schema::ReactQuestion);

        assert!(matches!(result, Err(CollectorError::InvalidOptions { .. })));
    }

    #[test]
    fn test_async_reaction_defaults_to_yes_no() {
        let options = ReactAsyncQuestionOptions::new(bot_message(), UserId::new(3))
            .validate()
            .unwrap();

        assert_eq!(options.reactions, default_yes_no());
        assert_eq!(options.collector_options.time, Some(DEFAULT_WAIT));
    }

    #[rstest]
    #[case::empty(Vec::new(), true)]
    #[case::duplicates(vec![ReactionType::Unicode("✅".into()), ReactionType::Unicode("✅".into())], false)]
    fn test_async_reaction_rejects_bad_sets(
        #[case] reactions: Vec<ReactionType>,
        #[case] expect_configuration_error: bool,
    ) {
        let err = ReactAsyncQuestionOptions::new(bot_message(), UserId::new(3))
            .reactions(reactions)
            .validate()
            .unwrap_err();

        assert_eq!(
            matches!(err, CollectorError::InvalidConfiguration(_)),
            expect_configuration_error,
            "unexpected error kind: {err:?}"
        );
    }

    #[test]
    fn test_menu_rejects_empty_pages() {
        let err = ReactMenuOptions::new(bot_message(), UserId::new(3), Vec::new())
            .validate()
            .unwrap_err();

        assert!(matches!(err, CollectorError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_menu_rejects_blank_nested_page() {
        let pages = vec![Page::content("one").with_pages(vec![Page::content("1a"), Page::default()])];

        let err = ReactMenuOptions::new(bot_message(), UserId::new(3), pages)
            .validate()
            .unwrap_err();

        match err {
            CollectorError::InvalidOptions { cause, .. } => assert!(cause.contains("0.1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_menu_rejects_identical_navigation() {
        let err = ReactMenuOptions::new(bot_message(), UserId::new(3), vec![Page::content("one")])
            .navigation(default_forward_emoji(), default_forward_emoji())
            .validate()
            .unwrap_err();

        assert!(matches!(err, CollectorError::InvalidOptions { .. }));
    }

    #[rstest]
    #[case::reactions_without_handler(
        Page::content("one").with_pages(vec![Page::content("1a"), Page {
            reactions: vec![ReactionType::Unicode("🍎".into())],
            ..Page::content("1b")
        }]),
        "0.1 has reactions but no on_react handler"
    )]
    #[case::navigation_reused(
        Page::content("one").with_back_emoji(default_forward_emoji()),
        "0 reuses a navigation emoji"
    )]
    #[case::repeated(
        Page::content("one")
            .with_reactions(vec![ReactionType::Unicode("↩️".into())], noop_page_handler)
            .with_back_emoji(ReactionType::Unicode("↩️".into())),
        "0 repeats a reaction"
    )]
    fn test_menu_rejects_bad_page_reactions(#[case] page: Page, #[case] expected: &str) {
        let err = ReactMenuOptions::new(bot_message(), UserId::new(3), vec![page])
            .validate()
            .unwrap_err();

        match err {
            CollectorError::InvalidOptions { cause, .. } => {
                assert!(cause.ends_with(expected), "unexpected cause '{cause}'")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_menu_deletes_navigating_reaction_by_default() {
        let options = ReactMenuOptions::new(bot_message(), UserId::new(3), vec![Page::content("one")]);
        assert!(options.delete_reaction);
        assert!(!options.delete_all_on_end);
    }
}
