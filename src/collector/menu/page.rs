use serenity::builder::CreateEmbed;
use serenity::model::channel::ReactionType;
use std::fmt;
use std::sync::Arc;

use super::handle::{PageMessageHandler, PageReactionHandler};

/// One renderable menu page
///
/// A page renders as message content, an embed, or both. Pages may carry
/// nested sub-pages reachable through `MenuController::go_to`.
///
/// While a page is shown, its own `reactions` are attached next to the
/// menu's navigation pair and dispatched to `on_react`. A `back_emoji`
/// returns to the page shown before the last `go_to`.
#[derive(Clone, Default)]
pub struct Page {
    pub id: Option<String>,
    pub content: Option<String>,
    pub embed: Option<CreateEmbed>,
    pub pages: Vec<Page>,
    pub reactions: Vec<ReactionType>,
    pub back_emoji: Option<ReactionType>,
    /// Remove every reaction on the message before this page's are attached
    pub clear_reactions: bool,
    pub on_react: Option<Arc<dyn PageReactionHandler>>,
    pub on_message: Option<Arc<dyn PageMessageHandler>>,
}

impl Page {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: CreateEmbed) -> Self {
        Self {
            embed: Some(embed),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }

    /// Attach `reactions` while this page is shown and route them to `handler`
    pub fn with_reactions<H>(mut self, reactions: Vec<ReactionType>, handler: H) -> Self
    where
        H: PageReactionHandler + 'static,
    {
        self.reactions = reactions;
        self.on_react = Some(Arc::new(handler));
        self
    }

    pub fn with_back_emoji(mut self, back_emoji: ReactionType) -> Self {
        self.back_emoji = Some(back_emoji);
        self
    }

    pub fn with_clear_reactions(mut self) -> Self {
        self.clear_reactions = true;
        self
    }

    /// Route the menu user's messages to `handler` while this page is shown
    pub fn with_on_message<H>(mut self, handler: H) -> Self
    where
        H: PageMessageHandler + 'static,
    {
        self.on_message = Some(Arc::new(handler));
        self
    }

    /// A page with neither content nor embed renders nothing
    pub fn is_blank(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty) && self.embed.is_none()
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    /// Emoji this page attaches on top of the menu's navigation pair
    pub fn extra_reactions(&self) -> impl Iterator<Item = &ReactionType> {
        self.back_emoji.iter().chain(self.reactions.iter())
    }

    /// Whether this page or any nested page reads messages
    pub(crate) fn reads_messages(&self) -> bool {
        self.on_message.is_some() || self.pages.iter().any(Page::reads_messages)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("content", &self.content)
            .field("embed", &self.embed)
            .field("pages", &self.pages)
            .field("reactions", &self.reactions)
            .field("back_emoji", &self.back_emoji)
            .field("clear_reactions", &self.clear_reactions)
            .field("on_react", &self.on_react.is_some())
            .field("on_message", &self.on_message.is_some())
            .finish()
    }
}

/// Reference to a page by id or by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Index(usize),
    Id(String),
}

impl From<usize> for PageRef {
    fn from(index: usize) -> Self {
        PageRef::Index(index)
    }
}

impl From<&str> for PageRef {
    fn from(id: &str) -> Self {
        PageRef::Id(id.to_string())
    }
}

impl From<String> for PageRef {
    fn from(id: String) -> Self {
        PageRef::Id(id)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Index(index) => write!(f, "#{index}"),
            PageRef::Id(id) => write!(f, "'{id}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::events::{IncomingMessage, IncomingReaction};
    use crate::collector::menu::MenuHandle;
    use rstest::rstest;

    #[rstest]
    #[case::default(Page::default(), true)]
    #[case::empty_content(Page::content(""), true)]
    #[case::content(Page::content("hello"), false)]
    #[case::embed(Page::embed(CreateEmbed::new().title("t")), false)]
    fn test_is_blank(#[case] page: Page, #[case] expected: bool) {
        assert_eq!(page.is_blank(), expected);
    }

    #[test]
    fn test_page_ref_conversions() {
        assert_eq!(PageRef::from(2usize), PageRef::Index(2));
        assert_eq!(PageRef::from("help"), PageRef::Id("help".to_string()));
        assert_eq!(PageRef::from("help").to_string(), "'help'");
        assert_eq!(PageRef::from(2usize).to_string(), "#2");
    }

    #[test]
    fn test_extra_reactions_put_back_emoji_first() {
        let page = Page::content("pick")
            .with_reactions(
                vec![ReactionType::Unicode("🍎".into())],
                |_: MenuHandle, _: IncomingReaction| async { anyhow::Ok(()) },
            )
            .with_back_emoji(ReactionType::Unicode("↩️".into()));

        let extra: Vec<&ReactionType> = page.extra_reactions().collect();
        assert_eq!(
            extra,
            vec![
                &ReactionType::Unicode("↩️".into()),
                &ReactionType::Unicode("🍎".into())
            ]
        );
    }

    #[test]
    fn test_reads_messages_looks_into_nested_pages() {
        let nested = Page::content("outer").with_pages(vec![
            Page::content("inner")
                .with_on_message(|_: MenuHandle, _: IncomingMessage| async { anyhow::Ok(()) }),
        ]);

        assert!(nested.reads_messages());
        assert!(!Page::content("plain").reads_messages());
    }
}
