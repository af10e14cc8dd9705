use serenity::model::id::UserId;

use super::filterable::FilterableMessage;

/// Message predicate scoped to one target user
///
/// A message qualifies only when it was written by the target user and
/// that user is not a bot. Holds no mutable state, so one filter can be
/// evaluated from any number of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFilter {
    target: UserId,
}

impl MessageFilter {
    pub fn for_user(target: UserId) -> Self {
        Self { target }
    }

    pub fn target(&self) -> UserId {
        self.target
    }

    /// Check if a message belongs to this collection session
    pub fn should_collect<M: FilterableMessage>(&self, message: &M) -> bool {
        message.author_id() == self.target && !message.is_bot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::tests::MockMessage;
    use rstest::rstest;

    #[rstest]
    #[case::target_user(MockMessage::new(123), true)]
    #[case::other_user(MockMessage::new(456), false)]
    #[case::target_id_but_bot(MockMessage::new(123).bot(), false)]
    #[case::other_bot(MockMessage::new(456).bot(), false)]
    fn test_message_filter(#[case] message: MockMessage, #[case] expected: bool) {
        let filter = MessageFilter::for_user(UserId::new(123));

        assert_eq!(
            filter.should_collect(&message),
            expected,
            "Filter mismatch for {:?}",
            message
        );
    }
}
