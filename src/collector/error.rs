use serenity::model::id::ChannelId;
use std::fmt;

/// Option schema a set of caller options was validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    MessageQuestion,
    MessageAsyncQuestion,
    MessageCollector,
    ReactMenu,
    ReactQuestion,
    ReactAsyncQuestion,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Schema::MessageQuestion => "messageQuestion",
            Schema::MessageAsyncQuestion => "messageAsyncQuestion",
            Schema::MessageCollector => "messageCollector",
            Schema::ReactMenu => "reactMenu",
            Schema::ReactQuestion => "reactQuestion",
            Schema::ReactAsyncQuestion => "reactAsyncQuestion",
        };
        f.write_str(name)
    }
}

/// Failures scoped to a single collector session
///
/// None of these are fatal to the host process. Configuration errors are
/// raised before any platform call; platform errors surface the primary
/// action's failure. Best-effort cleanup never produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Caller supplied inconsistent options (e.g. reaction/handler count mismatch)
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Options failed schema validation
    #[error("invalid {schema} options: {cause}")]
    InvalidOptions { schema: Schema, cause: String },

    /// The bot message's channel can no longer be accessed
    #[error("channel {channel_id} is unavailable")]
    ChannelUnavailable {
        channel_id: ChannelId,
        #[source]
        source: serenity::Error,
    },

    /// A primary platform call failed
    #[error("{context}")]
    Platform {
        context: &'static str,
        #[source]
        source: serenity::Error,
    },

    /// A menu jump named a page that does not exist
    #[error("page {0} not found")]
    PageNotFound(String),

    /// The session was already over when the operation was requested
    #[error("session has ended")]
    SessionEnded,
}

impl CollectorError {
    pub(crate) fn invalid_options(schema: Schema, cause: impl Into<String>) -> Self {
        CollectorError::InvalidOptions {
            schema,
            cause: cause.into(),
        }
    }

    pub(crate) fn platform(context: &'static str, source: serenity::Error) -> Self {
        CollectorError::Platform { context, source }
    }
}
