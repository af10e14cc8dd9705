mod filterable;
mod message_filter;
mod reaction_filter;

#[cfg(test)]
mod tests;

// Re-export public API
pub use filterable::{FilterableMessage, FilterableReaction};
pub use message_filter::MessageFilter;
pub use reaction_filter::ReactionFilter;
