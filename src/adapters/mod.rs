// Trait definitions
pub mod discord_service;

// Implementations
pub mod event_hub;
pub mod serenity_discord_service;

// Re-exports for convenience
pub use discord_service::DiscordService;
pub use event_hub::EventHub;
pub use serenity_discord_service::SerenityDiscordService;
