// Mock implementations and event builders for collector testing
#![allow(dead_code)]

pub mod fixtures;
pub mod mock_discord;

pub use fixtures::*;
pub use mock_discord::{Call, MockDiscordService};
