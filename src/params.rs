use anyhow::Context as _;
use serde::Deserialize;
use std::time::Duration;

/// Default command prefix for the demo commands
fn default_command_prefix() -> String {
    "!".to_string()
}

/// Default wait for one-shot questions in seconds
fn default_question_timeout() -> u64 {
    60
}

/// Default menu idle timeout in seconds
fn default_menu_idle() -> u64 {
    120
}

/// Default capacity of each event hub channel
fn default_event_buffer() -> usize {
    256
}

#[derive(Deserialize, Clone)]
pub struct Params {
    pub discord_token: String,

    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    // Collector Configuration
    #[serde(default = "default_question_timeout")]
    pub question_timeout: u64,
    #[serde(default = "default_menu_idle")]
    pub menu_idle: u64,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

/// Mask sensitive strings by showing only first and last few characters
fn mask_token(s: &str) -> String {
    const VISIBLE_CHARS: usize = 4;

    let chars: Vec<char> = s.chars().collect();
    match chars.len() {
        0 => "<empty>".to_string(),
        len if len <= VISIBLE_CHARS * 2 => format!("{}***", chars[0]),
        len => {
            let head: String = chars[..VISIBLE_CHARS].iter().collect();
            let tail: String = chars[len - VISIBLE_CHARS..].iter().collect();
            format!("{head}***{tail}")
        }
    }
}

impl std::fmt::Debug for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Params")
            .field("discord_token", &mask_token(&self.discord_token))
            .field("command_prefix", &self.command_prefix)
            .field("question_timeout", &self.question_timeout)
            .field("menu_idle", &self.menu_idle)
            .field("event_buffer", &self.event_buffer)
            .finish()
    }
}

impl Params {
    pub fn new() -> anyhow::Result<Params> {
        let params =
            envy::from_env::<Params>().context("Failed to load configuration")?;
        params.check()
    }

    fn check(self) -> anyhow::Result<Params> {
        anyhow::ensure!(self.question_timeout > 0, "QUESTION_TIMEOUT must be positive");
        anyhow::ensure!(self.menu_idle > 0, "MENU_IDLE must be positive");
        anyhow::ensure!(self.event_buffer > 0, "EVENT_BUFFER must be positive");
        anyhow::ensure!(!self.command_prefix.is_empty(), "COMMAND_PREFIX must not be empty");
        Ok(self)
    }

    pub fn question_timeout(&self) -> Duration {
        Duration::from_secs(self.question_timeout)
    }

    pub fn menu_idle(&self) -> Duration {
        Duration::from_secs(self.menu_idle)
    }

    /// Strip the command prefix, returning the command name and its argument text
    pub fn parse_command<'a>(&self, content: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = content.strip_prefix(self.command_prefix.as_str())?;
        let mut parts = rest.trim_start().splitn(2, char::is_whitespace);
        let command = parts.next().filter(|command| !command.is_empty())?;
        Some((command, parts.next().unwrap_or_default().trim()))
    }
}
