mod params;

use anyhow::Context as _;
use reactkit::adapters::{EventHub, SerenityDiscordService};
use reactkit::collector::{
    Answer, BotMessage, CollectorOptions, IncomingMessage, IncomingReaction, MenuHandle,
    MessageCollector, MessageQuestionOptions, Page, ReactAsyncQuestionOptions, ReactMenuOptions,
    ReactionCollector,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use serenity::async_trait;
use serenity::builder::CreateEmbed;
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::gateway::Ready;
use serenity::prelude::*;

/// Number of replies the echo command collects before ending
const ECHO_LIMIT: usize = 3;

struct Handler {
    hub: EventHub,
    params: Arc<params::Params>,
}

impl Handler {
    fn new(params: &params::Params) -> Handler {
        Handler {
            hub: EventHub::new(params.event_buffer),
            params: Arc::new(params.clone()),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!(
            display_name = %ready.user.display_name(),
            user_id = %ready.user.id,
            prefix = %self.params.command_prefix,
            "Bot is connected"
        );
    }

    async fn message(&self, ctx: Context, message: Message) {
        // Every message feeds live sessions, command messages included
        self.hub.publish_message(IncomingMessage::from(&message));

        if message.author.bot {
            return;
        }
        let Some((command, argument)) = self.params.parse_command(&message.content) else {
            return;
        };
        let command = command.to_string();
        let argument = argument.to_string();

        let demo = Demo {
            discord: Arc::new(SerenityDiscordService::new(ctx.http.clone())),
            ctx,
            hub: self.hub.clone(),
            params: self.params.clone(),
        };

        // Sessions can outlive this event; run each command on its own task
        tokio::spawn(async move {
            if let Err(err) = demo.run(&command, &argument, &message).await {
                error!(?err, %command, "Failed to run command");
            }
        });
    }

    async fn reaction_add(&self, _: Context, reaction: Reaction) {
        if let Some(reaction) = IncomingReaction::from_reaction(&reaction) {
            self.hub.publish_reaction(reaction);
        }
    }
}

/// Demo commands built on the collectors
struct Demo {
    ctx: Context,
    discord: Arc<SerenityDiscordService>,
    hub: EventHub,
    params: Arc<params::Params>,
}

impl Demo {
    async fn run(&self, command: &str, argument: &str, trigger: &Message) -> anyhow::Result<()> {
        match command {
            "menu" => self.menu(trigger).await,
            "confirm" => self.confirm(argument, trigger).await,
            "ask" => self.ask(argument, trigger).await,
            "echo" => self.echo(trigger).await,
            other => {
                info!(command = %other, "Unknown command ignored");
                Ok(())
            }
        }
    }

    async fn say(&self, trigger: &Message, content: &str) -> anyhow::Result<BotMessage> {
        let sent = trigger
            .channel_id
            .say(&self.ctx.http, content)
            .await
            .context("Sending bot message")?;
        Ok(BotMessage::from(&sent))
    }

    fn reactions(&self) -> ReactionCollector<SerenityDiscordService> {
        ReactionCollector::new(self.discord.clone(), self.hub.clone())
    }

    fn messages(&self) -> MessageCollector<SerenityDiscordService> {
        MessageCollector::new(self.discord.clone(), self.hub.clone())
    }

    async fn menu(&self, trigger: &Message) -> anyhow::Result<()> {
        let bot_message = self.say(trigger, "Loading menu...").await?;
        let pages = vec![
            Page::content("Page 1 of 3: use the arrows to turn pages").with_id("intro"),
            Page::embed(
                CreateEmbed::new()
                    .title("Page 2 of 3")
                    .description("Pages can be embeds, too."),
            )
            .with_id("embed"),
            Page::content("Page 3 of 3: press ℹ️ for details, forward wraps to the first page")
                .with_id("last")
                .with_reactions(
                    vec![ReactionType::Unicode("ℹ️".to_string())],
                    |menu: MenuHandle, _: IncomingReaction| async move {
                        menu.go_to("details").await?;
                        anyhow::Ok(())
                    },
                )
                .with_pages(vec![
                    Page::content("Details: press ↩️ to return")
                        .with_id("details")
                        .with_back_emoji(ReactionType::Unicode("↩️".to_string())),
                ]),
        ];
        let options = ReactMenuOptions::new(bot_message, trigger.author.id, pages)
            .collector_options(CollectorOptions::new().idle(self.params.menu_idle()))
            .delete_all_on_end(true);

        let menu = self.reactions().menu(options).await.context("Starting menu")?;
        let outcome = menu.wait().await.context("Running menu")?;
        info!(
            message_id = %bot_message.id,
            reason = %outcome.reason,
            turns = outcome.collected,
            "Menu closed"
        );
        Ok(())
    }

    async fn confirm(&self, argument: &str, trigger: &Message) -> anyhow::Result<()> {
        let question = if argument.is_empty() { "Are you sure?" } else { argument };
        let bot_message = self.say(trigger, question).await?;
        let options = ReactAsyncQuestionOptions::new(bot_message, trigger.author.id)
            .collector_options(CollectorOptions::new().time(self.params.question_timeout()))
            .delete_all_on_end(true);

        let reply = match self.reactions().ask(options).await? {
            Answer::Answered(true) => "Confirmed.",
            Answer::Answered(false) => "Cancelled.",
            Answer::TimedOut => "No answer, cancelled.",
        };
        self.say(trigger, reply).await?;
        Ok(())
    }

    async fn ask(&self, argument: &str, trigger: &Message) -> anyhow::Result<()> {
        let question = if argument.is_empty() { "What is your name?" } else { argument };
        let bot_message = self.say(trigger, question).await?;
        let options = MessageQuestionOptions::new(bot_message, trigger.author.id)
            .collector_options(CollectorOptions::new().time(self.params.question_timeout()));

        match self.messages().ask(options).await? {
            Answer::Answered(answer) => {
                self.say(trigger, &format!("You said: {}", answer.content)).await?;
            }
            Answer::TimedOut => {
                self.say(trigger, "No answer received.").await?;
            }
        }
        Ok(())
    }

    async fn echo(&self, trigger: &Message) -> anyhow::Result<()> {
        let bot_message = self
            .say(trigger, &format!("Send up to {ECHO_LIMIT} messages and I will echo them."))
            .await?;
        let options = MessageQuestionOptions::new(bot_message, trigger.author.id)
            .collector_options(
                CollectorOptions::new()
                    .max(ECHO_LIMIT)
                    .idle(self.params.question_timeout()),
            )
            .delete_message(true);

        let http = self.ctx.http.clone();
        let session = self
            .messages()
            .question(options, move |bot_message: BotMessage, message: IncomingMessage| {
                let http = http.clone();
                async move {
                    bot_message
                        .channel_id
                        .say(&http, format!("echo: {}", message.content))
                        .await
                        .context("Sending echo")?;
                    anyhow::Ok(())
                }
            })
            .await?;

        let cleanup = session.cleanup_log();
        let outcome = session.wait().await;
        let failed = cleanup
            .attempts()
            .iter()
            .filter(|attempt| !attempt.succeeded)
            .count();
        if failed > 0 {
            warn!(failed, "Some echoed messages could not be deleted");
        }
        info!(reason = %outcome.reason, echoed = outcome.collected, "Echo ended");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Default: reactkit=info, serenity=warn (suppress serenity's normal operation logs)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reactkit=info,serenity=warn".into()),
        )
        .init();

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        description = env!("CARGO_PKG_DESCRIPTION"),
        "Starting application"
    );

    let params = params::Params::new()?;
    info!(?params, "Application parameters loaded");

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;
    info!(?intents, "Gateway intents configured");

    let mut client = Client::builder(&params.discord_token, intents)
        .event_handler(Handler::new(&params))
        .await
        .context("Creating Discord Client")?;

    client
        .start_autosharded()
        .await
        .context("Running Discord Client")
}
