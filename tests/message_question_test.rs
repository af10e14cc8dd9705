// Integration tests for message questions
// Sessions are fed through an EventHub and platform calls go to a mock

mod adapters;

use adapters::*;
use reactkit::adapters::EventHub;
use reactkit::collector::{
    Actor, Answer, BotMessage, CleanupAction, CollectorError, CollectorOptions, EndReason,
    IncomingMessage, MessageCollector, MessageQuestionOptions,
};
use serenity::model::id::{MessageId, UserId};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn setup() -> (Arc<MockDiscordService>, EventHub, MessageCollector<MockDiscordService>) {
    let discord = Arc::new(MockDiscordService::new());
    let hub = EventHub::new(16);
    let collector = MessageCollector::new(discord.clone(), hub.clone());
    (discord, hub, collector)
}

fn options() -> MessageQuestionOptions {
    MessageQuestionOptions::new(bot_message(), user())
}

#[tokio::test(start_paused = true)]
async fn test_question_deletes_before_handler_sees_captured_message() {
    let (discord, hub, collector) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let handler_seen = seen.clone();
    let handler_discord = discord.clone();
    let session = collector
        .question(
            options()
                .collector_options(CollectorOptions::new().max(2))
                .delete_message(true),
            move |_: BotMessage, message: IncomingMessage| {
                let seen = handler_seen.clone();
                let discord = handler_discord.clone();
                async move {
                    let already_deleted = discord.deleted_messages().contains(&message.id);
                    seen.lock().unwrap().push((message.content, already_deleted));
                    anyhow::Ok(())
                }
            },
        )
        .await
        .unwrap();

    publish_message(&hub, message(1, Actor::user(UserId::new(OTHER_USER)), "not you")).await;
    publish_message(&hub, message(2, Actor::bot(user()), "bot echo")).await;
    publish_message(&hub, user_message(3, "first")).await;
    publish_message(&hub, user_message(4, "second")).await;
    publish_message(&hub, user_message(5, "too late")).await;

    let outcome = session.wait().await;

    assert_eq!(outcome.reason, EndReason::Limit);
    assert_eq!(outcome.collected, 2);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("first".to_string(), true), ("second".to_string(), true)]
    );
    assert_eq!(discord.deleted_messages(), vec![MessageId::new(3), MessageId::new(4)]);
}

#[tokio::test(start_paused = true)]
async fn test_question_keeps_running_after_handler_error() {
    let (_discord, hub, collector) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let handler_seen = seen.clone();
    let session = collector
        .question(
            options().collector_options(CollectorOptions::new().max(2)),
            move |_: BotMessage, message: IncomingMessage| {
                let seen = handler_seen.clone();
                async move {
                    seen.lock().unwrap().push(message.content.clone());
                    anyhow::ensure!(message.content != "boom", "handler failed");
                    anyhow::Ok(())
                }
            },
        )
        .await
        .unwrap();

    publish_message(&hub, user_message(1, "boom")).await;
    publish_message(&hub, user_message(2, "still here")).await;

    assert_eq!(session.wait().await.reason, EndReason::Limit);
    assert_eq!(*seen.lock().unwrap(), vec!["boom", "still here"]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_delete_is_logged_not_fatal() {
    let (discord, hub, collector) = setup();
    discord.fail_deletes();
    let handled = Arc::new(Mutex::new(0));

    let counter = handled.clone();
    let session = collector
        .question(
            options()
                .collector_options(CollectorOptions::new().max(1))
                .delete_message(true),
            move |_: BotMessage, _: IncomingMessage| {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    anyhow::Ok(())
                }
            },
        )
        .await
        .unwrap();
    let cleanup = session.cleanup_log();

    publish_message(&hub, user_message(1, "hello")).await;
    session.wait().await;

    assert_eq!(*handled.lock().unwrap(), 1);
    let attempts = cleanup.attempts_of(CleanupAction::DeleteMessage);
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_ends_session() {
    let (_discord, hub, collector) = setup();
    let session = collector
        .question(
            options().collector_options(CollectorOptions::new().idle(Duration::from_secs(60))),
            |_: BotMessage, _: IncomingMessage| async { anyhow::Ok(()) },
        )
        .await
        .unwrap();

    session.stop();
    session.stop();
    settle().await;
    assert!(session.is_ended());

    // Ended sessions no longer listen
    assert_eq!(hub.message_subscribers(), 0);
    assert_eq!(session.wait().await.reason, EndReason::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_ask_times_out() {
    let (_discord, _hub, collector) = setup();
    let started = Instant::now();

    let answer = collector
        .ask(options().collector_options(CollectorOptions::new().time(Duration::from_secs(5))))
        .await
        .unwrap();

    assert_eq!(answer, Answer::TimedOut);
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_ask_resolves_with_first_reply_and_deletes_it() {
    let (discord, hub, collector) = setup();

    let question = tokio::spawn(async move {
        collector
            .ask(
                options()
                    .collector_options(CollectorOptions::new().time(Duration::from_secs(30)))
                    .delete_message(true),
            )
            .await
    });
    settle().await;

    publish_message(&hub, message(1, Actor::user(UserId::new(OTHER_USER)), "me!")).await;
    publish_message(&hub, user_message(2, "Ferris")).await;
    publish_message(&hub, user_message(3, "ignored")).await;

    let answer = question.await.unwrap().unwrap();

    assert_eq!(answer.answered().map(|m| m.content), Some("Ferris".to_string()));
    assert_eq!(discord.deleted_messages(), vec![MessageId::new(2)]);
}

#[tokio::test(start_paused = true)]
async fn test_ask_with_unrepresentable_time_still_answers() {
    let (_discord, hub, collector) = setup();

    let question = tokio::spawn(async move {
        collector
            .ask(options().collector_options(
                CollectorOptions::new().time(Duration::from_secs(u64::MAX)),
            ))
            .await
    });
    settle().await;

    publish_message(&hub, user_message(1, "eventually")).await;

    let answer = question.await.unwrap().unwrap();
    assert_eq!(answer.answered().map(|m| m.content), Some("eventually".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_lagging_collector_skips_to_retained_replies() {
    let discord = Arc::new(MockDiscordService::new());
    let hub = EventHub::new(2);
    let collector = MessageCollector::new(discord, hub.clone());
    let mut raw = collector
        .collector(options().collector_options(CollectorOptions::new().max(2)))
        .await
        .unwrap();

    // Four replies into a buffer of two: the oldest two are lost
    for (id, content) in [(1, "one"), (2, "two"), (3, "three"), (4, "four")] {
        hub.publish_message(user_message(id, content));
    }

    assert_eq!(raw.next().await.map(|m| m.content), Some("three".to_string()));
    assert_eq!(raw.next().await.map(|m| m.content), Some("four".to_string()));
    assert_eq!(raw.next().await, None);
    assert_eq!(raw.outcome().collected, 2);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_channel_fails_before_subscribing() {
    let (discord, hub, collector) = setup();
    discord.fail_channel();

    let result = collector
        .question(options(), |_: BotMessage, _: IncomingMessage| async {
            anyhow::Ok(())
        })
        .await;

    assert!(matches!(result, Err(CollectorError::ChannelUnavailable { .. })));
    assert_eq!(hub.message_subscribers(), 0);
}

#[tokio::test]
async fn test_ask_rejects_zero_time() {
    let (discord, _hub, collector) = setup();

    let result = collector
        .ask(options().collector_options(CollectorOptions::new().time(Duration::ZERO)))
        .await;

    assert!(matches!(result, Err(CollectorError::InvalidOptions { .. })));
    assert!(discord.calls().is_empty(), "validation happens before any platform call");
}

#[tokio::test(start_paused = true)]
async fn test_raw_collector_yields_replies() {
    let (_discord, hub, collector) = setup();
    let mut raw = collector
        .collector(options().collector_options(CollectorOptions::new().max(1)))
        .await
        .unwrap();

    hub.publish_message(user_message(1, "raw"));

    assert_eq!(raw.next().await.map(|m| m.content), Some("raw".to_string()));
    assert_eq!(raw.next().await, None);
    assert_eq!(raw.outcome().reason, EndReason::Limit);
}
