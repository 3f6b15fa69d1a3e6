//! Two bots talking the peer query protocol to each other.

mod common;

use common::{Sent, TestBot};
use infobot::config::SettingKey;
use infobot::dispatch::Outcome;
use infobot::transport::IncomingMessage;

/// Deliver every line `from` sent to `to` as private messages.
async fn relay(from_nick: &str, sent: Vec<Sent>, to: &mut TestBot, to_nick: &str) {
    for line in sent.into_iter().filter(|s| s.target == to_nick) {
        to.bot
            .handle(&IncomingMessage::private(from_nick, line.text))
            .await;
    }
}

#[tokio::test]
async fn test_round_trip_learns_from_peer() {
    let mut alpha = TestBot::new("alpha", 1).await;
    let mut beta = TestBot::new("beta", 2).await;
    beta.tell("water is wet").await;
    beta.tell("water is also cold").await;

    let sent = alpha.tell("ask beta about water").await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].target, "beta");
    assert!(sent[0].text.starts_with(":INFOBOT:QUERY "));
    assert_eq!(sent[1].text, "asking beta about water..");
    assert_eq!(alpha.bot.pending_queries().len(), 1);

    relay("alpha", sent, &mut beta, "beta").await;
    let answer = beta.transport.take().await;
    assert_eq!(answer.len(), 1);
    assert_eq!(answer[0].target, "alpha");
    assert!(answer[0].text.starts_with(":INFOBOT:REPLY "));
    assert!(answer[0].text.ends_with("water =is=> wet =or= cold"));

    relay("beta", answer, &mut alpha, "alpha").await;
    assert_eq!(
        alpha.transport.take().await,
        vec![Sent {
            target: "#chan".into(),
            text: "Learnt about water from beta".into(),
            emote: false,
        }]
    );
    assert!(alpha.bot.pending_queries().is_empty());
    assert_eq!(
        alpha.ask("literal water?").await.as_deref(),
        Some("water =is= wet =or= cold")
    );

    let provenance = alpha.bot.facts().provenance("water").await.unwrap().unwrap();
    assert_eq!(provenance.taught_by, "beta");
}

#[tokio::test]
async fn test_peer_without_answer_stays_silent() {
    let mut alpha = TestBot::new("alpha", 1).await;
    let mut beta = TestBot::new("beta", 2).await;

    let sent = alpha.tell("ask beta about mars").await;
    relay("alpha", sent, &mut beta, "beta").await;

    assert!(beta.transport.is_empty().await);
    assert_eq!(alpha.bot.pending_queries().len(), 1);
}

#[tokio::test]
async fn test_unknown_token_changes_nothing() {
    let mut alpha = TestBot::new("alpha", 1).await;
    alpha.tell("ask beta about water").await;
    let before = alpha.bot.pending_queries().len();

    let outcome = alpha
        .bot
        .handle(&IncomingMessage::private(
            "beta",
            ":INFOBOT:REPLY deadbeef water =is=> wet",
        ))
        .await;

    assert_eq!(outcome, Outcome::Ignored);
    assert!(alpha.transport.is_empty().await);
    assert_eq!(alpha.bot.pending_queries().len(), before);
    assert!(!alpha.bot.facts().exists("water").await.unwrap());
}

#[tokio::test]
async fn test_reply_consumes_only_its_entry() {
    let mut alpha = TestBot::new("alpha", 1).await;
    let mut beta = TestBot::new("beta", 2).await;
    beta.tell("water is wet").await;
    beta.tell("fire is hot").await;

    let first = alpha.tell("ask beta about water").await;
    let second = alpha.tell("ask beta about fire").await;
    assert_eq!(alpha.bot.pending_queries().len(), 2);

    relay("alpha", first, &mut beta, "beta").await;
    let answer = beta.transport.take().await;
    relay("beta", answer, &mut alpha, "alpha").await;
    alpha.transport.take().await;
    assert_eq!(alpha.bot.pending_queries().len(), 1);

    let fire_token = second[0]
        .text
        .split_whitespace()
        .nth(1)
        .unwrap()
        .to_string();
    assert_eq!(
        alpha.bot.pending_queries().get(&fire_token).map(|q| q.subject.as_str()),
        Some("fire")
    );

    let replay = alpha
        .bot
        .handle(&IncomingMessage::private(
            "beta",
            format!(":INFOBOT:REPLY {fire_token} fire =is=> hot"),
        ))
        .await;
    assert_eq!(replay, Outcome::Handled);
    assert!(alpha.bot.pending_queries().is_empty());

    let again = alpha
        .bot
        .handle(&IncomingMessage::private(
            "beta",
            format!(":INFOBOT:REPLY {fire_token} fire =is=> hot"),
        ))
        .await;
    assert_eq!(again, Outcome::Ignored);
}

#[tokio::test]
async fn test_ask_peer_needs_addressing() {
    let mut alpha = TestBot::new("alpha", 1).await;
    assert!(alpha.overhear("ask beta about water").await.is_empty());
    assert!(alpha.bot.pending_queries().is_empty());
}

#[tokio::test]
async fn test_peer_cannot_teach_stopword_or_long_subject() {
    let mut alpha = TestBot::new("alpha", 1).await;
    alpha
        .bot
        .update_setting(SettingKey::Stopwords, "it")
        .await
        .unwrap();

    for subject in ["it", "abcdefghijklmnopqrstuvwxyz"] {
        let sent = alpha.tell(&format!("ask beta about {subject}")).await;
        let token = sent[0].text.split_whitespace().nth(1).unwrap().to_string();

        let outcome = alpha
            .bot
            .handle(&IncomingMessage::private(
                "beta",
                format!(":INFOBOT:REPLY {token} {subject} =is=> raining"),
            ))
            .await;

        assert_eq!(outcome, Outcome::Ignored);
        assert!(alpha.bot.pending_queries().is_empty());
        assert!(alpha.transport.is_empty().await);
        assert!(!alpha.bot.facts().exists(subject).await.unwrap());
    }
}
