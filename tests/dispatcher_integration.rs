//! End-to-end conversations against a dispatcher over an in-memory store.

mod common;

use common::{CannedFetcher, Sent, TestBot};
use infobot::config::SettingKey;
use infobot::dispatch::Outcome;
use infobot::transport::IncomingMessage;

fn said(target: &str, text: &str) -> Sent {
    Sent {
        target: target.to_string(),
        text: text.to_string(),
        emote: false,
    }
}

#[tokio::test]
async fn test_taught_fact_is_answered() {
    let mut t = TestBot::new("infobot", 1).await;

    assert_eq!(t.tell("water is wet").await, vec![said("#chan", "ok")]);
    assert_eq!(t.ask("water?").await.as_deref(), Some("water is wet"));
    assert_eq!(t.ask("What is water?").await.as_deref(), Some("water is wet"));
    assert_eq!(t.ask("WATER?").await.as_deref(), Some("water is wet"));
}

#[tokio::test]
async fn test_plural_relation_kept() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("cats are furry").await;
    assert_eq!(t.ask("cats?").await.as_deref(), Some("cats are furry"));
}

#[tokio::test]
async fn test_also_alternates_without_combining() {
    let mut t = TestBot::new("infobot", 7).await;
    t.tell("sky is blue").await;
    assert_eq!(t.ask("sky is also grey").await.as_deref(), Some("ok"));

    let mut seen_blue = false;
    let mut seen_grey = false;
    for _ in 0..64 {
        let answer = t.ask("sky?").await.unwrap();
        match answer.as_str() {
            "sky is blue" => seen_blue = true,
            "sky is grey" => seen_grey = true,
            other => panic!("unexpected answer {other:?}"),
        }
    }
    assert!(seen_blue && seen_grey);
}

#[tokio::test]
async fn test_replace_drops_old_facts() {
    let mut t = TestBot::new("infobot", 3).await;
    t.tell("water is wet").await;
    t.tell("water is also cold").await;

    assert_eq!(t.ask("no, water is dry").await.as_deref(), Some("ok"));
    for _ in 0..16 {
        assert_eq!(t.ask("water?").await.as_deref(), Some("water is dry"));
    }
}

#[tokio::test]
async fn test_conflicting_teach_keeps_original() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("water is wet").await;

    assert_eq!(
        t.ask("water is dry").await.as_deref(),
        Some("But I already know something about water")
    );
    assert_eq!(t.ask("literal water?").await.as_deref(), Some("water =is= wet"));
}

#[tokio::test]
async fn test_blank_replace_keeps_existing_fact() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("water is wet").await;

    assert!(t.tell("no, water is |").await.is_empty());
    assert_eq!(t.ask("water?").await.as_deref(), Some("water is wet"));
}

#[tokio::test]
async fn test_blank_teach_not_acknowledged() {
    let mut t = TestBot::new("infobot", 1).await;
    assert!(t.tell("fire is |").await.is_empty());
    assert!(t.tell("fire is | or |").await.is_empty());
    assert!(!t.bot.facts().exists("fire").await.unwrap());
}

#[tokio::test]
async fn test_long_subject_never_stored() {
    let mut t = TestBot::new("infobot", 1).await;
    let subject = "abcdefghijklmnopqrstuvwxyz";
    assert_eq!(subject.len(), 26);

    assert!(t.tell(&format!("{subject} is long")).await.is_empty());
    assert!(!t.bot.facts().exists(subject).await.unwrap());

    assert_eq!(
        t.ask("abcdefghijklmnopqrstuvwxy is exactly 25").await.as_deref(),
        Some("ok")
    );
}

#[tokio::test]
async fn test_stopword_never_stored() {
    let mut t = TestBot::new("infobot", 1).await;
    t.bot
        .update_setting(SettingKey::Stopwords, "it, this")
        .await
        .unwrap();

    assert!(t.tell("it is raining").await.is_empty());
    assert!(t.tell("This is fine").await.is_empty());
    assert!(!t.bot.facts().exists("it").await.unwrap());
    assert!(!t.bot.facts().exists("this").await.unwrap());
}

#[tokio::test]
async fn test_literal_view_shows_every_entry() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("letters are A or |B or |C").await;

    assert_eq!(
        t.ask("literal letters?").await.as_deref(),
        Some("letters =are= A =or= |B =or= |C")
    );

    for _ in 0..16 {
        let answer = t.ask("letters?").await.unwrap();
        assert!(["letters are A", "letters are B", "letters are C"].contains(&answer.as_str()));
    }
}

#[tokio::test]
async fn test_reply_directive_is_verbatim() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("hello is <reply>hi there, $who").await;
    assert_eq!(t.ask("hello?").await.as_deref(), Some("hi there, alice"));
}

#[tokio::test]
async fn test_action_directive_emotes_only() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("hug is <action>hugs $who").await;

    let sent = t.tell("hug?").await;
    assert_eq!(
        sent,
        vec![Sent {
            target: "#chan".into(),
            text: "hugs alice".into(),
            emote: true,
        }]
    );
}

#[tokio::test]
async fn test_feed_directive_expanded() {
    let fetcher = CannedFetcher::default().with_page(
        "http://news.example/rss",
        "<rss><channel><item><title>One</title></item><item><title>Two</title></item></channel></rss>",
    );
    let mut t = TestBot::with_fetcher("infobot", 1, fetcher).await;
    t.tell(r#"news is <reply><rss="http://news.example/rss">"#).await;
    t.tell(r#"gone is <rss="http://missing.example/rss">"#).await;

    assert_eq!(t.ask("news?").await.as_deref(), Some("One; Two"));

    let failure = t.ask("gone?").await.unwrap();
    assert!(failure.starts_with("gone is [error fetching http://missing.example/rss"));
}

#[tokio::test]
async fn test_forget_messages() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("water is wet").await;

    assert_eq!(t.ask("forget water").await.as_deref(), Some("I forgot about water"));
    assert_eq!(
        t.ask("forget water").await.as_deref(),
        Some("I don't know anything about water")
    );
    assert_eq!(t.ask("water?").await.as_deref(), Some("No clue. Sorry."));

    t.tell("fire is hot").await;
    assert_eq!(t.ask("forget fire?").await.as_deref(), Some("I forgot about fire"));
}

#[tokio::test]
async fn test_unknown_subject_with_ask_peer_configured() {
    let mut t = TestBot::new("infobot", 1).await;
    t.bot.update_setting(SettingKey::Ask, "oracle").await.unwrap();

    let sent = t.tell("mars?").await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].target, "oracle");
    assert!(sent[0].text.starts_with(":INFOBOT:QUERY "));
    assert!(sent[0].text.ends_with(" mars"));
    assert_eq!(sent[1], said("#chan", "No clue. Sorry."));
    assert_eq!(t.bot.pending_queries().len(), 1);
}

#[tokio::test]
async fn test_passive_traffic_is_quiet_by_default() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("water is wet").await;

    assert!(t.overhear("water?").await.is_empty());
    assert!(t.overhear("fire is hot").await.is_empty());
    assert!(t.overhear("forget water").await.is_empty());
    assert!(t.bot.facts().exists("water").await.unwrap());
    assert!(!t.bot.facts().exists("fire").await.unwrap());
}

#[tokio::test]
async fn test_passive_modes_enabled() {
    let mut t = TestBot::new("infobot", 1).await;
    t.bot.update_setting(SettingKey::PassiveAsk, "on").await.unwrap();
    t.bot.update_setting(SettingKey::PassiveLearn, "on").await.unwrap();

    assert!(t.overhear("fire is hot").await.is_empty());
    assert_eq!(
        t.overhear("fire?").await,
        vec![said("#chan", "fire is hot")]
    );
    assert!(t.overhear("ice?").await.is_empty());
    assert!(t.overhear("fire is cold").await.is_empty());
}

#[tokio::test]
async fn test_private_conversation_replies_to_sender() {
    let mut t = TestBot::new("infobot", 1).await;
    let outcome = t
        .bot
        .handle(&IncomingMessage::private("bob", "tea is hot"))
        .await;
    assert_eq!(outcome, Outcome::Said("ok".into()));
    assert_eq!(t.transport.take().await, vec![said("bob", "ok")]);

    t.bot
        .handle(&IncomingMessage::private("bob", "search for te"))
        .await;
    assert_eq!(t.transport.take().await, vec![said("bob", "\"tea\"")]);
}

#[tokio::test]
async fn test_provenance_recorded() {
    let mut t = TestBot::new("infobot", 1).await;
    t.tell("water is wet").await;

    let provenance = t.bot.facts().provenance("water").await.unwrap().unwrap();
    assert_eq!(provenance.taught_by, "alice");

    t.tell("forget water").await;
    assert!(t.bot.facts().provenance("water").await.unwrap().is_none());
}
