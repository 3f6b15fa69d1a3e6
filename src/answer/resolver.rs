//! Answer formatting and directive expansion.

use regex::Regex;

use crate::facts::FactAnswer;

use super::feed::FeedSummarizer;

/// How an answer should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Plain chat text.
    Say(String),
    /// An action, sent through the transport's emote primitive.
    Emote(String),
}

/// Builds replies from stored entries.
#[derive(Clone)]
pub struct AnswerResolver {
    feeds: FeedSummarizer,
    rss: Regex,
    action: Regex,
    reply: Regex,
}

impl AnswerResolver {
    #[must_use]
    pub fn new(feeds: FeedSummarizer) -> Self {
        Self {
            feeds,
            rss: Regex::new(r#"(?i)<rss\s*=\s*"([^"]+)"\s*>"#).expect("static rss pattern"),
            action: Regex::new(r"(?is)^<action>\s*(.*)$").expect("static action pattern"),
            reply: Regex::new(r"(?is)^<reply>\s*(.*)$").expect("static reply pattern"),
        }
    }

    /// Resolve a randomly chosen entry into a response.
    ///
    /// Feed directives are expanded first; `<action>` and `<reply>` are then
    /// checked against the expanded text.
    pub async fn resolve(&self, subject: &str, answer: &FactAnswer, requester: &str) -> Response {
        let expanded = self.expand_feeds(&answer.text).await;
        let text = expanded.replace("$who", requester);

        if let Some(caps) = self.action.captures(&text) {
            return Response::Emote(caps[1].trim().to_string());
        }
        if let Some(caps) = self.reply.captures(&text) {
            return Response::Say(caps[1].trim().to_string());
        }
        Response::Say(format!("{subject} {} {text}", answer.relation))
    }

    /// Literal view: no directive expansion at all.
    #[must_use]
    pub fn literal(subject: &str, answer: &FactAnswer) -> Response {
        Response::Say(format!("{subject} {} {}", answer.relation, answer.text))
    }

    async fn expand_feeds(&self, text: &str) -> String {
        let directives: Vec<(usize, usize, String)> = self
            .rss
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let url = caps.get(1)?;
                Some((whole.start(), whole.end(), url.as_str().to_string()))
            })
            .collect();

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (start, end, url) in directives {
            out.push_str(&text[last..start]);
            out.push_str(&self.feeds.summarize(&url).await);
            last = end;
        }
        out.push_str(&text[last..]);
        out
    }
}
