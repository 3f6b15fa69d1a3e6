//! Message dispatcher.
//!
//! Routes each [`IncomingMessage`] through the parser to the fact store,
//! the answer resolver or the peer coordinator, and sends whatever reply
//! results through the transport. Messages are processed one at a time to
//! completion; nothing here is shared across tasks.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::answer::{AnswerResolver, FeedSummarizer, Fetcher, Response};
use crate::config::{BotConfig, SettingKey, Settings, SettingsError};
use crate::facts::{normalize_subject, FactStore};
use crate::parser::{subject_fits, Command, StatementParser, TeachStatement};
use crate::peer::{format_reply, PeerError, PeerQueryCoordinator, ReplyOutcome};
use crate::store::{KeyValueStore, StoreError};
use crate::transport::{IncomingMessage, Transport, TransportError};

/// Most subjects listed in one search reply.
pub const MAX_SEARCH_RESULTS: usize = 21;

/// Errors raised while handling a message. These never escape
/// [`Dispatcher::handle`]; they are logged and the message is dropped.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Peer(#[from] PeerError),
}

/// What the dispatcher did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sent chat text.
    Said(String),
    /// Sent an emote.
    Emoted(String),
    /// Acted on the message without saying anything.
    Handled,
    /// Not for us, not understood, or rejected silently.
    Ignored,
}

/// Orchestrates parsing, lookup, teaching and peer queries.
pub struct Dispatcher {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn Transport>,
    facts: FactStore,
    resolver: AnswerResolver,
    parser: StatementParser,
    peers: PeerQueryCoordinator,
    settings: Settings,
    rng: StdRng,
}

impl Dispatcher {
    /// Build a dispatcher, loading persisted settings from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read from the store.
    pub async fn new(
        config: &BotConfig,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, StoreError> {
        let settings = Settings::load(store.as_ref()).await?;
        let feeds = FeedSummarizer::new(fetcher, Duration::from_secs(config.feed.timeout_secs));
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            facts: FactStore::new(Arc::clone(&store)),
            store,
            transport,
            resolver: AnswerResolver::new(feeds),
            parser: StatementParser::new(),
            peers: PeerQueryCoordinator::new(&config.peer),
            settings,
            rng,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    #[must_use]
    pub fn pending_queries(&self) -> &PeerQueryCoordinator {
        &self.peers
    }

    /// Change a runtime setting and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is invalid or cannot be stored.
    pub async fn update_setting(&mut self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        self.settings.update(self.store.as_ref(), key, value).await
    }

    /// Process one message to completion. Never fails; internal errors are
    /// logged and the message is treated as ignored.
    pub async fn handle(&mut self, msg: &IncomingMessage) -> Outcome {
        let command = self.parser.parse(&msg.text);
        tracing::debug!(
            sender = %msg.sender,
            addressed = msg.addressed,
            private = msg.is_private(),
            kind = command.kind(),
            "Dispatching message"
        );

        match self.dispatch(msg, command).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(sender = %msg.sender, error = %e, "Failed to handle message");
                Outcome::Ignored
            }
        }
    }

    async fn dispatch(
        &mut self,
        msg: &IncomingMessage,
        command: Command,
    ) -> Result<Outcome, DispatchError> {
        if command.requires_addressing() && !msg.addressed {
            return Ok(Outcome::Ignored);
        }

        match command {
            Command::PeerReply { token, payload } => {
                let settings = &self.settings;
                let admit = |subject: &str| subject_fits(subject) && !settings.is_stopword(subject);
                let outcome = self
                    .peers
                    .on_reply(
                        &token,
                        &payload,
                        &msg.sender,
                        &self.facts,
                        self.transport.as_ref(),
                        admit,
                    )
                    .await?;
                Ok(match outcome {
                    ReplyOutcome::Learnt { .. } => Outcome::Handled,
                    ReplyOutcome::UnknownToken
                    | ReplyOutcome::Malformed
                    | ReplyOutcome::Refused { .. } => Outcome::Ignored,
                })
            }
            Command::PeerQuery { token, subject } => self.answer_peer(msg, &token, &subject).await,
            Command::Forget { subject } => self.forget(msg, &subject).await,
            Command::AskPeer { peer, subject } => self.ask_peer(msg, &peer, &subject).await,
            Command::Search { terms } => self.search(msg, &terms).await,
            Command::Question { subject, literal } => self.question(msg, &subject, literal).await,
            Command::Teach(statement) => self.teach(msg, &statement).await,
            Command::Unrecognized => Ok(Outcome::Ignored),
        }
    }

    async fn say(&self, msg: &IncomingMessage, text: String) -> Result<Outcome, DispatchError> {
        let target = msg.reply_context().target;
        self.transport.send(&target, &text).await?;
        Ok(Outcome::Said(text))
    }

    async fn answer_peer(
        &self,
        msg: &IncomingMessage,
        token: &str,
        subject: &str,
    ) -> Result<Outcome, DispatchError> {
        let Some(record) = self.facts.record(subject).await? else {
            tracing::debug!(subject = %subject, from = %msg.sender, "Peer asked about unknown subject");
            return Ok(Outcome::Ignored);
        };
        let line = format_reply(token, subject, record.relation, &record.literal_text());
        self.transport.send(&msg.sender, &line).await?;
        tracing::info!(subject = %subject, to = %msg.sender, "Answered peer query");
        Ok(Outcome::Handled)
    }

    async fn forget(&self, msg: &IncomingMessage, subject: &str) -> Result<Outcome, DispatchError> {
        let text = if self.facts.delete(subject).await? {
            tracing::info!(subject = %subject, by = %msg.sender, "Forgot factoid");
            format!("I forgot about {subject}")
        } else {
            format!("I don't know anything about {subject}")
        };
        self.say(msg, text).await
    }

    async fn ask_peer(
        &mut self,
        msg: &IncomingMessage,
        peer: &str,
        subject: &str,
    ) -> Result<Outcome, DispatchError> {
        self.peers
            .ask(
                subject,
                peer,
                msg.reply_context(),
                &mut self.rng,
                self.transport.as_ref(),
            )
            .await?;
        self.say(msg, format!("asking {peer} about {subject}..")).await
    }

    async fn search(&self, msg: &IncomingMessage, terms: &[String]) -> Result<Outcome, DispatchError> {
        if !msg.is_private() {
            return Ok(Outcome::Ignored);
        }
        let subjects = self.facts.search(terms).await?;
        if subjects.is_empty() {
            return Ok(Outcome::Ignored);
        }
        let listing = subjects
            .iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.say(msg, listing).await
    }

    async fn question(
        &mut self,
        msg: &IncomingMessage,
        subject: &str,
        literal: bool,
    ) -> Result<Outcome, DispatchError> {
        if !msg.addressed && !self.settings.passive_ask {
            return Ok(Outcome::Ignored);
        }

        let Some(answer) = self.facts.get(subject, literal, &mut self.rng).await? else {
            if !msg.addressed {
                return Ok(Outcome::Ignored);
            }
            if let Some(peer) = self.settings.ask.clone() {
                if let Err(e) = self
                    .peers
                    .ask(
                        subject,
                        &peer,
                        msg.reply_context(),
                        &mut self.rng,
                        self.transport.as_ref(),
                    )
                    .await
                {
                    tracing::warn!(peer = %peer, error = %e, "Failed to delegate question");
                }
            }
            return self.say(msg, "No clue. Sorry.".to_string()).await;
        };

        let subject = normalize_subject(subject);
        let response = if literal {
            AnswerResolver::literal(&subject, &answer)
        } else {
            self.resolver.resolve(&subject, &answer, &msg.sender).await
        };

        match response {
            Response::Say(text) => self.say(msg, text).await,
            Response::Emote(text) => {
                let target = msg.reply_context().target;
                self.transport.emote(&target, &text).await?;
                Ok(Outcome::Emoted(text))
            }
        }
    }

    async fn teach(
        &mut self,
        msg: &IncomingMessage,
        statement: &TeachStatement,
    ) -> Result<Outcome, DispatchError> {
        if !msg.addressed && !self.settings.passive_learn {
            return Ok(Outcome::Ignored);
        }

        let subject = statement.subject.trim();
        if statement.subject_too_long() {
            tracing::debug!(subject = %subject, "Subject too long to teach");
            return Ok(Outcome::Ignored);
        }
        if self.settings.is_stopword(subject) {
            tracing::debug!(subject = %subject, "Refusing to teach stopword");
            return Ok(Outcome::Ignored);
        }

        if statement.replace {
            self.facts.delete(subject).await?;
        } else if !statement.also && self.facts.exists(subject).await? {
            if msg.addressed {
                return self
                    .say(msg, format!("But I already know something about {subject}"))
                    .await;
            }
            return Ok(Outcome::Ignored);
        }

        let added = self
            .facts
            .add(subject, statement.relation, &statement.facts, &msg.sender)
            .await?;
        if added == 0 {
            tracing::debug!(subject = %subject, "Teach added no new facts");
            return Ok(Outcome::Ignored);
        }
        tracing::info!(
            subject = %subject,
            added,
            replace = statement.replace,
            also = statement.also,
            by = %msg.sender,
            "Learnt factoid"
        );

        if msg.addressed {
            self.say(msg, "ok".to_string()).await
        } else {
            Ok(Outcome::Handled)
        }
    }
}
