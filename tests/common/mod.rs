//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use infobot::answer::{FeedError, Fetcher};
use infobot::config::BotConfig;
use infobot::dispatch::Dispatcher;
use infobot::store::{KeyValueStore, MemoryStore};
use infobot::transport::{IncomingMessage, Transport, TransportError};
use tokio::sync::Mutex;

/// One line the bot sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub target: String,
    pub text: String,
    pub emote: bool,
}

/// Transport that keeps everything the bot sends.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub async fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().await)
    }

    pub async fn is_empty(&self) -> bool {
        self.sent.lock().await.is_empty()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.sent.lock().await.push(Sent {
            target: target.to_string(),
            text: text.to_string(),
            emote: false,
        });
        Ok(())
    }

    async fn emote(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.sent.lock().await.push(Sent {
            target: target.to_string(),
            text: text.to_string(),
            emote: true,
        });
        Ok(())
    }
}

/// Fetcher serving fixed documents by URL.
#[derive(Debug, Default)]
pub struct CannedFetcher {
    pages: HashMap<String, String>,
}

impl CannedFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        self.pages
            .get(url)
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| FeedError::RequestFailed("HTTP 404 Not Found".to_string()))
    }
}

/// A dispatcher wired to in-memory collaborators.
pub struct TestBot {
    pub bot: Dispatcher,
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<dyn KeyValueStore>,
}

impl TestBot {
    pub async fn new(nick: &str, seed: u64) -> Self {
        Self::with_fetcher(nick, seed, CannedFetcher::default()).await
    }

    pub async fn with_fetcher(nick: &str, seed: u64, fetcher: CannedFetcher) -> Self {
        let config = BotConfig {
            nick: nick.to_string(),
            seed: Some(seed),
            ..BotConfig::default()
        };
        let transport = Arc::new(RecordingTransport::default());
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let bot = Dispatcher::new(
            &config,
            Arc::clone(&store),
            transport.clone(),
            Arc::new(fetcher),
        )
        .await
        .expect("dispatcher should build over a memory store");
        Self {
            bot,
            transport,
            store,
        }
    }

    /// Say an addressed line in `#chan` as alice and return what was sent.
    pub async fn tell(&mut self, text: &str) -> Vec<Sent> {
        self.bot
            .handle(&IncomingMessage::public("alice", "#chan", text, true))
            .await;
        self.transport.take().await
    }

    /// Say an unaddressed line in `#chan` as alice and return what was sent.
    pub async fn overhear(&mut self, text: &str) -> Vec<Sent> {
        self.bot
            .handle(&IncomingMessage::public("alice", "#chan", text, false))
            .await;
        self.transport.take().await
    }

    /// Only the chat text of an addressed exchange.
    pub async fn ask(&mut self, text: &str) -> Option<String> {
        self.tell(text).await.into_iter().next().map(|s| s.text)
    }
}
