//! Outstanding peer queries and reply correlation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::PeerConfig;
use crate::facts::FactStore;
use crate::store::StoreError;
use crate::transport::{ReplyContext, Transport, TransportError};

use super::protocol::{format_query, generate_token, parse_reply_payload};

/// Errors from peer coordination.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("Failed to store peer fact: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to talk to peer: {0}")]
    Transport(#[from] TransportError),
}

/// A query sent to a peer and not yet answered.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub subject: String,
    pub peer: String,
    pub origin: ReplyContext,
    pub sent_at: Instant,
}

/// What happened to an inbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// No pending query carries this token; nothing changed.
    UnknownToken,
    /// Token matched but the payload could not be parsed. The entry is gone.
    Malformed,
    /// Facts were stored and the requester told.
    Learnt { subject: String, from: String },
    /// The subject may not be stored here, or nothing new was learnt.
    /// The entry is gone and nobody is told.
    Refused { subject: String },
}

/// Owns the pending-query table.
///
/// Entries expire after `ttl` and the table never grows past
/// `max_pending`; the oldest entry is dropped to make room. A zero value
/// disables the corresponding limit.
#[derive(Debug)]
pub struct PeerQueryCoordinator {
    pending: HashMap<String, PendingQuery>,
    ttl: Duration,
    max_pending: usize,
}

impl Default for PeerQueryCoordinator {
    fn default() -> Self {
        Self::new(&PeerConfig::default())
    }
}

impl PeerQueryCoordinator {
    #[must_use]
    pub fn new(config: &PeerConfig) -> Self {
        Self {
            pending: HashMap::new(),
            ttl: Duration::from_secs(config.ttl_secs),
            max_pending: config.max_pending,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<&PendingQuery> {
        self.pending.get(token)
    }

    /// Send a query to `peer` on behalf of `origin`. Returns the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query line could not be sent; no entry is
    /// left behind in that case.
    pub async fn ask<R: Rng + ?Sized>(
        &mut self,
        subject: &str,
        peer: &str,
        origin: ReplyContext,
        rng: &mut R,
        transport: &dyn Transport,
    ) -> Result<String, PeerError> {
        let now = Instant::now();
        self.evict_stale(now);
        self.make_room();

        let mut token = generate_token(rng);
        while self.pending.contains_key(&token) {
            token = generate_token(rng);
        }

        self.pending.insert(
            token.clone(),
            PendingQuery {
                subject: subject.to_string(),
                peer: peer.to_string(),
                origin,
                sent_at: now,
            },
        );

        if let Err(e) = transport.send(peer, &format_query(&token, subject)).await {
            self.pending.remove(&token);
            return Err(e.into());
        }

        tracing::info!(token = %token, peer = %peer, subject = %subject, "Sent peer query");
        Ok(token)
    }

    /// Handle `:INFOBOT:REPLY <token> <payload>` received from `from`.
    ///
    /// Facts are only stored when `admit` accepts the reply's subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the learnt facts cannot be stored or the
    /// requester cannot be told. The pending entry is consumed either way.
    pub async fn on_reply<F>(
        &mut self,
        token: &str,
        payload: &str,
        from: &str,
        facts: &FactStore,
        transport: &dyn Transport,
        admit: F,
    ) -> Result<ReplyOutcome, PeerError>
    where
        F: Fn(&str) -> bool,
    {
        self.evict_stale(Instant::now());

        let Some(query) = self.pending.remove(token) else {
            tracing::debug!(token = %token, from = %from, "Dropping reply with unknown token");
            return Ok(ReplyOutcome::UnknownToken);
        };

        if query.peer != from {
            tracing::debug!(token = %token, asked = %query.peer, from = %from, "Reply from a different peer");
        }

        let Some(reply) = parse_reply_payload(payload) else {
            tracing::warn!(token = %token, from = %from, payload = %payload, "Malformed peer reply");
            return Ok(ReplyOutcome::Malformed);
        };

        if !admit(&reply.subject) {
            tracing::info!(token = %token, from = %from, subject = %reply.subject, "Refusing peer fact");
            return Ok(ReplyOutcome::Refused {
                subject: reply.subject,
            });
        }

        let added = facts
            .add(&reply.subject, reply.relation, &reply.facts, from)
            .await?;
        if added == 0 {
            tracing::debug!(token = %token, from = %from, subject = %reply.subject, "Peer reply added nothing");
            return Ok(ReplyOutcome::Refused {
                subject: reply.subject,
            });
        }

        transport
            .send(
                &query.origin.target,
                &format!("Learnt about {} from {from}", reply.subject),
            )
            .await?;

        tracing::info!(token = %token, from = %from, subject = %reply.subject, "Learnt from peer");
        Ok(ReplyOutcome::Learnt {
            subject: reply.subject,
            from: from.to_string(),
        })
    }

    /// Drop entries older than the TTL.
    pub(crate) fn evict_stale(&mut self, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let ttl = self.ttl;
        let before = self.pending.len();
        self.pending
            .retain(|_, q| now.saturating_duration_since(q.sent_at) <= ttl);
        let evicted = before - self.pending.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Expired stale peer queries");
        }
    }

    fn make_room(&mut self) {
        if self.max_pending == 0 {
            return;
        }
        while self.pending.len() >= self.max_pending {
            let Some(oldest) = self
                .pending
                .iter()
                .min_by_key(|(_, q)| q.sent_at)
                .map(|(token, _)| token.clone())
            else {
                break;
            };
            tracing::debug!(token = %oldest, "Pending table full, dropping oldest query");
            self.pending.remove(&oldest);
        }
    }
}
