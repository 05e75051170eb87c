//! Event dispatcher.
//!
//! `ConversationService` is the only caller of the engine. For every inbound
//! event it:
//!
//! 1. Serializes against other events of the same user
//! 2. Loads the session and runs one engine step
//! 3. Persists the resulting session change
//! 4. Delivers the effects through the transport
//!
//! An engine failure never escapes: the user gets a generic error reply and
//! the session is left untouched.

use std::sync::Arc;

use anyhow::{Context, Result};
use registrar_core::conversation::{ConversationEngine, Effect, SessionChange, Transition, messages};
use registrar_core::session::SessionStore;
use registrar_core::transport::{InboundEvent, Outbound, SubjectId, Transport};

use crate::subject_locks::SubjectLocks;

pub struct ConversationService {
    engine: ConversationEngine,
    sessions: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    locks: SubjectLocks,
}

impl ConversationService {
    pub fn new(
        engine: ConversationEngine,
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            engine,
            sessions,
            transport,
            locks: SubjectLocks::new(),
        }
    }

    /// Handles one inbound event end to end.
    ///
    /// Returns an error only when the session store fails.
    pub async fn handle(&self, event: InboundEvent) -> Result<()> {
        let subject = event.subject;
        let guard = self.locks.acquire(subject).await;
        let result = self.handle_locked(event).await;
        self.locks.release(subject, guard).await;
        result
    }

    async fn handle_locked(&self, event: InboundEvent) -> Result<()> {
        let subject = event.subject;
        let session = self
            .sessions
            .load(subject)
            .await
            .with_context(|| format!("Failed to load session of {}", subject))?;

        let transition = match self.engine.step(session, &event).await {
            Ok(transition) => transition,
            Err(e) => {
                tracing::error!("[Dispatcher] Step failed for {}: {}", subject, e);
                Transition::keep().reply(Outbound::text(messages::UNEXPECTED_ERROR))
            }
        };

        self.apply(subject, transition.change)
            .await
            .with_context(|| format!("Failed to store session of {}", subject))?;

        for effect in transition.effects {
            self.deliver(subject, effect).await;
        }
        Ok(())
    }

    async fn apply(&self, subject: SubjectId, change: SessionChange) -> registrar_core::Result<()> {
        match change {
            SessionChange::Keep => Ok(()),
            SessionChange::Merge { state, fields } => {
                self.sessions.merge(subject, state, fields).await
            }
            SessionChange::Replace(session) => self.sessions.replace(session).await,
            SessionChange::Clear => self.sessions.clear(subject).await,
        }
    }

    async fn deliver(&self, subject: SubjectId, effect: Effect) {
        match effect {
            Effect::Reply(message) => self.send(subject, message).await,
            Effect::Relay { to, text } => {
                let ack = match self.transport.send(to, Outbound::text(text)).await {
                    Ok(()) => {
                        tracing::info!("[Dispatcher] Relayed message from {} to {}", subject, to);
                        messages::CONTACT_SENT.to_string()
                    }
                    Err(e) => {
                        tracing::warn!("[Dispatcher] Relay from {} to {} failed: {}", subject, to, e);
                        messages::relay_failed(&e.to_string())
                    }
                };
                self.send(subject, Outbound::text(ack)).await;
            }
        }
    }

    /// Sends a reply; delivery failures are logged and dropped.
    async fn send(&self, to: SubjectId, message: Outbound) {
        if let Err(e) = self.transport.send(to, message).await {
            tracing::warn!("[Dispatcher] Delivery to {} failed: {}", to, e);
        }
    }
}
