//! Process-local session store.

use std::collections::HashMap;

use async_trait::async_trait;
use registrar_core::error::Result;
use registrar_core::field::FieldMap;
use registrar_core::session::{ConversationState, Session, SessionStore};
use registrar_core::transport::SubjectId;
use tokio::sync::RwLock;

/// Keeps sessions in memory. Sessions do not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SubjectId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active conversations.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, subject: SubjectId) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(&subject).cloned())
    }

    async fn merge(
        &self,
        subject: SubjectId,
        state: ConversationState,
        fields: FieldMap,
    ) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(subject)
            .or_insert_with(|| Session::new(subject, state));
        session.state = state;
        session.fields.merge(fields);
        Ok(())
    }

    async fn replace(&self, session: Session) -> Result<()> {
        self.sessions.write().await.insert(session.subject, session);
        Ok(())
    }

    async fn clear(&self, subject: SubjectId) -> Result<()> {
        self.sessions.write().await.remove(&subject);
        Ok(())
    }
}
