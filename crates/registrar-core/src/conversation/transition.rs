//! The result of one engine step.

use crate::field::FieldMap;
use crate::session::{ConversationState, Session};
use crate::transport::{Outbound, SubjectId};

/// What to do with the stored session after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// Leave the session exactly as it was (rejections, read-only screens).
    Keep,
    /// Move to `state` and copy `fields` over the accumulated data.
    Merge {
        state: ConversationState,
        fields: FieldMap,
    },
    /// Replace the whole session (flow entry, resume seeding).
    Replace(Session),
    /// Drop the session.
    Clear,
}

/// An outbound side effect, executed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the user who produced the event.
    Reply(Outbound),
    /// Forward a text to another identity. The dispatcher reports success or
    /// failure back to the sender.
    Relay { to: SubjectId, text: String },
}

/// Next session state plus the effects to run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub change: SessionChange,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn keep() -> Self {
        Self::with_change(SessionChange::Keep)
    }

    pub fn clear() -> Self {
        Self::with_change(SessionChange::Clear)
    }

    pub fn replace(session: Session) -> Self {
        Self::with_change(SessionChange::Replace(session))
    }

    pub fn merge(state: ConversationState, fields: FieldMap) -> Self {
        Self::with_change(SessionChange::Merge { state, fields })
    }

    /// Moves to `state` without touching the data.
    pub fn goto(state: ConversationState) -> Self {
        Self::merge(state, FieldMap::new())
    }

    fn with_change(change: SessionChange) -> Self {
        Self {
            change,
            effects: Vec::new(),
        }
    }

    pub fn reply(mut self, message: Outbound) -> Self {
        self.effects.push(Effect::Reply(message));
        self
    }

    pub fn relay(mut self, to: SubjectId, text: impl Into<String>) -> Self {
        self.effects.push(Effect::Relay {
            to,
            text: text.into(),
        });
        self
    }

    /// Messages addressed to the sender.
    pub fn replies(&self) -> impl Iterator<Item = &Outbound> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Reply(message) => Some(message),
            Effect::Relay { .. } => None,
        })
    }
}
