//! Resume-by-name and editing of stored records.

use super::engine::ConversationEngine;
use super::form::Form;
use super::messages;
use super::transition::Transition;
use crate::error::Result;
use crate::field::FieldKey;
use crate::record::{Resume, StudentRecord};
use crate::session::{ConversationState, Phase, RecordOrigin, Session};
use crate::transport::{Action, Button, InboundEvent, Outbound, Payload, SubjectId};

impl ConversationEngine {
    pub(super) async fn search(&self, event: &InboundEvent) -> Result<Transition> {
        let Payload::Text(text) = &event.payload else {
            return Ok(Transition::keep().reply(Outbound::text(messages::SEARCH_PROMPT)));
        };
        let full_name = text.trim();

        let transition = match self.resolver.resume(full_name).await? {
            Resume::NotFound => Transition::clear().reply(Outbound::with_buttons(
                messages::SEARCH_MISS,
                vec![Button::new(messages::REGISTER_BUTTON, Action::RegisterNew)],
            )),
            Resume::Incomplete(record) if owned_by_other(&record, event.subject) => {
                tracing::info!("[Engine] {} refused resume of record {}: not the owner", event.subject, record.id);
                Transition::clear().reply(Outbound::text(messages::RECORD_OWNED_ELSEWHERE))
            }
            Resume::Incomplete(record) => {
                // Continue from the second field; the name is already known.
                let session = Session::seeded(
                    event.subject,
                    ConversationState::collect(Form::Student, FieldKey::Dob),
                    record.fields.clone(),
                    RecordOrigin::from(&record),
                );
                Transition::replace(session)
                    .reply(Outbound::text(messages::resume_found(record.full_name())))
            }
            Resume::Denied(_) => Transition::clear().reply(Outbound::text(messages::VIEW_DENIED)),
            // Others may read a complete record but only its owner gets the edit action
            Resume::Complete(record) if owned_by_other(&record, event.subject) => {
                Transition::clear().reply(Outbound::text(messages::record_found(
                    &messages::render_fields(Form::Student, &record.fields),
                )))
            }
            Resume::Complete(record) => Transition::clear().reply(Outbound::with_buttons(
                messages::record_found(&messages::render_fields(Form::Student, &record.fields)),
                vec![Button::new(
                    messages::EDIT_RECORD_BUTTON,
                    Action::EditRecord(record.id),
                )],
            )),
        };
        Ok(transition)
    }

    /// Seeds an edit session from a stored record, straight into the edit
    /// sub-protocol.
    pub(super) async fn open_record(&self, record_id: i64, subject: SubjectId) -> Result<Transition> {
        let Some(record) = self.resolver.record_for_edit(record_id).await? else {
            return Ok(Transition::keep().reply(Outbound::text(messages::RECORD_MISSING)));
        };
        if owned_by_other(&record, subject) {
            tracing::warn!("[Engine] {} refused edit of record {}: not the owner", subject, record_id);
            return Ok(Transition::clear().reply(Outbound::text(messages::RECORD_OWNED_ELSEWHERE)));
        }
        if !record.can_view_data {
            return Ok(Transition::clear().reply(Outbound::text(messages::VIEW_DENIED)));
        }

        tracing::info!("[Engine] {} opened record {} for editing", subject, record_id);
        let prompt = messages::edit_field_prompt(&record.fields);
        let session = Session::seeded(
            subject,
            ConversationState::Form {
                form: Form::Student,
                phase: Phase::EditField,
            },
            record.fields.clone(),
            RecordOrigin::from(&record),
        );
        Ok(Transition::replace(session).reply(Outbound::text(prompt)))
    }
}

/// A record linked to an identity other than `subject`.
fn owned_by_other(record: &StudentRecord, subject: SubjectId) -> bool {
    record.identity.is_some_and(|owner| owner != subject)
}
