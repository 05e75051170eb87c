//! Form filling: linear collection, the review screen, edits and submission.

use std::str::FromStr;

use super::engine::ConversationEngine;
use super::form::Form;
use super::messages;
use super::transition::Transition;
use crate::error::Result;
use crate::field::{FieldKey, FieldMap, FieldValue, RawInput, Verdict, validate, validator};
use crate::record::CommitOutcome;
use crate::session::{ConversationState, Phase, Session};
use crate::transport::{Action, Button, InboundEvent, Outbound, Payload};

/// The review screen with its edit and submit buttons.
pub(super) fn review_screen(form: Form, heading: &str, fields: &FieldMap) -> Outbound {
    Outbound::with_buttons(
        format!("{}\n{}", heading, messages::render_fields(form, fields)),
        vec![
            Button::new(messages::EDIT_BUTTON, Action::EditForm(form)),
            Button::new(messages::SUBMIT_BUTTON, Action::SubmitForm(form)),
        ],
    )
}

fn prompt_for(field: FieldKey) -> Outbound {
    Outbound::with_keyboard(field.prompt(), field.choices())
}

impl ConversationEngine {
    /// Validates the input for `field` and advances to its successor.
    pub(super) async fn collect(
        &self,
        session: Session,
        form: Form,
        field: FieldKey,
        event: &InboundEvent,
    ) -> Result<Transition> {
        let input = match &event.payload {
            Payload::Text(text) => RawInput::Text(text),
            Payload::Photo(attachment) | Payload::Document(attachment) => {
                RawInput::Attachment(attachment)
            }
            Payload::Action(_) => return Ok(Transition::keep()),
        };

        let verdict = match validate(field, input) {
            Ok(verdict) => verdict,
            Err(rejection) => {
                tracing::debug!("[Engine] {} rejected for {}", rejection.field, session.subject);
                return Ok(Transition::keep().reply(Outbound::with_keyboard(
                    rejection.reason,
                    field.choices(),
                )));
            }
        };

        let value = match verdict {
            Verdict::AskSchoolName => {
                return Ok(Transition::keep().reply(Outbound::text(validator::SCHOOL_NAME_PROMPT)));
            }
            Verdict::Accept(FieldValue::Integer(slot)) if field == FieldKey::StudentNumber => {
                if !self.resolver.slot_available(slot, session.origin).await? {
                    return Ok(Transition::keep().reply(Outbound::text(validator::SLOT_TAKEN)));
                }
                FieldValue::Integer(slot)
            }
            Verdict::Accept(value) => value,
            Verdict::Store(attachment) => {
                match self.assets.store(&attachment, form.asset_folder(field)).await {
                    Ok(path) => FieldValue::Asset(path),
                    Err(e) => {
                        tracing::warn!("[Engine] Failed to store {} of {}: {}", field, session.subject, e);
                        return Ok(Transition::keep().reply(Outbound::text(messages::UPLOAD_FAILED)));
                    }
                }
            }
        };

        let update: FieldMap = [(field, value.clone())].into_iter().collect();
        match form.successor(field) {
            Some(next) => Ok(Transition::merge(ConversationState::collect(form, next), update)
                .reply(prompt_for(next))),
            None => {
                let mut fields = session.fields;
                fields.set(field, value);
                Ok(Transition::merge(ConversationState::review(form), update).reply(
                    review_screen(form, messages::review_heading(form), &fields),
                ))
            }
        }
    }

    /// Any non-button input on the review screen repeats it.
    pub(super) fn review_reminder(&self, session: &Session, form: Form) -> Transition {
        Transition::keep().reply(review_screen(form, messages::REVIEW_PENDING, &session.fields))
    }

    pub(super) fn begin_edit(&self, session: &Session, form: Form) -> Transition {
        Transition::goto(ConversationState::Form {
            form,
            phase: Phase::EditField,
        })
        .reply(Outbound::text(messages::edit_field_prompt(&session.fields)))
    }

    /// Accepts the internal key of a field that already holds a value.
    pub(super) fn choose_edit_field(&self, session: &Session, event: &InboundEvent) -> Transition {
        let ConversationState::Form { form, .. } = session.state else {
            return Transition::keep();
        };
        let key = match &event.payload {
            Payload::Text(text) => FieldKey::from_str(text.trim())
                .ok()
                .filter(|key| session.fields.contains(*key)),
            _ => None,
        };

        match key {
            Some(key) => Transition::goto(ConversationState::Form {
                form,
                phase: Phase::EditValue(key),
            })
            .reply(Outbound::text(messages::edit_value_prompt(key.as_ref()))),
            None => Transition::keep().reply(Outbound::text(messages::UNKNOWN_FIELD)),
        }
    }

    /// Stores the new value verbatim, without validation, and re-renders the
    /// review screen.
    pub(super) fn apply_edit(
        &self,
        session: &Session,
        form: Form,
        field: FieldKey,
        event: &InboundEvent,
    ) -> Transition {
        let Payload::Text(text) = &event.payload else {
            return Transition::keep().reply(Outbound::text(format!(
                "{} {}",
                messages::TEXT_EXPECTED,
                messages::edit_value_prompt(field.as_ref())
            )));
        };

        let value = FieldValue::text(text.as_str());
        let mut fields = session.fields.clone();
        fields.set(field, value.clone());
        tracing::debug!("[Engine] {} edited {} of {:?} form", session.subject, field, form);

        Transition::merge(
            ConversationState::review(form),
            [(field, value)].into_iter().collect(),
        )
        .reply(review_screen(form, messages::FIELD_UPDATED, &fields))
    }

    /// Writes the form. A failed write keeps the data and returns to review.
    pub(super) async fn submit(&self, session: Session, form: Form) -> Result<Transition> {
        let saved = match form {
            Form::Student => self
                .resolver
                .commit_student(&session)
                .await
                .map(|outcome| match outcome {
                    CommitOutcome::Created(_) => messages::STUDENT_SAVED,
                    CommitOutcome::Updated(_) => messages::STUDENT_UPDATED,
                }),
            Form::Admission => self
                .admissions
                .insert(session.subject, &session.fields)
                .await
                .map(|id| {
                    tracing::info!("[Engine] Admission {} filed by {}", id, session.subject);
                    messages::ADMISSION_SAVED
                }),
        };

        match saved {
            Ok(message) => Ok(Transition::clear().reply(Outbound::text(message))),
            Err(e) => {
                tracing::warn!("[Engine] Commit of {:?} form by {} failed: {}", form, session.subject, e);
                Ok(Transition::goto(ConversationState::review(form))
                    .reply(Outbound::text(messages::commit_failed(&e.to_string())))
                    .reply(review_screen(form, messages::review_heading(form), &session.fields)))
            }
        }
    }
}
