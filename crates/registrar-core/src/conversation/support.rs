//! Contact-the-administration relay and roster upload.

use super::engine::ConversationEngine;
use super::messages;
use super::transition::Transition;
use crate::error::Result;
use crate::transport::{InboundEvent, Outbound, Payload};

impl ConversationEngine {
    /// Forwards the text to the configured administration identity. The
    /// session ends whatever the outcome.
    pub(super) fn relay_to_admin(&self, event: &InboundEvent) -> Transition {
        let Payload::Text(text) = &event.payload else {
            return Transition::keep().reply(Outbound::text(messages::CONTACT_PROMPT));
        };
        match self.contact {
            Some(admin) => Transition::clear().relay(
                admin,
                messages::relayed(&event.display_name, event.subject, text),
            ),
            None => {
                tracing::warn!("[Engine] Contact message from {} dropped: no admin identity", event.subject);
                Transition::clear().reply(Outbound::text(messages::CONTACT_UNAVAILABLE))
            }
        }
    }

    /// Imports an uploaded name list as shell records.
    pub(super) async fn import_upload(&self, event: &InboundEvent) -> Result<Transition> {
        let attachment = match &event.payload {
            Payload::Document(attachment) | Payload::Photo(attachment) => attachment,
            _ => return Ok(Transition::keep().reply(Outbound::text(messages::UPLOAD_PROMPT))),
        };
        let file_name = attachment.file_name.clone().unwrap_or_default();

        if !self.importer.supports(&file_name) {
            return Ok(Transition::clear().reply(Outbound::text(messages::UPLOAD_UNSUPPORTED)));
        }

        let received = Outbound::text(messages::file_received(&file_name));
        let imported = match self.files.fetch(attachment).await {
            Ok(bytes) => self.importer.import(&file_name, &bytes).await,
            Err(e) => Err(e),
        };

        let outcome = match imported {
            Ok(report) => {
                tracing::info!(
                    "[Engine] Imported '{}' from {}: {} new, {} existing",
                    file_name,
                    event.subject,
                    report.inserted,
                    report.skipped
                );
                messages::import_done(report.inserted, report.skipped)
            }
            Err(e) => {
                tracing::warn!("[Engine] Import of '{}' failed: {}", file_name, e);
                messages::import_failed(&e.to_string())
            }
        };
        Ok(Transition::clear()
            .reply(received)
            .reply(Outbound::text(outcome)))
    }
}
