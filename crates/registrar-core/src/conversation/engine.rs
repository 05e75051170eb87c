//! The conversation engine: one inbound event in, one [`Transition`] out.

use std::str::FromStr;
use std::sync::Arc;

use super::form::Form;
use super::menu::{MenuEntry, keyboard};
use super::messages;
use super::transition::Transition;
use crate::admin::AdminGate;
use crate::error::Result;
use crate::record::{
    AdmissionRepository, AssetStore, RecordResolver, RosterImporter, SettingsRepository,
    StudentExporter, StudentRepository, SupervisorRepository,
};
use crate::session::{AdminState, ConversationState, Phase, Session};
use crate::transport::{Action, FileFetcher, InboundEvent, Outbound, Payload, SubjectId};

/// Everything the engine reads from or writes to besides the session.
#[derive(Clone)]
pub struct Collaborators {
    pub students: Arc<dyn StudentRepository>,
    pub admissions: Arc<dyn AdmissionRepository>,
    pub supervisors: Arc<dyn SupervisorRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub assets: Arc<dyn AssetStore>,
    pub files: Arc<dyn FileFetcher>,
    pub importer: Arc<dyn RosterImporter>,
    pub exporter: Arc<dyn StudentExporter>,
}

/// Deployment values the engine needs.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub admin_password: String,
    /// Recipient of "contact the administration" messages.
    pub contact_identity: Option<SubjectId>,
}

/// Decides, for one event and the sender's current session, what the next
/// session is and what to send.
///
/// The engine never stores the session itself. The dispatcher applies
/// [`Transition::change`] and delivers [`Transition::effects`].
pub struct ConversationEngine {
    pub(super) resolver: RecordResolver,
    pub(super) gate: AdminGate,
    pub(super) students: Arc<dyn StudentRepository>,
    pub(super) admissions: Arc<dyn AdmissionRepository>,
    pub(super) supervisors: Arc<dyn SupervisorRepository>,
    pub(super) assets: Arc<dyn AssetStore>,
    pub(super) files: Arc<dyn FileFetcher>,
    pub(super) importer: Arc<dyn RosterImporter>,
    pub(super) exporter: Arc<dyn StudentExporter>,
    pub(super) contact: Option<SubjectId>,
}

impl ConversationEngine {
    pub fn new(collaborators: Collaborators, settings: EngineSettings) -> Self {
        Self {
            resolver: RecordResolver::new(collaborators.students.clone()),
            gate: AdminGate::new(collaborators.settings, settings.admin_password),
            students: collaborators.students,
            admissions: collaborators.admissions,
            supervisors: collaborators.supervisors,
            assets: collaborators.assets,
            files: collaborators.files,
            importer: collaborators.importer,
            exporter: collaborators.exporter,
            contact: settings.contact_identity,
        }
    }

    /// Processes one event.
    ///
    /// Recoverable user errors (bad input, expired buttons, failed commits)
    /// come back as `Ok` transitions carrying a reply. `Err` means a
    /// collaborator failed unexpectedly; the session should then be kept.
    pub async fn step(&self, session: Option<Session>, event: &InboundEvent) -> Result<Transition> {
        if let Payload::Text(text) = &event.payload {
            let command = text.trim();
            if command == "/start" {
                return Ok(Transition::keep().reply(main_menu(&event.display_name)));
            }
            if let Ok(entry) = MenuEntry::from_str(command) {
                return self.enter(entry, event.subject).await;
            }
        }

        if let Payload::Action(action) = &event.payload {
            return self.on_action(*action, session, event.subject).await;
        }

        let Some(session) = session else {
            return Ok(Transition::keep().reply(Outbound::text(messages::USE_START)));
        };

        match session.state {
            ConversationState::Form { form, phase } => match phase {
                Phase::Collect(field) => self.collect(session, form, field, event).await,
                Phase::Review => Ok(self.review_reminder(&session, form)),
                Phase::EditField => Ok(self.choose_edit_field(&session, event)),
                Phase::EditValue(field) => Ok(self.apply_edit(&session, form, field, event)),
            },
            ConversationState::SearchName => self.search(event).await,
            ConversationState::ContactAdmin => Ok(self.relay_to_admin(event)),
            ConversationState::AwaitingUpload => self.import_upload(event).await,
            ConversationState::Admin(state) => self.admin(session, state, event).await,
        }
    }

    /// Starts a main-menu flow with a fresh session.
    async fn enter(&self, entry: MenuEntry, subject: SubjectId) -> Result<Transition> {
        tracing::debug!("[Engine] {} entered {:?}", subject, entry);
        let fresh = |state| Session::new(subject, state);

        match entry {
            MenuEntry::RegisterStudent => self.start_form(Form::Student, subject).await,
            MenuEntry::Admission => self.start_form(Form::Admission, subject).await,
            MenuEntry::SearchName => Ok(Transition::replace(fresh(ConversationState::SearchName))
                .reply(Outbound::text(messages::SEARCH_PROMPT))),
            MenuEntry::ContactAdmin => {
                Ok(Transition::replace(fresh(ConversationState::ContactAdmin))
                    .reply(Outbound::text(messages::CONTACT_PROMPT)))
            }
            MenuEntry::UploadFile => {
                Ok(Transition::replace(fresh(ConversationState::AwaitingUpload))
                    .reply(Outbound::text(messages::UPLOAD_PROMPT)))
            }
            MenuEntry::Supervisor => Ok(Transition::replace(fresh(ConversationState::Admin(
                AdminState::AwaitingPassword,
            )))
            .reply(Outbound::text(messages::PASSWORD_PROMPT))),
        }
    }

    /// Opens `form` at its first field. A closed form ends any session.
    pub(super) async fn start_form(&self, form: Form, subject: SubjectId) -> Result<Transition> {
        if !self.gate.form_open().await? {
            tracing::info!("[Engine] {:?} form refused for {}: closed", form, subject);
            return Ok(Transition::clear().reply(Outbound::text(form.closed_notice())));
        }
        let first = form.sequence()[0];
        Ok(
            Transition::replace(Session::new(subject, ConversationState::collect(form, first)))
                .reply(Outbound::text(form.welcome())),
        )
    }

    async fn on_action(
        &self,
        action: Action,
        session: Option<Session>,
        subject: SubjectId,
    ) -> Result<Transition> {
        match action {
            Action::RegisterNew => self.start_form(Form::Student, subject).await,
            Action::EditRecord(record_id) => self.open_record(record_id, subject).await,
            Action::EditForm(form) | Action::SubmitForm(form) => {
                let session = match session {
                    Some(session) if reviewing(&session, form) => session,
                    _ => {
                        tracing::debug!("[Engine] Expired {} from {}", action, subject);
                        return Ok(Transition::keep().reply(Outbound::text(messages::ACTION_EXPIRED)));
                    }
                };
                if matches!(action, Action::EditForm(_)) {
                    Ok(self.begin_edit(&session, form))
                } else {
                    self.submit(session, form).await
                }
            }
        }
    }
}

/// Review buttons only apply to a session that is past collection of the
/// same form.
fn reviewing(session: &Session, form: Form) -> bool {
    matches!(
        session.state,
        ConversationState::Form { form: f, phase: Phase::Review | Phase::EditField | Phase::EditValue(_) }
            if f == form
    )
}

pub(super) fn main_menu(display_name: &str) -> Outbound {
    Outbound::with_keyboard(messages::greeting(display_name), keyboard::<MenuEntry>())
}
