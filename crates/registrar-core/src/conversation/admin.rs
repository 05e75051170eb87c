//! Administrative menus behind the password prompt.

use std::str::FromStr;

use chrono::Utc;

use super::engine::{ConversationEngine, main_menu};
use super::menu::{AdminEntry, SupervisorEntry, keyboard};
use super::messages;
use super::transition::Transition;
use crate::error::{RegistrarError, Result};
use crate::record::Supervisor;
use crate::session::{AdminState, ConversationState, Session, SupervisorDraft};
use crate::transport::{InboundEvent, Outbound, Payload, SubjectId};

fn admin_menu(body: impl Into<String>) -> Outbound {
    Outbound::with_keyboard(body, keyboard::<AdminEntry>())
}

fn supervisor_menu(body: impl Into<String>) -> Outbound {
    Outbound::with_keyboard(body, keyboard::<SupervisorEntry>())
}

/// Back to the supervisor submenu with the draft discarded.
fn back_to_supervisors(subject: SubjectId) -> Transition {
    Transition::replace(Session::new(
        subject,
        ConversationState::Admin(AdminState::Supervisors),
    ))
}

impl ConversationEngine {
    pub(super) async fn admin(
        &self,
        session: Session,
        state: AdminState,
        event: &InboundEvent,
    ) -> Result<Transition> {
        let Payload::Text(text) = &event.payload else {
            return Ok(Transition::keep());
        };

        match state {
            AdminState::AwaitingPassword => {
                if self.gate.verify_password(text) {
                    tracing::info!("[Admin] {} signed in", event.subject);
                    Ok(Transition::goto(ConversationState::Admin(AdminState::Menu))
                        .reply(admin_menu(messages::ADMIN_WELCOME)))
                } else {
                    tracing::warn!("[Admin] Wrong password from {}", event.subject);
                    Ok(Transition::clear().reply(Outbound::text(messages::PASSWORD_REJECTED)))
                }
            }
            AdminState::Menu => self.admin_menu_choice(text.trim(), event).await,
            AdminState::ToggleViewName => {
                let full_name = text.trim();
                let reply = match self.students.toggle_view_permission(full_name).await? {
                    Some(allowed) => messages::view_toggled(full_name, allowed),
                    None => messages::student_not_found(full_name),
                };
                Ok(Transition::clear().reply(Outbound::text(reply)))
            }
            AdminState::Supervisors => self.supervisor_choice(text.trim(), event.subject).await,
            AdminState::AddSupervisorIdentity => match text.trim().parse::<i64>() {
                Ok(id) => {
                    let mut next = session.with_state(ConversationState::Admin(
                        AdminState::AddSupervisorUsername,
                    ));
                    next.supervisor_draft = SupervisorDraft {
                        identity: Some(SubjectId(id)),
                        ..SupervisorDraft::default()
                    };
                    Ok(Transition::replace(next)
                        .reply(Outbound::text(messages::SUPERVISOR_USERNAME_PROMPT)))
                }
                Err(_) => {
                    Ok(Transition::keep().reply(Outbound::text(messages::SUPERVISOR_ID_INVALID)))
                }
            },
            AdminState::AddSupervisorUsername => {
                let username = text.trim();
                let mut next = session.with_state(ConversationState::Admin(
                    AdminState::AddSupervisorFullName,
                ));
                next.supervisor_draft.username =
                    (username != messages::NO_USERNAME).then(|| username.to_string());
                Ok(Transition::replace(next)
                    .reply(Outbound::text(messages::SUPERVISOR_NAME_PROMPT)))
            }
            AdminState::AddSupervisorFullName => {
                let mut next = session.with_state(ConversationState::Admin(
                    AdminState::AddSupervisorPassword,
                ));
                next.supervisor_draft.full_name = Some(text.trim().to_string());
                Ok(Transition::replace(next)
                    .reply(Outbound::text(messages::SUPERVISOR_PASSWORD_PROMPT)))
            }
            AdminState::AddSupervisorPassword => {
                self.add_supervisor(&session.supervisor_draft, text, event.subject)
                    .await
            }
            AdminState::RemoveSupervisorIdentity => {
                let reply = match text.trim().parse::<i64>() {
                    Ok(id) => {
                        if self.supervisors.remove(SubjectId(id)).await? {
                            tracing::info!("[Admin] Supervisor {} removed", id);
                            messages::supervisor_removed(id)
                        } else {
                            messages::SUPERVISOR_NOT_FOUND.to_string()
                        }
                    }
                    Err(_) => messages::SUPERVISOR_ID_INVALID.to_string(),
                };
                Ok(back_to_supervisors(event.subject)
                    .reply(Outbound::text(reply))
                    .reply(supervisor_menu(messages::SUPERVISOR_MENU)))
            }
        }
    }

    async fn admin_menu_choice(&self, choice: &str, event: &InboundEvent) -> Result<Transition> {
        let Ok(entry) = AdminEntry::from_str(choice) else {
            return Ok(Transition::keep().reply(admin_menu(messages::ADMIN_CHOOSE)));
        };

        match entry {
            AdminEntry::Statistics => {
                let stats = self.students.statistics().await?;
                Ok(Transition::keep().reply(Outbound::text(messages::statistics(&stats))))
            }
            AdminEntry::Export => match self.exporter.export().await? {
                Some(path) => {
                    tracing::info!("[Admin] Students exported to {}", path.display());
                    Ok(Transition::keep().reply(Outbound::Document {
                        path,
                        caption: messages::EXPORT_DONE.to_string(),
                    }))
                }
                None => Ok(Transition::keep().reply(Outbound::text(messages::EXPORT_EMPTY))),
            },
            AdminEntry::ToggleForm => {
                let status = self.gate.toggle_form().await?;
                Ok(Transition::keep().reply(Outbound::text(messages::form_toggled(status.verb()))))
            }
            AdminEntry::ToggleViewPermission => {
                Ok(Transition::goto(ConversationState::Admin(AdminState::ToggleViewName))
                    .reply(Outbound::text(messages::TOGGLE_VIEW_PROMPT)))
            }
            AdminEntry::Supervisors => {
                Ok(Transition::goto(ConversationState::Admin(AdminState::Supervisors))
                    .reply(supervisor_menu(messages::SUPERVISOR_MENU)))
            }
            AdminEntry::Back => Ok(Transition::clear().reply(main_menu(&event.display_name))),
        }
    }

    async fn supervisor_choice(&self, choice: &str, subject: SubjectId) -> Result<Transition> {
        let Ok(entry) = SupervisorEntry::from_str(choice) else {
            return Ok(Transition::keep().reply(supervisor_menu(messages::SUPERVISOR_MENU)));
        };

        match entry {
            SupervisorEntry::Add => Ok(Transition::goto(ConversationState::Admin(
                AdminState::AddSupervisorIdentity,
            ))
            .reply(Outbound::text(messages::SUPERVISOR_ID_PROMPT))),
            SupervisorEntry::Remove => Ok(Transition::goto(ConversationState::Admin(
                AdminState::RemoveSupervisorIdentity,
            ))
            .reply(Outbound::text(messages::SUPERVISOR_REMOVE_PROMPT))),
            SupervisorEntry::List => {
                let supervisors = self.supervisors.list_all().await?;
                let body = if supervisors.is_empty() {
                    messages::SUPERVISORS_EMPTY.to_string()
                } else {
                    supervisors
                        .iter()
                        .map(|s| {
                            format!(
                                "{} - {} (@{})",
                                s.identity,
                                s.full_name,
                                s.username.as_deref().unwrap_or(messages::NO_USERNAME)
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                Ok(back_to_supervisors(subject).reply(supervisor_menu(body)))
            }
            SupervisorEntry::Back => Ok(Transition::goto(ConversationState::Admin(AdminState::Menu))
                .reply(admin_menu(messages::ADMIN_RETURNED))),
        }
    }

    async fn add_supervisor(
        &self,
        draft: &SupervisorDraft,
        password: &str,
        subject: SubjectId,
    ) -> Result<Transition> {
        let (Some(identity), Some(full_name)) = (draft.identity, draft.full_name.clone()) else {
            return Err(RegistrarError::internal("supervisor draft is incomplete"));
        };
        let supervisor = Supervisor {
            identity,
            username: draft.username.clone(),
            full_name,
            password: password.trim().to_string(),
            created_at: Utc::now(),
        };

        let reply = if self.supervisors.add(&supervisor).await? {
            tracing::info!("[Admin] Supervisor {} added by {}", identity, subject);
            messages::supervisor_added(&supervisor.full_name)
        } else {
            messages::SUPERVISOR_ADD_FAILED.to_string()
        };
        Ok(back_to_supervisors(subject)
            .reply(Outbound::text(reply))
            .reply(supervisor_menu(messages::SUPERVISOR_MENU)))
    }
}
