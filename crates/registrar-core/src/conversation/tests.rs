use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::*;
use crate::error::{RegistrarError, Result};
use crate::field::{FieldKey, FieldMap, FieldValue};
use crate::record::{
    AdmissionRecord, AdmissionRepository, AssetStore, CommitAction, CommitOutcome, ImportReport,
    RosterImporter, SettingsRepository, StudentCommit, StudentExporter, StudentRecord,
    StudentRepository, StudentStatistics, Supervisor, SupervisorRepository,
};
use crate::session::{AdminState, ConversationState, Phase, RecordOrigin, Session};
use crate::transport::{
    Action, Attachment, Choices, FileFetcher, InboundEvent, Outbound, Payload, SubjectId,
};

// In-memory fakes for the engine collaborators

#[derive(Default)]
struct FakeStudents {
    rows: Mutex<Vec<StudentRecord>>,
}

impl FakeStudents {
    fn push(&self, identity: Option<i64>, fields: FieldMap, can_view_data: bool) -> i64 {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(StudentRecord {
            id,
            identity: identity.map(SubjectId),
            fields,
            can_view_data,
            is_form_locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl StudentRepository for FakeStudents {
    async fn find_by_name(&self, full_name: &str) -> Result<Option<StudentRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.full_name() == full_name).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StudentRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    async fn slot_in_use(&self, slot: i64, excluding: Option<i64>) -> Result<bool> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().any(|r| {
            Some(r.id) != excluding
                && r.fields
                    .get(FieldKey::StudentNumber)
                    .and_then(FieldValue::as_integer)
                    == Some(slot)
        }))
    }

    async fn commit(&self, commit: StudentCommit) -> Result<CommitOutcome> {
        let name = commit.fields.full_name().unwrap_or_default().to_string();
        let shell = {
            let rows = self.rows.lock().unwrap();
            rows.iter()
                .find(|r| r.identity.is_none() && r.full_name() == name)
                .map(|r| r.id)
        };
        match CommitAction::plan(commit.target, shell) {
            action @ (CommitAction::Update(id) | CommitAction::Claim(id)) => {
                let mut rows = self.rows.lock().unwrap();
                let row = rows
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| RegistrarError::not_found("Student", id.to_string()))?;
                if matches!(action, CommitAction::Claim(_)) {
                    row.identity = Some(commit.identity);
                }
                row.fields.merge(commit.fields);
                Ok(CommitOutcome::Updated(id))
            }
            CommitAction::Insert => Ok(CommitOutcome::Created(self.push(
                Some(commit.identity.0),
                commit.fields,
                true,
            ))),
        }
    }

    async fn insert_shell(&self, full_name: &str) -> Result<bool> {
        if self.find_by_name(full_name).await?.is_some() {
            return Ok(false);
        }
        self.push(
            None,
            [(FieldKey::FullName, FieldValue::text(full_name))]
                .into_iter()
                .collect(),
            true,
        );
        Ok(true)
    }

    async fn toggle_view_permission(&self, full_name: &str) -> Result<Option<bool>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|r| r.full_name() == full_name)
            .map(|r| {
                r.can_view_data = !r.can_view_data;
                r.can_view_data
            }))
    }

    async fn statistics(&self) -> Result<StudentStatistics> {
        Ok(StudentStatistics {
            total: self.rows.lock().unwrap().len() as u64,
            ..StudentStatistics::default()
        })
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct FakeAdmissions {
    rows: Mutex<Vec<FieldMap>>,
}

#[async_trait]
impl AdmissionRepository for FakeAdmissions {
    async fn insert(&self, _identity: SubjectId, fields: &FieldMap) -> Result<i64> {
        let mut rows = self.rows.lock().unwrap();
        rows.push(fields.clone());
        Ok(rows.len() as i64)
    }

    async fn list_all(&self) -> Result<Vec<AdmissionRecord>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct FakeSettings {
    form_status: Mutex<Option<String>>,
}

#[async_trait]
impl SettingsRepository for FakeSettings {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(self.form_status.lock().unwrap().clone())
    }

    async fn set(&self, _key: &str, value: &str) -> Result<()> {
        *self.form_status.lock().unwrap() = Some(value.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeSupervisors {
    rows: Mutex<Vec<Supervisor>>,
}

#[async_trait]
impl SupervisorRepository for FakeSupervisors {
    async fn add(&self, supervisor: &Supervisor) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|s| s.identity == supervisor.identity) {
            return Ok(false);
        }
        rows.push(supervisor.clone());
        Ok(true)
    }

    async fn remove(&self, identity: SubjectId) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.identity != identity);
        Ok(rows.len() != before)
    }

    async fn list_all(&self) -> Result<Vec<Supervisor>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

struct FakeFiles;

#[async_trait]
impl AssetStore for FakeFiles {
    async fn store(&self, attachment: &Attachment, folder: &str) -> Result<String> {
        Ok(format!("{}/{}.{}", folder, attachment.file_id, attachment.extension()))
    }
}

#[async_trait]
impl FileFetcher for FakeFiles {
    async fn fetch(&self, _attachment: &Attachment) -> Result<Vec<u8>> {
        Ok(b"Ali Hassan\nOmar Khalid\n".to_vec())
    }
}

#[async_trait]
impl RosterImporter for FakeFiles {
    fn supports(&self, file_name: &str) -> bool {
        file_name.ends_with(".txt")
    }

    async fn import(&self, _file_name: &str, bytes: &[u8]) -> Result<ImportReport> {
        let lines = String::from_utf8_lossy(bytes).lines().count();
        Ok(ImportReport {
            inserted: lines,
            skipped: 0,
        })
    }
}

#[async_trait]
impl StudentExporter for FakeFiles {
    async fn export(&self) -> Result<Option<PathBuf>> {
        Ok(Some(PathBuf::from("exports/students.csv")))
    }
}

struct Harness {
    engine: ConversationEngine,
    students: Arc<FakeStudents>,
    admissions: Arc<FakeAdmissions>,
    settings: Arc<FakeSettings>,
    supervisors: Arc<FakeSupervisors>,
    session: Option<Session>,
}

const ME: SubjectId = SubjectId(100);

impl Harness {
    fn new() -> Self {
        let students = Arc::new(FakeStudents::default());
        let admissions = Arc::new(FakeAdmissions::default());
        let settings = Arc::new(FakeSettings::default());
        let supervisors = Arc::new(FakeSupervisors::default());
        let files = Arc::new(FakeFiles);
        let engine = ConversationEngine::new(
            Collaborators {
                students: students.clone(),
                admissions: admissions.clone(),
                supervisors: supervisors.clone(),
                settings: settings.clone(),
                assets: files.clone(),
                files: files.clone(),
                importer: files.clone(),
                exporter: files,
            },
            EngineSettings {
                admin_password: "1526".to_string(),
                contact_identity: Some(SubjectId(1)),
            },
        );
        Self {
            engine,
            students,
            admissions,
            settings,
            supervisors,
            session: None,
        }
    }

    /// Runs one step and applies the session change the way the dispatcher does.
    async fn send(&mut self, payload: Payload) -> Transition {
        let event = InboundEvent {
            subject: ME,
            display_name: "Ali".to_string(),
            payload,
        };
        let transition = self.engine.step(self.session.clone(), &event).await.unwrap();
        match &transition.change {
            SessionChange::Keep => {}
            SessionChange::Merge { state, fields } => {
                let session = self
                    .session
                    .get_or_insert_with(|| Session::new(ME, *state));
                session.state = *state;
                session.fields.merge(fields.clone());
            }
            SessionChange::Replace(session) => self.session = Some(session.clone()),
            SessionChange::Clear => self.session = None,
        }
        transition
    }

    async fn text(&mut self, text: &str) -> Transition {
        self.send(Payload::Text(text.to_string())).await
    }

    async fn photo(&mut self, file_id: &str) -> Transition {
        self.send(Payload::Photo(Attachment::new(file_id, None))).await
    }

    async fn press(&mut self, action: Action) -> Transition {
        self.send(Payload::Action(action)).await
    }

    fn state(&self) -> Option<ConversationState> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Walks the student form from the menu up to the review screen.
    async fn fill_student_form(&mut self, name: &str, slot: &str) -> Transition {
        self.text(MenuEntry::RegisterStudent.as_ref()).await;
        for input in [
            name,
            "2005-01-15",
            "الرابع",
            "أ",
            slot,
            "0770",
            "0780",
            "متوسطة المجتبى",
            "لا يوجد",
            "حي الجامعة",
        ] {
            self.text(input).await;
        }
        for photo in ["p", "s", "f", "m"] {
            self.photo(photo).await;
        }
        self.text("ناجح").await;
        self.text("أول").await;
        self.text("2024-2025").await
    }
}

fn body(transition: &Transition) -> String {
    transition
        .replies()
        .map(Outbound::body)
        .collect::<Vec<_>>()
        .join("\n")
}

fn buttons(transition: &Transition) -> Vec<Action> {
    transition
        .replies()
        .flat_map(|reply| match reply {
            Outbound::Text {
                choices: Choices::Buttons(buttons),
                ..
            } => buttons.iter().map(|b| b.action).collect(),
            _ => Vec::new(),
        })
        .collect()
}

#[tokio::test]
async fn test_start_shows_menu_and_keeps_session() {
    let mut h = Harness::new();
    h.text(MenuEntry::SearchName.as_ref()).await;

    let t = h.text("/start").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert!(body(&t).contains("Ali"));
    match t.replies().next() {
        Some(Outbound::Text {
            choices: Choices::Keyboard(keys),
            ..
        }) => assert_eq!(keys.len(), 6),
        other => panic!("expected main menu, got {:?}", other),
    }
    assert_eq!(h.state(), Some(ConversationState::SearchName));
}

#[tokio::test]
async fn test_text_without_session_points_to_start() {
    let mut h = Harness::new();
    let t = h.text("hello").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert_eq!(body(&t), messages::USE_START);
}

#[tokio::test]
async fn test_closed_form_refuses_entry() {
    let mut h = Harness::new();
    h.settings.set("form_status", "closed").await.unwrap();

    let t = h.text(MenuEntry::RegisterStudent.as_ref()).await;
    assert_eq!(t.change, SessionChange::Clear);
    assert_eq!(body(&t), Form::Student.closed_notice());
    assert!(h.session.is_none());

    let t = h.press(Action::RegisterNew).await;
    assert_eq!(body(&t), Form::Student.closed_notice());
}

#[tokio::test]
async fn test_full_student_form_reaches_review_and_saves() {
    let mut h = Harness::new();
    let t = h.fill_student_form("Ali Hassan", "12").await;

    assert_eq!(h.state(), Some(ConversationState::review(Form::Student)));
    assert_eq!(
        buttons(&t),
        vec![
            Action::EditForm(Form::Student),
            Action::SubmitForm(Form::Student)
        ]
    );
    let fields = &h.session.as_ref().unwrap().fields;
    assert_eq!(fields.len(), 17);
    assert_eq!(
        fields.get(FieldKey::StudentNumber),
        Some(&FieldValue::Integer(12))
    );
    assert_eq!(
        fields.get(FieldKey::FatherCardPhotoPath),
        Some(&FieldValue::Asset("father_cards/f.jpg".to_string()))
    );

    let t = h.press(Action::SubmitForm(Form::Student)).await;
    assert_eq!(t.change, SessionChange::Clear);
    assert_eq!(body(&t), messages::STUDENT_SAVED);
    let rows = h.students.list_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].identity, Some(ME));
}

#[tokio::test]
async fn test_invalid_inputs_keep_state() {
    let mut h = Harness::new();
    h.text(MenuEntry::RegisterStudent.as_ref()).await;
    h.text("Ali Hassan").await;

    let t = h.text("15/01/2005").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert!(body(&t).contains("YYYY-MM-DD"));

    h.text("2005-01-15").await;
    let t = h.text("السابع").await;
    assert_eq!(t.change, SessionChange::Keep);
    match t.replies().next() {
        Some(Outbound::Text {
            choices: Choices::Keyboard(keys),
            ..
        }) => assert_eq!(keys.len(), 3),
        other => panic!("expected grade keyboard, got {:?}", other),
    }
    assert_eq!(
        h.state(),
        Some(ConversationState::collect(Form::Student, FieldKey::Grade))
    );
}

#[tokio::test]
async fn test_taken_slot_is_rejected() {
    let mut h = Harness::new();
    h.students.push(
        Some(7),
        [
            (FieldKey::FullName, FieldValue::text("Omar")),
            (FieldKey::StudentNumber, FieldValue::Integer(12)),
        ]
        .into_iter()
        .collect(),
        true,
    );
    h.text(MenuEntry::RegisterStudent.as_ref()).await;
    for input in ["Ali Hassan", "2005-01-15", "الرابع", "أ"] {
        h.text(input).await;
    }

    let t = h.text("12").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert_eq!(body(&t), crate::field::validator::SLOT_TAKEN);

    let t = h.text("13").await;
    assert!(matches!(t.change, SessionChange::Merge { .. }));
}

#[tokio::test]
async fn test_other_school_asks_for_name() {
    let mut h = Harness::new();
    h.text(MenuEntry::Admission.as_ref()).await;
    for input in ["Ali Hassan", "2005-01-15", "0770", "0780"] {
        h.text(input).await;
    }

    let t = h.text("أخرى").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert_eq!(body(&t), crate::field::validator::SCHOOL_NAME_PROMPT);

    h.text("متوسطة النور").await;
    assert_eq!(
        h.session.as_ref().unwrap().fields.get(FieldKey::MiddleSchool),
        Some(&FieldValue::text("متوسطة النور"))
    );
    assert_eq!(
        h.state(),
        Some(ConversationState::collect(
            Form::Admission,
            FieldKey::LocationLink
        ))
    );
}

#[tokio::test]
async fn test_text_for_photo_field_is_rejected() {
    let mut h = Harness::new();
    h.session = Some(Session::new(
        ME,
        ConversationState::collect(Form::Student, FieldKey::PersonalPhotoPath),
    ));
    let t = h.text("no photo").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert!(body(&t).starts_with("لم يتم استلام صورة."));
}

#[tokio::test]
async fn test_edit_accepts_any_value_verbatim() {
    let mut h = Harness::new();
    h.fill_student_form("Ali Hassan", "12").await;

    let t = h.press(Action::EditForm(Form::Student)).await;
    assert!(body(&t).contains("student_number"));

    let t = h.text("نسيت").await;
    assert_eq!(t.change, SessionChange::Keep);
    assert_eq!(body(&t), messages::UNKNOWN_FIELD);

    h.text("grade").await;
    let t = h.text("السابع ").await;
    assert_eq!(h.state(), Some(ConversationState::review(Form::Student)));
    assert!(body(&t).contains("الصف: السابع "));
    assert_eq!(
        h.session.as_ref().unwrap().fields.get(FieldKey::Grade),
        Some(&FieldValue::text("السابع "))
    );
    assert_eq!(
        buttons(&t),
        vec![
            Action::EditForm(Form::Student),
            Action::SubmitForm(Form::Student)
        ]
    );
}

#[tokio::test]
async fn test_review_buttons_expire_without_matching_session() {
    let mut h = Harness::new();
    let t = h.press(Action::SubmitForm(Form::Student)).await;
    assert_eq!(t.change, SessionChange::Keep);
    assert_eq!(body(&t), messages::ACTION_EXPIRED);

    h.text(MenuEntry::RegisterStudent.as_ref()).await;
    let t = h.press(Action::EditForm(Form::Student)).await;
    assert_eq!(body(&t), messages::ACTION_EXPIRED);
    assert_eq!(
        h.state(),
        Some(ConversationState::collect(Form::Student, FieldKey::FullName))
    );
}

#[tokio::test]
async fn test_admission_submit_files_application() {
    let mut h = Harness::new();
    h.text(MenuEntry::Admission.as_ref()).await;
    for input in [
        "Ali Hassan",
        "2008-03-01",
        "0770",
        "0780",
        "متوسطة الصناديد",
        "لا يوجد",
        "حي الجامعة",
    ] {
        h.text(input).await;
    }
    for photo in ["p", "s", "f"] {
        h.photo(photo).await;
    }
    let t = h.photo("m").await;
    assert_eq!(h.state(), Some(ConversationState::review(Form::Admission)));
    assert!(body(&t).contains("admission_mother_cards/m.jpg"));

    let t = h.press(Action::SubmitForm(Form::Admission)).await;
    assert_eq!(body(&t), messages::ADMISSION_SAVED);
    assert!(h.session.is_none());
    assert_eq!(h.admissions.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_resumes_shell_and_claims_it() {
    let mut h = Harness::new();
    h.students.insert_shell("Ali Hassan").await.unwrap();

    h.text(MenuEntry::SearchName.as_ref()).await;
    let t = h.text("Ali Hassan").await;
    assert!(body(&t).contains("Ali Hassan"));
    let session = h.session.clone().unwrap();
    assert_eq!(
        session.state,
        ConversationState::collect(Form::Student, FieldKey::Dob)
    );
    assert_eq!(
        session.origin,
        Some(RecordOrigin {
            record_id: 1,
            linked: false
        })
    );

    for input in [
        "2005-01-15",
        "الرابع",
        "أ",
        "12",
        "0770",
        "0780",
        "متوسطة المجتبى",
        "لا يوجد",
        "حي الجامعة",
    ] {
        h.text(input).await;
    }
    for photo in ["p", "s", "f", "m"] {
        h.photo(photo).await;
    }
    for input in ["ناجح", "أول", "2024-2025"] {
        h.text(input).await;
    }
    let t = h.press(Action::SubmitForm(Form::Student)).await;
    assert_eq!(body(&t), messages::STUDENT_UPDATED);

    let rows = h.students.list_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].identity, Some(ME));
    assert!(rows[0].is_complete());
}

#[tokio::test]
async fn test_search_outcomes() {
    let mut h = Harness::new();
    h.text(MenuEntry::SearchName.as_ref()).await;
    let t = h.text("Nobody").await;
    assert_eq!(t.change, SessionChange::Clear);
    assert_eq!(buttons(&t), vec![Action::RegisterNew]);

    let complete: FieldMap = Form::Student
        .sequence()
        .iter()
        .map(|k| (*k, FieldValue::text("x")))
        .chain([(FieldKey::FullName, FieldValue::text("Zaid"))])
        .collect();
    let id = h.students.push(Some(ME.0), complete, true);

    h.text(MenuEntry::SearchName.as_ref()).await;
    let t = h.text("Zaid").await;
    assert_eq!(t.change, SessionChange::Clear);
    assert_eq!(buttons(&t), vec![Action::EditRecord(id)]);

    h.students.toggle_view_permission("Zaid").await.unwrap();
    h.text(MenuEntry::SearchName.as_ref()).await;
    let t = h.text("Zaid").await;
    assert_eq!(body(&t), messages::VIEW_DENIED);
    assert!(buttons(&t).is_empty());
}

#[tokio::test]
async fn test_edit_record_updates_in_place() {
    let mut h = Harness::new();
    let complete: FieldMap = Form::Student
        .sequence()
        .iter()
        .map(|k| (*k, FieldValue::text("x")))
        .chain([(FieldKey::FullName, FieldValue::text("Zaid"))])
        .collect();
    let id = h.students.push(Some(ME.0), complete, true);

    h.press(Action::EditRecord(id)).await;
    assert_eq!(
        h.state(),
        Some(ConversationState::Form {
            form: Form::Student,
            phase: Phase::EditField
        })
    );
    h.text("address_description").await;
    h.text("حي الزهراء").await;
    let t = h.press(Action::SubmitForm(Form::Student)).await;
    assert_eq!(body(&t), messages::STUDENT_UPDATED);

    let row = h.students.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(
        row.fields.get(FieldKey::AddressDescription),
        Some(&FieldValue::text("حي الزهراء"))
    );
    assert_eq!(h.students.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_record_of_another_identity_is_read_only() {
    let mut h = Harness::new();
    let complete: FieldMap = Form::Student
        .sequence()
        .iter()
        .map(|k| (*k, FieldValue::text("x")))
        .chain([(FieldKey::FullName, FieldValue::text("Zaid"))])
        .collect();
    let id = h.students.push(Some(5), complete, true);
    let partial: FieldMap = [(FieldKey::FullName, FieldValue::text("Omar"))]
        .into_iter()
        .collect();
    h.students.push(Some(6), partial, true);

    // Viewable, but without the edit action
    h.text(MenuEntry::SearchName.as_ref()).await;
    let t = h.text("Zaid").await;
    assert_eq!(t.change, SessionChange::Clear);
    assert!(buttons(&t).is_empty());
    assert!(body(&t).contains("Zaid"));

    // A stale or forged button press is refused
    let t = h.press(Action::EditRecord(id)).await;
    assert_eq!(t.change, SessionChange::Clear);
    assert_eq!(body(&t), messages::RECORD_OWNED_ELSEWHERE);
    assert!(h.session.is_none());

    // Linked but incomplete records are not resumed by others either
    h.text(MenuEntry::SearchName.as_ref()).await;
    let t = h.text("Omar").await;
    assert_eq!(body(&t), messages::RECORD_OWNED_ELSEWHERE);
    assert!(h.session.is_none());

    let owners: Vec<_> = h
        .students
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.identity)
        .collect();
    assert_eq!(owners, vec![Some(SubjectId(5)), Some(SubjectId(6))]);
}

#[tokio::test]
async fn test_contact_admin_relays_and_clears() {
    let mut h = Harness::new();
    h.text(MenuEntry::ContactAdmin.as_ref()).await;
    let t = h.text("hello").await;
    assert_eq!(t.change, SessionChange::Clear);
    match &t.effects[..] {
        [Effect::Relay { to, text }] => {
            assert_eq!(*to, SubjectId(1));
            assert!(text.contains("hello"));
            assert!(text.contains("100"));
        }
        other => panic!("expected relay, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_imports_supported_files() {
    let mut h = Harness::new();
    h.text(MenuEntry::UploadFile.as_ref()).await;
    let t = h
        .send(Payload::Document(Attachment::new(
            "doc",
            Some("names.pdf".into()),
        )))
        .await;
    assert_eq!(body(&t), messages::UPLOAD_UNSUPPORTED);
    assert!(h.session.is_none());

    h.text(MenuEntry::UploadFile.as_ref()).await;
    let t = h
        .send(Payload::Document(Attachment::new(
            "doc",
            Some("names.txt".into()),
        )))
        .await;
    assert_eq!(t.change, SessionChange::Clear);
    assert!(body(&t).contains("2 أسماء جديدة"));
}

#[tokio::test]
async fn test_admin_password_and_menu() {
    let mut h = Harness::new();
    h.text(MenuEntry::Supervisor.as_ref()).await;
    let t = h.text("0000").await;
    assert_eq!(t.change, SessionChange::Clear);
    assert_eq!(body(&t), messages::PASSWORD_REJECTED);

    h.text(MenuEntry::Supervisor.as_ref()).await;
    h.text("1526").await;
    assert_eq!(h.state(), Some(ConversationState::Admin(AdminState::Menu)));

    let t = h.text(AdminEntry::ToggleForm.as_ref()).await;
    assert!(body(&t).contains("إغلاق"));
    assert_eq!(
        h.settings.form_status.lock().unwrap().as_deref(),
        Some("closed")
    );

    let t = h.text(AdminEntry::Export.as_ref()).await;
    assert!(matches!(
        t.replies().next(),
        Some(Outbound::Document { .. })
    ));

    h.students.insert_shell("Ali Hassan").await.unwrap();
    h.text(AdminEntry::ToggleViewPermission.as_ref()).await;
    let t = h.text("Ali Hassan").await;
    assert_eq!(t.change, SessionChange::Clear);
    assert!(body(&t).contains("منع"));
}

#[tokio::test]
async fn test_supervisor_management() {
    let mut h = Harness::new();
    h.text(MenuEntry::Supervisor.as_ref()).await;
    h.text("1526").await;
    h.text(AdminEntry::Supervisors.as_ref()).await;
    h.text(SupervisorEntry::Add.as_ref()).await;

    let t = h.text("abc").await;
    assert_eq!(body(&t), messages::SUPERVISOR_ID_INVALID);

    h.text("42").await;
    h.text("لا يوجد").await;
    h.text("Sara Ahmed").await;
    let t = h.text("pw").await;
    assert!(body(&t).contains("Sara Ahmed"));
    assert_eq!(
        h.state(),
        Some(ConversationState::Admin(AdminState::Supervisors))
    );

    let stored = h.supervisors.list_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].identity, SubjectId(42));
    assert_eq!(stored[0].username, None);

    h.text(SupervisorEntry::Remove.as_ref()).await;
    h.text("42").await;
    assert!(h.supervisors.list_all().await.unwrap().is_empty());

    let t = h.text(SupervisorEntry::Back.as_ref()).await;
    assert_eq!(body(&t), messages::ADMIN_RETURNED);
    assert_eq!(h.state(), Some(ConversationState::Admin(AdminState::Menu)));
}

#[tokio::test]
async fn test_menu_entry_restarts_with_fresh_session() {
    let mut h = Harness::new();
    h.fill_student_form("Ali Hassan", "12").await;

    h.text(MenuEntry::Admission.as_ref()).await;
    let session = h.session.clone().unwrap();
    assert!(session.fields.is_empty());
    assert_eq!(
        session.state,
        ConversationState::collect(Form::Admission, FieldKey::FullName)
    );
}
