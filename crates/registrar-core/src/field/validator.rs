//! Per-field input validation.
//!
//! Validation is pure: it never touches the store or the asset collaborator.
//! Two checks are therefore left to the caller, signalled through [`Verdict`]:
//! the slot collision check and the download of an accepted attachment.

use chrono::NaiveDate;

use super::key::{FieldKey, FieldKind, OTHER_SCHOOL, SLOT_RANGE};
use super::map::FieldValue;
use crate::transport::Attachment;

/// Raw input as received from the transport.
#[derive(Debug, Clone, Copy)]
pub enum RawInput<'a> {
    Text(&'a str),
    Attachment(&'a Attachment),
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value may be stored as is.
    Accept(FieldValue),
    /// The attachment must be handed to the asset store; its path is the value.
    Store(Attachment),
    /// "Other" was picked for the middle school; ask for the name as free text.
    AskSchoolName,
}

/// A rejected input together with the re-prompt to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub field: FieldKey,
    pub reason: String,
}

impl Rejection {
    fn new(field: FieldKey, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub const DATE_REJECTED: &str =
    "صيغة تاريخ الميلاد غير صحيحة. يرجى استخدام الصيغة YYYY-MM-DD (مثال: 2005-01-15):";
pub const SLOT_NOT_A_NUMBER: &str = "الرقم غير صحيح. يرجى إدخال رقم:";
pub const SLOT_OUT_OF_RANGE: &str = "الرقم يجب أن يكون بين 1 و 1000. يرجى إدخال رقم صحيح:";
pub const SLOT_TAKEN: &str = "هذا الرقم مستخدم بالفعل. يرجى إدخال رقم آخر:";
pub const SCHOOL_NAME_PROMPT: &str = "يرجى إدخال اسم المدرسة المتوسطة:";

fn choice_rejected(field: FieldKey) -> &'static str {
    match field {
        FieldKey::Grade => "الصف غير صحيح. يرجى الاختيار من (الرابع، الخامس، السادس):",
        FieldKey::Section => "الشعبة غير صحيحة. يرجى الاختيار من (أ، ب، ج، د، هـ):",
        FieldKey::Status => "الحالة غير صحيحة. يرجى الاختيار من (ناجح، راسب، مكمل):",
        _ => "الدور غير صحيح. يرجى الاختيار من (أول، ثاني، ثالث):",
    }
}

/// Validates `input` for `field`.
pub fn validate(field: FieldKey, input: RawInput<'_>) -> Result<Verdict, Rejection> {
    let kind = field.kind();

    let text = match (kind, input) {
        (FieldKind::Image, RawInput::Attachment(attachment)) => {
            return Ok(Verdict::Store(attachment.clone()));
        }
        (FieldKind::Image, RawInput::Text(_)) => {
            return Err(Rejection::new(
                field,
                format!("لم يتم استلام صورة. {}", field.prompt()),
            ));
        }
        (_, RawInput::Attachment(_)) => {
            return Err(Rejection::new(
                field,
                format!("يرجى إرسال نص. {}", field.prompt()),
            ));
        }
        (_, RawInput::Text(text)) => text.trim(),
    };

    match kind {
        FieldKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|_| Verdict::Accept(FieldValue::text(text)))
            .map_err(|_| Rejection::new(field, DATE_REJECTED)),
        FieldKind::Choice(options) => {
            if options.iter().any(|option| *option == text) {
                Ok(Verdict::Accept(FieldValue::text(text)))
            } else {
                Err(Rejection::new(field, choice_rejected(field)))
            }
        }
        FieldKind::Slot => {
            let number: i64 = text
                .parse()
                .map_err(|_| Rejection::new(field, SLOT_NOT_A_NUMBER))?;
            if SLOT_RANGE.contains(&number) {
                Ok(Verdict::Accept(FieldValue::Integer(number)))
            } else {
                Err(Rejection::new(field, SLOT_OUT_OF_RANGE))
            }
        }
        FieldKind::School if text == OTHER_SCHOOL => Ok(Verdict::AskSchoolName),
        FieldKind::School | FieldKind::FreeText => Ok(Verdict::Accept(FieldValue::text(text))),
        FieldKind::Image => Err(Rejection::new(field, field.prompt())),
    }
}
