//! The closed set of form fields.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Accepted grades.
pub const GRADES: &[&str] = &["الرابع", "الخامس", "السادس"];

/// Accepted sections.
pub const SECTIONS: &[&str] = &["أ", "ب", "ج", "د", "هـ"];

/// Accepted student statuses.
pub const STATUSES: &[&str] = &["ناجح", "راسب", "مكمل"];

/// Accepted examination rounds.
pub const ROLES: &[&str] = &["أول", "ثاني", "ثالث"];

/// Middle schools offered as buttons.
pub const MIDDLE_SCHOOLS: &[&str] = &["متوسطة المجتبى", "متوسطة الصناديد"];

/// The middle-school choice that asks for a typed school name instead.
pub const OTHER_SCHOOL: &str = "أخرى";

/// Lower and upper bound of the numeric student slot, inclusive.
pub const SLOT_RANGE: std::ops::RangeInclusive<i64> = 1..=1000;

/// A field of the student or admission form.
///
/// The string form (`as_ref`, `FromStr`) is the internal key used for storage
/// columns and for the edit sub-protocol, e.g. `student_number`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKey {
    FullName,
    Dob,
    Grade,
    Section,
    StudentNumber,
    PhoneNumber,
    ParentPhoneNumber,
    MiddleSchool,
    LocationLink,
    AddressDescription,
    PersonalPhotoPath,
    StudentCardPhotoPath,
    FatherCardPhotoPath,
    MotherCardPhotoPath,
    Status,
    Role,
    AcademicYear,
}

/// How a field's raw input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text, no further constraint.
    FreeText,
    /// ISO calendar date.
    Date,
    /// One of a fixed list.
    Choice(&'static [&'static str]),
    /// Integer in [`SLOT_RANGE`], unique across records.
    Slot,
    /// A school button, or "other" followed by free text.
    School,
    /// An uploaded photo.
    Image,
}

impl FieldKey {
    pub fn kind(self) -> FieldKind {
        match self {
            FieldKey::Dob => FieldKind::Date,
            FieldKey::Grade => FieldKind::Choice(GRADES),
            FieldKey::Section => FieldKind::Choice(SECTIONS),
            FieldKey::Status => FieldKind::Choice(STATUSES),
            FieldKey::Role => FieldKind::Choice(ROLES),
            FieldKey::StudentNumber => FieldKind::Slot,
            FieldKey::MiddleSchool => FieldKind::School,
            FieldKey::PersonalPhotoPath
            | FieldKey::StudentCardPhotoPath
            | FieldKey::FatherCardPhotoPath
            | FieldKey::MotherCardPhotoPath => FieldKind::Image,
            FieldKey::FullName
            | FieldKey::PhoneNumber
            | FieldKey::ParentPhoneNumber
            | FieldKey::LocationLink
            | FieldKey::AddressDescription
            | FieldKey::AcademicYear => FieldKind::FreeText,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self.kind(), FieldKind::Image)
    }

    /// Label shown next to the value on review screens.
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::FullName => "الاسم الرباعي",
            FieldKey::Dob => "تاريخ الميلاد",
            FieldKey::Grade => "الصف",
            FieldKey::Section => "الشعبة",
            FieldKey::StudentNumber => "الرقم",
            FieldKey::PhoneNumber => "رقم الهاتف",
            FieldKey::ParentPhoneNumber => "رقم هاتف ولي الأمر",
            FieldKey::MiddleSchool => "المدرسة المتوسطة",
            FieldKey::LocationLink => "رابط الموقع الجغرافي",
            FieldKey::AddressDescription => "وصف السكن",
            FieldKey::PersonalPhotoPath => "الصورة الشخصية",
            FieldKey::StudentCardPhotoPath => "صورة بطاقة الطالب",
            FieldKey::FatherCardPhotoPath => "صورة بطاقة الأب",
            FieldKey::MotherCardPhotoPath => "صورة بطاقة الأم",
            FieldKey::Status => "الحالة",
            FieldKey::Role => "الدور",
            FieldKey::AcademicYear => "العام الدراسي",
        }
    }

    /// Prompt sent when the conversation arrives at this field.
    pub fn prompt(self) -> &'static str {
        match self {
            FieldKey::FullName => "يرجى إدخال الاسم الرباعي:",
            FieldKey::Dob => "يرجى إدخال تاريخ الميلاد (مثال: 2005-01-15):",
            FieldKey::Grade => "يرجى إدخال الصف (الرابع، الخامس، السادس):",
            FieldKey::Section => "يرجى إدخال الشعبة (أ، ب، ج، د، هـ):",
            FieldKey::StudentNumber => "يرجى إدخال الرقم (من 1 إلى 1000):",
            FieldKey::PhoneNumber => "يرجى إدخال رقم هاتف الطالب:",
            FieldKey::ParentPhoneNumber => "يرجى إدخال رقم هاتف ولي الأمر:",
            FieldKey::MiddleSchool => "يرجى اختيار المدرسة المتوسطة التي تخرج منها الطالب:",
            FieldKey::LocationLink => "يرجى إرسال رابط الموقع الجغرافي أو اكتب \"لا يوجد\":",
            FieldKey::AddressDescription => "يرجى إدخال وصف السكن:",
            FieldKey::PersonalPhotoPath => {
                "يرجى إرسال صورة شخصية واضحة (مباشرة من الكاميرا أو من المعرض):"
            }
            FieldKey::StudentCardPhotoPath => "يرجى إرسال صورة بطاقة الطالب:",
            FieldKey::FatherCardPhotoPath => "يرجى إرسال صورة بطاقة الأب:",
            FieldKey::MotherCardPhotoPath => "يرجى إرسال صورة بطاقة الأم:",
            FieldKey::Status => "يرجى تحديد حالة الطالب:",
            FieldKey::Role => "يرجى تحديد الدور:",
            FieldKey::AcademicYear => "يرجى إدخال العام الدراسي (مثال: 2024-2025):",
        }
    }

    /// Buttons offered together with the prompt, if any.
    pub fn choices(self) -> Vec<String> {
        match self.kind() {
            FieldKind::Choice(options) => options.iter().map(|o| o.to_string()).collect(),
            FieldKind::School => MIDDLE_SCHOOLS
                .iter()
                .chain(std::iter::once(&OTHER_SCHOOL))
                .map(|o| o.to_string())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_internal_keys_are_snake_case() {
        assert_eq!(FieldKey::StudentNumber.as_ref(), "student_number");
        assert_eq!(FieldKey::PersonalPhotoPath.as_ref(), "personal_photo_path");
        assert_eq!(
            FieldKey::from_str("parent_phone_number").unwrap(),
            FieldKey::ParentPhoneNumber
        );
    }

    #[test]
    fn test_labels_are_not_keys() {
        // Users type internal keys in the edit prompt, never labels.
        assert!(FieldKey::from_str("الاسم الرباعي").is_err());
        assert_eq!(FieldKey::iter().count(), 17);
    }

    #[test]
    fn test_school_choices_end_with_other() {
        let choices = FieldKey::MiddleSchool.choices();
        assert_eq!(choices.len(), 3);
        assert_eq!(choices.last().map(String::as_str), Some(OTHER_SCHOOL));
        assert!(FieldKey::PhoneNumber.choices().is_empty());
    }
}
