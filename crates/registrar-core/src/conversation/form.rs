//! The two concrete forms and their linear field sequences.

use serde::{Deserialize, Serialize};

use crate::field::FieldKey;

const STUDENT_SEQUENCE: &[FieldKey] = &[
    FieldKey::FullName,
    FieldKey::Dob,
    FieldKey::Grade,
    FieldKey::Section,
    FieldKey::StudentNumber,
    FieldKey::PhoneNumber,
    FieldKey::ParentPhoneNumber,
    FieldKey::MiddleSchool,
    FieldKey::LocationLink,
    FieldKey::AddressDescription,
    FieldKey::PersonalPhotoPath,
    FieldKey::StudentCardPhotoPath,
    FieldKey::FatherCardPhotoPath,
    FieldKey::MotherCardPhotoPath,
    FieldKey::Status,
    FieldKey::Role,
    FieldKey::AcademicYear,
];

const ADMISSION_SEQUENCE: &[FieldKey] = &[
    FieldKey::FullName,
    FieldKey::Dob,
    FieldKey::PhoneNumber,
    FieldKey::ParentPhoneNumber,
    FieldKey::MiddleSchool,
    FieldKey::LocationLink,
    FieldKey::AddressDescription,
    FieldKey::PersonalPhotoPath,
    FieldKey::StudentCardPhotoPath,
    FieldKey::FatherCardPhotoPath,
    FieldKey::MotherCardPhotoPath,
];

/// Which form a conversation is filling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    Student,
    Admission,
}

impl Form {
    /// Fields in the order they are asked.
    pub fn sequence(self) -> &'static [FieldKey] {
        match self {
            Form::Student => STUDENT_SEQUENCE,
            Form::Admission => ADMISSION_SEQUENCE,
        }
    }

    /// The field asked after `key`, or `None` when `key` is the last one and
    /// the review screen follows.
    pub fn successor(self, key: FieldKey) -> Option<FieldKey> {
        let sequence = self.sequence();
        sequence
            .iter()
            .position(|k| *k == key)
            .and_then(|i| sequence.get(i + 1))
            .copied()
    }

    /// Fields that must be present for a stored record to count as complete.
    ///
    /// The name is excluded because a record always has one.
    pub fn required_fields(self) -> &'static [FieldKey] {
        &self.sequence()[1..]
    }

    /// Sub-folder of the asset store for an image field.
    pub fn asset_folder(self, key: FieldKey) -> &'static str {
        match (self, key) {
            (Form::Student, FieldKey::PersonalPhotoPath) => "personal",
            (Form::Student, FieldKey::StudentCardPhotoPath) => "student_cards",
            (Form::Student, FieldKey::MotherCardPhotoPath) => "mother_cards",
            (Form::Admission, FieldKey::PersonalPhotoPath) => "admission_personal",
            (Form::Admission, FieldKey::StudentCardPhotoPath) => "admission_student_cards",
            (Form::Admission, FieldKey::MotherCardPhotoPath) => "admission_mother_cards",
            // Both forms share the father card folder.
            (_, FieldKey::FatherCardPhotoPath) => "father_cards",
            _ => "misc",
        }
    }

    /// Greeting sent together with the first prompt.
    pub fn welcome(self) -> &'static str {
        match self {
            Form::Student => "أهلاً بك في استمارة تسجيل الطلاب. يرجى إدخال الاسم الرباعي:",
            Form::Admission => "أهلاً بك في استمارة طلب التقديم. يرجى إدخال الاسم الرباعي:",
        }
    }

    /// Notice sent when the form is closed.
    pub fn closed_notice(self) -> &'static str {
        match self {
            Form::Student => "عذراً، استمارة التسجيل مغلقة حالياً.",
            Form::Admission => "عذراً، استمارة التقديم مغلقة حالياً.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_sequence_has_seventeen_fields() {
        assert_eq!(Form::Student.sequence().len(), 17);
        assert_eq!(Form::Student.required_fields().len(), 16);
        assert_eq!(Form::Admission.sequence().len(), 11);
    }

    #[test]
    fn test_successors_follow_the_documented_order() {
        assert_eq!(
            Form::Student.successor(FieldKey::FullName),
            Some(FieldKey::Dob)
        );
        assert_eq!(
            Form::Student.successor(FieldKey::MotherCardPhotoPath),
            Some(FieldKey::Status)
        );
        assert_eq!(Form::Student.successor(FieldKey::AcademicYear), None);
        assert_eq!(
            Form::Admission.successor(FieldKey::Dob),
            Some(FieldKey::PhoneNumber)
        );
        assert_eq!(Form::Admission.successor(FieldKey::MotherCardPhotoPath), None);
    }

    #[test]
    fn test_admission_is_a_subset_of_student() {
        for key in Form::Admission.sequence() {
            assert!(Form::Student.sequence().contains(key));
        }
    }

    #[test]
    fn test_asset_folders() {
        assert_eq!(
            Form::Admission.asset_folder(FieldKey::PersonalPhotoPath),
            "admission_personal"
        );
        assert_eq!(
            Form::Admission.asset_folder(FieldKey::FatherCardPhotoPath),
            "father_cards"
        );
    }
}
