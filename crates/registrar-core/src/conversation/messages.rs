//! User-facing texts that are not tied to a single field or form.

use crate::field::FieldMap;
use crate::record::StudentStatistics;

use super::form::Form;

pub const USE_START: &str = "يرجى استخدام الأمر /start لعرض القائمة الرئيسية.";
pub const UNEXPECTED_ERROR: &str = "حدث خطأ غير متوقع. يرجى المحاولة مرة أخرى.";
pub const ACTION_EXPIRED: &str = "انتهت صلاحية هذا الخيار. يرجى البدء من جديد عبر القائمة الرئيسية.";
pub const REVIEW_PENDING: &str = "يرجى استخدام الأزرار أدناه لتعديل بياناتك أو تأكيدها.";
pub const TEXT_EXPECTED: &str = "يرجى إرسال نص.";

pub const EDIT_BUTTON: &str = "تعديل قبل الإرسال";
pub const SUBMIT_BUTTON: &str = "تأكيد وإرسال";
pub const FIELD_UPDATED: &str = "تم تحديث الحقل. يرجى مراجعة بياناتك مرة أخرى:";
pub const UNKNOWN_FIELD: &str =
    "هذا الحقل غير موجود أو لا يمكن تعديله حاليًا. يرجى إدخال اسم حقل صحيح.";
pub const UPLOAD_FAILED: &str = "حدث خطأ أثناء تحميل الصورة. يرجى المحاولة مرة أخرى.";

pub const STUDENT_SAVED: &str = "تم حفظ بياناتك بنجاح! سيتم مراجعتها من قبل الإدارة.";
pub const STUDENT_UPDATED: &str = "تم تحديث بياناتك بنجاح!";
pub const ADMISSION_SAVED: &str = "تم إرسال طلب التقديم بنجاح! سيتم مراجعته من قبل الإدارة.";

pub const SEARCH_PROMPT: &str = "يرجى إدخال الاسم الرباعي للبحث عنه:";
pub const SEARCH_MISS: &str = "لم يتم العثور على اسمك. هل ترغب في تسجيل جديد؟";
pub const REGISTER_BUTTON: &str = "تسجيل جديد";
pub const VIEW_DENIED: &str = "عذراً، لا يمكنك عرض بياناتك حالياً. يرجى التواصل مع الإدارة.";
pub const EDIT_RECORD_BUTTON: &str = "تعديل بياناتي";
pub const RECORD_MISSING: &str = "لم يتم العثور على بيانات الطالب.";
pub const RECORD_OWNED_ELSEWHERE: &str =
    "هذه البيانات مرتبطة بحساب آخر. يرجى التواصل مع الإدارة إذا كانت تخصك.";

pub const CONTACT_PROMPT: &str = "يرجى كتابة رسالتك للإدارة:";
pub const CONTACT_SENT: &str = "تم إرسال رسالتك إلى الإدارة بنجاح.";
pub const CONTACT_UNAVAILABLE: &str = "عذراً، لم يتم تحديد حساب الإدارة بعد.";

pub const UPLOAD_PROMPT: &str =
    "يرجى إرسال ملف CSV (.csv) أو ملف نصي (.txt) يحتوي على أسماء الطلاب.";
pub const UPLOAD_UNSUPPORTED: &str =
    "صيغة الملف غير مدعومة. يرجى إرسال ملف CSV (.csv) أو ملف نصي (.txt).";

pub const PASSWORD_PROMPT: &str = "يرجى إدخال كلمة مرور المشرف:";
pub const PASSWORD_REJECTED: &str = "كلمة المرور غير صحيحة. يرجى المحاولة مرة أخرى.";
pub const ADMIN_WELCOME: &str = "مرحباً بك أيها المشرف!";
pub const ADMIN_CHOOSE: &str = "يرجى الاختيار من قائمة المشرف.";
pub const ADMIN_RETURNED: &str = "تم العودة إلى قائمة المشرف.";
pub const EXPORT_DONE: &str = "تم تصدير بيانات الطلاب بنجاح.";
pub const EXPORT_EMPTY: &str = "لا توجد بيانات لتصديرها.";
pub const TOGGLE_VIEW_PROMPT: &str =
    "يرجى إدخال الاسم الرباعي للطالب لتغيير صلاحية عرض البيانات:";
pub const SUPERVISOR_MENU: &str = "خيارات إدارة المشرفين:";
pub const SUPERVISOR_ID_PROMPT: &str = "يرجى إدخال Telegram ID للمشرف الجديد:";
pub const SUPERVISOR_USERNAME_PROMPT: &str =
    "يرجى إدخال اسم المستخدم (username) للمشرف الجديد (اختياري، اكتب \"لا يوجد\" إذا لم يكن هناك):";
pub const SUPERVISOR_NAME_PROMPT: &str = "يرجى إدخال الاسم الكامل للمشرف الجديد:";
pub const SUPERVISOR_PASSWORD_PROMPT: &str = "يرجى إدخال كلمة المرور للمشرف الجديد:";
pub const SUPERVISOR_ADD_FAILED: &str =
    "حدث خطأ أثناء إضافة المشرف. قد يكون Telegram ID مستخدمًا بالفعل.";
pub const SUPERVISOR_REMOVE_PROMPT: &str = "يرجى إدخال Telegram ID للمشرف الذي تود حذفه:";
pub const SUPERVISOR_ID_INVALID: &str = "Telegram ID غير صحيح. يرجى إدخال رقم صحيح.";
pub const SUPERVISOR_NOT_FOUND: &str = "لم يتم العثور على المشرف.";
pub const SUPERVISORS_EMPTY: &str = "لا يوجد مشرفين حالياً.";
pub const NO_USERNAME: &str = "لا يوجد";

const UNSET: &str = "غير محدد";

pub fn greeting(display_name: &str) -> String {
    format!(
        "مرحباً بك يا {}! أنا بوت إدارة بيانات الطلاب لإعدادية المنتظر للبنين. كيف يمكنني مساعدتك اليوم؟",
        display_name
    )
}

/// One `label: value` line per field of `form`, `-` for unset fields.
pub fn render_fields(form: Form, fields: &FieldMap) -> String {
    form.sequence()
        .iter()
        .map(|key| {
            let value = fields
                .get(*key)
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            format!("{}: {}", key.label(), value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn review_heading(form: Form) -> &'static str {
    match form {
        Form::Student => "يرجى مراجعة بياناتك:",
        Form::Admission => "يرجى مراجعة بيانات طلب التقديم:",
    }
}

/// Edit prompt listing the keys the user may type.
pub fn edit_field_prompt(fields: &FieldMap) -> String {
    let keys = fields
        .keys()
        .map(|key| format!("{} ({})", key, key.label()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "ما هو الحقل الذي تود تعديله؟ أرسل اسم الحقل كما هو مكتوب:\n{}",
        keys
    )
}

pub fn edit_value_prompt(key: &str) -> String {
    format!("يرجى إدخال القيمة الجديدة للحقل \"{}\":", key)
}

pub fn commit_failed(reason: &str) -> String {
    format!("حدث خطأ أثناء حفظ البيانات: {}. يرجى المحاولة مرة أخرى.", reason)
}

pub fn resume_found(full_name: &str) -> String {
    format!(
        "تم العثور على اسمك: {}. يرجى استكمال بياناتك.\n{}",
        full_name,
        crate::field::FieldKey::Dob.prompt()
    )
}

pub fn record_found(rendered: &str) -> String {
    format!("تم العثور على بياناتك:\n{}", rendered)
}

pub fn relayed(display_name: &str, subject: impl std::fmt::Display, text: &str) -> String {
    format!("رسالة من: {} (ID: {})\n{}", display_name, subject, text)
}

pub fn relay_failed(reason: &str) -> String {
    format!("حدث خطأ أثناء إرسال رسالتك: {}", reason)
}

pub fn file_received(file_name: &str) -> String {
    format!("تم استلام الملف: {}. جاري معالجة البيانات...", file_name)
}

pub fn import_done(inserted: usize, skipped: usize) -> String {
    format!(
        "تمت معالجة الملف بنجاح. ({} أسماء جديدة، {} موجودة مسبقاً)",
        inserted, skipped
    )
}

pub fn import_failed(reason: &str) -> String {
    format!("حدث خطأ أثناء معالجة الملف: {}", reason)
}

pub fn form_toggled(verb: &str) -> String {
    format!("تم {} استمارة التقديم بنجاح.", verb)
}

pub fn view_toggled(full_name: &str, allowed: bool) -> String {
    let verb = if allowed { "السماح" } else { "منع" };
    format!("تم {} للطالب {} بعرض بياناته.", verb, full_name)
}

pub fn student_not_found(full_name: &str) -> String {
    format!("لم يتم العثور على الطالب {}.", full_name)
}

pub fn supervisor_added(full_name: &str) -> String {
    format!("تم إضافة المشرف {} بنجاح.", full_name)
}

pub fn supervisor_removed(identity: i64) -> String {
    format!("تم حذف المشرف {} بنجاح.", identity)
}

pub fn statistics(stats: &StudentStatistics) -> String {
    let group = |rows: &[(Option<String>, u64)]| {
        rows.iter()
            .map(|(name, count)| format!("  {}: {}", name.as_deref().unwrap_or(UNSET), count))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "إحصائيات الطلاب:\nالعدد الكلي للطلاب: {}\nالطلاب حسب الصف:\n{}\nالطلاب حسب الشعبة:\n{}",
        stats.total,
        group(&stats.by_grade),
        group(&stats.by_section)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKey, FieldValue};

    #[test]
    fn test_render_marks_missing_fields() {
        let mut fields = FieldMap::new();
        fields.set(FieldKey::FullName, FieldValue::text("Ali Hassan"));
        fields.set(FieldKey::StudentNumber, FieldValue::Integer(7));

        let rendered = render_fields(Form::Student, &fields);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], "الاسم الرباعي: Ali Hassan");
        assert_eq!(lines[1], "تاريخ الميلاد: -");
        assert_eq!(lines[4], "الرقم: 7");
    }

    #[test]
    fn test_edit_prompt_lists_present_keys() {
        let fields: FieldMap = [
            (FieldKey::FullName, FieldValue::text("a")),
            (FieldKey::Grade, FieldValue::text("الرابع")),
        ]
        .into_iter()
        .collect();
        let prompt = edit_field_prompt(&fields);
        assert!(prompt.contains("full_name"));
        assert!(prompt.contains("grade"));
        assert!(!prompt.contains("dob"));
    }

    #[test]
    fn test_statistics_names_unset_groups() {
        let stats = StudentStatistics {
            total: 3,
            by_grade: vec![(Some("الرابع".into()), 2), (None, 1)],
            by_section: vec![],
        };
        let text = statistics(&stats);
        assert!(text.contains("العدد الكلي للطلاب: 3"));
        assert!(text.contains("الرابع: 2"));
        assert!(text.contains("غير محدد: 1"));
    }
}
