//! Reply-keyboard menus. Each entry's string form is the button label.

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Main menu, honoured from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
pub enum MenuEntry {
    #[strum(serialize = "تسجيل طالب جديد")]
    RegisterStudent,
    #[strum(serialize = "البحث عن اسمي")]
    SearchName,
    #[strum(serialize = "طلب تقديم إلى إعدادية المنتظر للبنين")]
    Admission,
    #[strum(serialize = "تواصل مع الإدارة")]
    ContactAdmin,
    #[strum(serialize = "رفع ملف بيانات")]
    UploadFile,
    #[strum(serialize = "مشرف")]
    Supervisor,
}

/// Admin main menu, honoured after a correct password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
pub enum AdminEntry {
    #[strum(serialize = "عرض إحصائيات الطلاب")]
    Statistics,
    #[strum(serialize = "تصدير بيانات الطلاب")]
    Export,
    #[strum(serialize = "إغلاق/فتح استمارة التقديم")]
    ToggleForm,
    #[strum(serialize = "السماح/منع عرض بيانات الطلاب")]
    ToggleViewPermission,
    #[strum(serialize = "إدارة المشرفين")]
    Supervisors,
    #[strum(serialize = "العودة للقائمة الرئيسية")]
    Back,
}

/// Supervisor management submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
pub enum SupervisorEntry {
    #[strum(serialize = "إضافة مشرف")]
    Add,
    #[strum(serialize = "حذف مشرف")]
    Remove,
    #[strum(serialize = "عرض المشرفين")]
    List,
    #[strum(serialize = "العودة لقائمة المشرف")]
    Back,
}

/// Button labels of a menu, in declaration order.
pub fn keyboard<E>() -> Vec<String>
where
    E: IntoEnumIterator + AsRef<str>,
{
    E::iter().map(|entry| entry.as_ref().to_string()).collect()
}
