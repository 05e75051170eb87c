//! Form fields: the closed key set, accumulated values, and validation.
//!
//! # Module Structure
//!
//! - `key`: `FieldKey` and the fixed option lists
//! - `map`: `FieldValue` and `FieldMap`
//! - `validator`: `validate` and its outcomes

mod key;
mod map;
pub mod validator;

pub use key::{
    FieldKey, FieldKind, GRADES, MIDDLE_SCHOOLS, OTHER_SCHOOL, ROLES, SECTIONS, SLOT_RANGE,
    STATUSES,
};
pub use map::{FieldMap, FieldValue};
pub use validator::{RawInput, Rejection, Verdict, validate};
