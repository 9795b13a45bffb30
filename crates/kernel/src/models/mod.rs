//! Database models.

pub mod editable_content;
pub mod user;

pub use editable_content::{DEFAULT_ELEMENT_TYPE, EditableFragment, NewFragment, UpsertStatus};
pub use user::{CreateUser, ROLE_ADMIN, ROLE_USER, User};
