//! Password-gated document access: list, challenge, tokens and viewing

pub mod access;
pub mod list;
pub mod tokens;
pub mod viewer;

pub use access::{DocumentAccess, DocumentError, PasswordChallenge, ViewOutcome};
pub use list::DocumentList;
pub use tokens::TokenCache;
pub use viewer::{FileViewer, OpenedFile, TempFileViewer};
