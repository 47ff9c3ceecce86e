pub mod client;
pub mod format;
pub mod traits;

pub use client::ApiClient;
pub use traits::{CaseApi, DocumentApi, PasswordVerification, SessionApi};
