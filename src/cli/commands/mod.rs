pub mod case;
pub mod documents;
pub mod nav;
pub mod session;
