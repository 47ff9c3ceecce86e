//! Case stage display and disposition gating

pub mod lifecycle;
pub mod stage;
pub mod view;

pub use lifecycle::{available_actions, check_action, target_status, CaseAction, CaseActionError};
pub use stage::{stage_badge, stage_meta, stepper, StageMeta, Step, StepState, CASE_STAGES};
pub use view::{CaseView, PaymentSummary};
