//! Return reconciliation: fine assessment and the loan/return/stock state machine

pub mod fines;
pub mod lifecycle;

pub use fines::{FineBreakdown, FineSchedule};
pub use lifecycle::{plan_approval, plan_confirm, plan_submit, ConfirmPlan, StockChange};
