//! Data models for Lendable

pub mod activity_log;
pub mod enums;
pub mod equipment;
pub mod loan;
pub mod return_record;
pub mod user;

// Re-export commonly used types
pub use activity_log::ActivityLog;
pub use enums::{Condition, EquipmentStatus, LoanStatus, ReturnStatus, Role};
pub use equipment::Equipment;
pub use loan::{Loan, LoanDetails};
pub use return_record::ReturnRecord;
pub use user::{Actor, User, UserClaims};
