//! Role-based permission checks.
//!
//! Every handler funnels its authorization decision through [`authorize`],
//! passing the action together with whatever resource state the rule needs
//! (for instance the owner of a loan).

use crate::{
    error::{AppError, AppResult},
    models::{Actor, Role},
};

/// Operation an actor attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewEquipment,
    ManageEquipment,
    RequestLoan,
    ViewLoan { owner_id: i32 },
    ListAllLoans,
    /// Approve, reject or hand over a loan
    ReviewLoan,
    SubmitReturn { loan_owner_id: i32 },
    ConfirmReturn,
    ListReturns,
    ViewReturn { loan_owner_id: i32 },
    ManageUsers,
    ViewActivityLog,
}

impl Action {
    fn denial(&self) -> &'static str {
        match self {
            Action::ViewEquipment => "Not allowed to view equipment",
            Action::ManageEquipment => "Administrator privileges required to manage equipment",
            Action::RequestLoan => "Only borrowers can request loans",
            Action::ViewLoan { .. } => "Loan does not belong to you",
            Action::ListAllLoans => "Staff privileges required to list all loans",
            Action::ReviewLoan => "Staff privileges required to process loans",
            Action::SubmitReturn { .. } => "Only the borrower of this loan can return it",
            Action::ConfirmReturn => "Staff privileges required to confirm returns",
            Action::ListReturns => "Staff privileges required to list returns",
            Action::ViewReturn { .. } => "Return does not belong to you",
            Action::ManageUsers => "Administrator privileges required to manage users",
            Action::ViewActivityLog => "Administrator privileges required to view activity logs",
        }
    }
}

/// Whether `actor` may perform `action`
pub fn is_allowed(actor: &Actor, action: &Action) -> bool {
    match *action {
        Action::ViewEquipment => true,
        Action::ManageEquipment | Action::ManageUsers | Action::ViewActivityLog => {
            actor.role == Role::Admin
        }
        Action::RequestLoan => actor.role == Role::Peminjam,
        Action::ViewLoan { owner_id } => actor.role.is_staff() || actor.id == owner_id,
        Action::ListAllLoans | Action::ReviewLoan => actor.role.is_staff(),
        Action::SubmitReturn { loan_owner_id } => {
            actor.role == Role::Peminjam && actor.id == loan_owner_id
        }
        Action::ConfirmReturn | Action::ListReturns => actor.role.is_staff(),
        Action::ViewReturn { loan_owner_id } => {
            actor.role.is_staff() || actor.id == loan_owner_id
        }
    }
}

/// Fails with `Forbidden` unless `actor` may perform `action`
pub fn authorize(actor: &Actor, action: &Action) -> AppResult<()> {
    if is_allowed(actor, action) {
        Ok(())
    } else {
        tracing::debug!(user_id = actor.id, role = %actor.role, ?action, "Permission denied");
        Err(AppError::Forbidden(action.denial().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Actor = Actor { id: 1, role: Role::Admin };
    const STAFF: Actor = Actor { id: 2, role: Role::Petugas };
    const BORROWER: Actor = Actor { id: 3, role: Role::Peminjam };
    const OTHER_BORROWER: Actor = Actor { id: 4, role: Role::Peminjam };

    #[test]
    fn test_admin_only_actions() {
        for action in [Action::ManageEquipment, Action::ManageUsers, Action::ViewActivityLog] {
            assert!(is_allowed(&ADMIN, &action));
            assert!(!is_allowed(&STAFF, &action));
            assert!(!is_allowed(&BORROWER, &action));
        }
    }

    #[test]
    fn test_staff_actions() {
        for action in [Action::ReviewLoan, Action::ConfirmReturn, Action::ListReturns, Action::ListAllLoans] {
            assert!(is_allowed(&ADMIN, &action));
            assert!(is_allowed(&STAFF, &action));
            assert!(!is_allowed(&BORROWER, &action));
        }
    }

    #[test]
    fn test_submit_return_requires_owning_borrower() {
        let action = Action::SubmitReturn { loan_owner_id: BORROWER.id };
        assert!(is_allowed(&BORROWER, &action));
        assert!(!is_allowed(&OTHER_BORROWER, &action));
        assert!(!is_allowed(&STAFF, &action));
        assert!(!is_allowed(&ADMIN, &action));
    }

    #[test]
    fn test_request_loan_is_for_borrowers() {
        assert!(is_allowed(&BORROWER, &Action::RequestLoan));
        assert!(!is_allowed(&STAFF, &Action::RequestLoan));
    }

    #[test]
    fn test_view_rules_use_ownership() {
        let loan = Action::ViewLoan { owner_id: BORROWER.id };
        assert!(is_allowed(&BORROWER, &loan));
        assert!(is_allowed(&STAFF, &loan));
        assert!(!is_allowed(&OTHER_BORROWER, &loan));

        let ret = Action::ViewReturn { loan_owner_id: BORROWER.id };
        assert!(is_allowed(&ADMIN, &ret));
        assert!(!is_allowed(&OTHER_BORROWER, &ret));
    }

    #[test]
    fn test_everyone_views_equipment() {
        for actor in [ADMIN, STAFF, BORROWER] {
            assert!(is_allowed(&actor, &Action::ViewEquipment));
        }
    }

    #[test]
    fn test_authorize_returns_forbidden() {
        let err = authorize(&BORROWER, &Action::ConfirmReturn).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(authorize(&STAFF, &Action::ConfirmReturn).is_ok());
    }
}
