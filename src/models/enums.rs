//! Shared domain enums, stored as TEXT columns

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use utoipa::ToSchema;

/// Implements `as_str`, `Display`, `FromStr` and the sqlx TEXT conversions
/// for a fieldless enum with SCREAMING_SNAKE_CASE codes.
macro_rules! text_enum {
    ($name:ident, $label:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", $label, s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    /// Staff member handling loans and returns
    Petugas,
    /// Borrower
    Peminjam,
}

text_enum!(Role, "role", {
    Admin => "ADMIN",
    Petugas => "PETUGAS",
    Peminjam => "PEMINJAM",
});

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Petugas)
    }
}

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan lifecycle status.
///
/// `Overdue` is a display state only: it is derived from a `Borrowed` loan
/// whose deadline has passed and is never written to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Borrowed,
    Returned,
    Overdue,
}

text_enum!(LoanStatus, "loan status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Borrowed => "BORROWED",
    Returned => "RETURNED",
    Overdue => "OVERDUE",
});

impl LoanStatus {
    /// Terminal states accept no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Returned)
    }
}

// ---------------------------------------------------------------------------
// ReturnStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    AwaitingPayment,
    ReturnedConfirmed,
}

text_enum!(ReturnStatus, "return status", {
    AwaitingPayment => "AWAITING_PAYMENT",
    ReturnedConfirmed => "RETURNED_CONFIRMED",
});

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Equipment condition declared by the borrower at return time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Good,
    MinorDamage,
    ModerateDamage,
    SevereDamage,
    Lost,
}

text_enum!(Condition, "condition code", {
    Good => "GOOD",
    MinorDamage => "MINOR_DAMAGE",
    ModerateDamage => "MODERATE_DAMAGE",
    SevereDamage => "SEVERE_DAMAGE",
    Lost => "LOST",
});

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    Unavailable,
}

text_enum!(EquipmentStatus, "equipment status", {
    Available => "AVAILABLE",
    Unavailable => "UNAVAILABLE",
});

impl EquipmentStatus {
    /// Availability follows stock: available iff at least one unit is on the shelf
    pub fn for_stock(stock: i32) -> Self {
        if stock > 0 {
            EquipmentStatus::Available
        } else {
            EquipmentStatus::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_codes_parse_case_insensitively() {
        assert_eq!("moderate_damage".parse::<Condition>(), Ok(Condition::ModerateDamage));
        assert_eq!(" LOST ".parse::<Condition>(), Ok(Condition::Lost));
        assert!("BROKEN".parse::<Condition>().is_err());
        assert!("MINOR".parse::<Condition>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ReturnStatus::AwaitingPayment).unwrap();
        assert_eq!(json, "\"AWAITING_PAYMENT\"");
        let role: Role = serde_json::from_str("\"PETUGAS\"").unwrap();
        assert_eq!(role, Role::Petugas);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(LoanStatus::Borrowed.to_string(), "BORROWED");
        assert_eq!(Condition::SevereDamage.to_string(), "SEVERE_DAMAGE");
    }

    #[test]
    fn test_availability_for_stock() {
        assert_eq!(EquipmentStatus::for_stock(3), EquipmentStatus::Available);
        assert_eq!(EquipmentStatus::for_stock(0), EquipmentStatus::Unavailable);
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Petugas.is_staff());
        assert!(!Role::Peminjam.is_staff());
    }

    #[test]
    fn test_terminal_loan_states() {
        assert!(LoanStatus::Returned.is_terminal());
        assert!(LoanStatus::Rejected.is_terminal());
        assert!(!LoanStatus::Borrowed.is_terminal());
    }
}
