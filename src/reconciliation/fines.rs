//! Late and damage fine computation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Condition, ReturnRecord};

/// Late fee per calendar day when nothing else is configured
pub const DEFAULT_LATE_FEE_PER_DAY: i64 = 50_000;

/// Whole days late, counted on UTC calendar dates.
///
/// A return at any time on the deadline's UTC date is on time; each later
/// UTC date adds one day. Early returns count zero.
pub fn late_days(deadline: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    (returned_at.date_naive() - deadline.date_naive())
        .num_days()
        .max(0)
}

/// Share of the unit price charged for a declared condition
pub fn damage_rate(condition: Condition) -> Decimal {
    match condition {
        Condition::Good => Decimal::ZERO,
        Condition::MinorDamage => Decimal::new(15, 2),
        Condition::ModerateDamage => Decimal::new(40, 2),
        Condition::SevereDamage => Decimal::new(70, 2),
        Condition::Lost => Decimal::ONE,
    }
}

/// Fine components of one return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FineBreakdown {
    pub late_days: i64,
    pub late_fine: Decimal,
    pub damage_fine: Decimal,
    pub total_fine: Decimal,
}

impl From<&ReturnRecord> for FineBreakdown {
    fn from(record: &ReturnRecord) -> Self {
        Self {
            late_days: i64::from(record.late_days),
            late_fine: record.late_fine,
            damage_fine: record.damage_fine,
            total_fine: record.total_fine,
        }
    }
}

/// Tariff used to assess returns
#[derive(Debug, Clone)]
pub struct FineSchedule {
    late_fee_per_day: Decimal,
}

impl Default for FineSchedule {
    fn default() -> Self {
        Self::new(Decimal::from(DEFAULT_LATE_FEE_PER_DAY))
    }
}

impl FineSchedule {
    pub fn new(late_fee_per_day: Decimal) -> Self {
        Self {
            late_fee_per_day: late_fee_per_day.max(Decimal::ZERO),
        }
    }

    pub fn late_fee_per_day(&self) -> Decimal {
        self.late_fee_per_day
    }

    pub fn assess(
        &self,
        deadline: DateTime<Utc>,
        returned_at: DateTime<Utc>,
        unit_price: Decimal,
        condition: Condition,
    ) -> FineBreakdown {
        let late_days = late_days(deadline, returned_at);
        let late_fine = self.late_fee_per_day * Decimal::from(late_days);
        let damage_fine = (unit_price.max(Decimal::ZERO) * damage_rate(condition)).round_dp(2);

        FineBreakdown {
            late_days,
            late_fine,
            damage_fine,
            total_fine: late_fine + damage_fine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_late_fine_is_days_times_fee() {
        let schedule = FineSchedule::default();
        let deadline = at(2024, 3, 1, 12);
        for days in 0..30 {
            let fine = schedule.assess(deadline, deadline + Duration::days(days), Decimal::ZERO, Condition::Good);
            assert_eq!(fine.late_days, days);
            assert_eq!(fine.late_fine, Decimal::from(50_000 * days));
        }
    }

    #[test]
    fn test_return_before_or_on_deadline_is_not_late() {
        let deadline = at(2024, 1, 10, 8);
        assert_eq!(late_days(deadline, at(2024, 1, 2, 8)), 0);
        assert_eq!(late_days(deadline, at(2024, 1, 10, 0)), 0);
        assert_eq!(late_days(deadline, at(2024, 1, 10, 23)), 0);
        assert_eq!(late_days(deadline, at(2024, 1, 11, 0)), 1);
    }

    #[test]
    fn test_damage_rates() {
        let schedule = FineSchedule::default();
        let deadline = at(2024, 1, 10, 0);
        let price = Decimal::from(200_000);
        let expected = [
            (Condition::Good, 0),
            (Condition::MinorDamage, 30_000),
            (Condition::ModerateDamage, 80_000),
            (Condition::SevereDamage, 140_000),
            (Condition::Lost, 200_000),
        ];
        for (condition, fine) in expected {
            let breakdown = schedule.assess(deadline, deadline, price, condition);
            assert_eq!(breakdown.damage_fine, Decimal::from(fine), "{condition}");
            assert_eq!(breakdown.total_fine, breakdown.late_fine + breakdown.damage_fine);
            assert!(breakdown.total_fine >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_three_days_late_with_moderate_damage() {
        let schedule = FineSchedule::default();
        let fine = schedule.assess(
            at(2024, 1, 10, 0),
            at(2024, 1, 13, 0),
            Decimal::from(1_000_000),
            Condition::ModerateDamage,
        );
        assert_eq!(
            fine,
            FineBreakdown {
                late_days: 3,
                late_fine: Decimal::from(150_000),
                damage_fine: Decimal::from(400_000),
                total_fine: Decimal::from(550_000),
            }
        );
    }

    #[test]
    fn test_fractional_prices_round_to_cents() {
        let schedule = FineSchedule::default();
        let deadline = at(2024, 1, 10, 0);
        let fine = schedule.assess(deadline, deadline, Decimal::new(99_999, 2), Condition::MinorDamage);
        assert_eq!(fine.damage_fine, Decimal::new(15_000, 2));
    }

    #[test]
    fn test_configured_fee_is_never_negative() {
        let schedule = FineSchedule::new(Decimal::from(-10));
        assert_eq!(schedule.late_fee_per_day(), Decimal::ZERO);
    }
}
