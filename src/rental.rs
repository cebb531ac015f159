use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::settlement::{self, Adjustments};
use crate::types::{Customer, OwnerId, RentalId, RentalStatus, VehicleId};

/// a rental booking
///
/// `final_amount_collected` is a derivation over the other fields and is
/// recomputed by `recalculate` on every mutating path; it is never written
/// directly by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub id: RentalId,
    pub car_id: VehicleId,
    pub owner_id: OwnerId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub customer: Customer,
    pub total_rent: Money,
    /// a manual total governs this rental; start/end edits no longer
    /// recompute the rent
    pub manual_rate: bool,
    pub adjustments: Adjustments,
    pub(crate) final_amount_collected: Money,
    pub is_settled: bool,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
}

impl Rental {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn open(
        car_id: VehicleId,
        owner_id: OwnerId,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        customer: Customer,
        total_rent: Money,
        manual_rate: bool,
        adjustments: Adjustments,
        is_settled: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut rental = Self {
            id: Uuid::new_v4(),
            car_id,
            owner_id,
            start_time,
            end_time,
            customer,
            total_rent,
            manual_rate,
            adjustments,
            final_amount_collected: Money::ZERO,
            is_settled,
            status: RentalStatus::Active,
            created_at,
        };
        rental.recalculate();
        rental
    }

    /// derived settlement amount
    pub fn final_amount_collected(&self) -> Money {
        self.final_amount_collected
    }

    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }

    /// re-derive the collected amount from the current fields
    pub(crate) fn recalculate(&mut self) {
        self.final_amount_collected =
            settlement::final_amount(self.total_rent, None, &self.adjustments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Charge;
    use chrono::TimeZone;

    fn customer() -> Customer {
        Customer {
            name: "Ravi".to_string(),
            phone: "9999000011".to_string(),
            occupation: None,
        }
    }

    fn open_at(total: i64) -> Rental {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        Rental::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            at,
            None,
            customer(),
            Money::from_major(total),
            false,
            Adjustments::none(),
            false,
            at,
        )
    }

    #[test]
    fn test_open_derives_collected_amount() {
        let rental = open_at(1200);
        assert_eq!(rental.final_amount_collected(), Money::from_major(1200));
        assert_eq!(rental.status, RentalStatus::Active);
        assert!(!rental.is_settled);
    }

    #[test]
    fn test_recalculate_tracks_adjustments() {
        let mut rental = open_at(1200);
        rental.adjustments.deduction = Charge::new(Money::from_major(200), None);
        rental.adjustments.chot = Money::from_major(50);
        rental.recalculate();
        assert_eq!(rental.final_amount_collected(), Money::from_major(1050));
    }
}
