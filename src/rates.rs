use chrono::{DateTime, Utc};

use crate::decimal::Money;
use crate::errors::{RentalError, Result};
use crate::vehicle::Vehicle;

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// computes base rent from a time interval and a vehicle's price card
///
/// Partial hours always bill as full hours. Durations of a day or more
/// split into whole days at the daily rate plus a rounded-up remainder
/// at the hourly rate; an exact multiple of 24 hours carries no hourly
/// remainder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCalculator {
    pub hourly_rate: Money,
    pub daily_rate: Money,
}

/// day/hour split behind a base rent figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillableUnits {
    pub days: i64,
    pub hours: i64,
}

impl RateCalculator {
    pub fn new(hourly_rate: Money, daily_rate: Money) -> Self {
        Self {
            hourly_rate,
            daily_rate,
        }
    }

    /// price card of a specific vehicle
    pub fn for_vehicle(vehicle: &Vehicle) -> Self {
        Self::new(vehicle.hourly_rate, vehicle.daily_rate)
    }

    /// base rent for the interval; `None` end means the rental is still
    /// ongoing and carries no committed charge yet
    pub fn base_rent(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Money> {
        let Some(end) = end else {
            return Ok(Money::ZERO);
        };

        let units = self.billable_units(start, end)?;
        Ok(self.daily_rate.times(units.days) + self.hourly_rate.times(units.hours))
    }

    /// day/hour split for the interval; fails if the period is empty
    pub fn billable_units(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<BillableUnits> {
        let secs = (end - start).num_seconds();
        if secs <= 0 {
            return Err(RentalError::EmptyRentalPeriod { start, end });
        }

        if secs < SECS_PER_DAY {
            return Ok(BillableUnits {
                days: 0,
                hours: ceil_hours(secs),
            });
        }

        Ok(BillableUnits {
            days: secs / SECS_PER_DAY,
            hours: ceil_hours(secs % SECS_PER_DAY),
        })
    }
}

/// whole hours covering the given seconds, rounding partial hours up
fn ceil_hours(secs: i64) -> i64 {
    (secs + SECS_PER_HOUR - 1) / SECS_PER_HOUR
}
