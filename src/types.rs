use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{RentalError, Result};

/// unique identifier for a vehicle
pub type VehicleId = Uuid;

/// unique identifier for a rental
pub type RentalId = Uuid;

/// unique identifier for a maintenance entry
pub type EntryId = Uuid;

/// unique identifier for the owning operator
pub type OwnerId = Uuid;

/// vehicle status, shared resource across rentals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    /// on the lot, can be booked
    Available,
    /// out with a customer under an active rental
    Rented,
    /// in the workshop, cannot be booked
    Maintenance,
}

/// rental status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentalStatus {
    /// vehicle is out; at most one active rental per vehicle
    Active,
    /// vehicle returned, amount recognized for reporting
    Completed,
}

/// customer details captured on a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub occupation: Option<String>,
}

/// a manual amount with an optional reason (deduction or ghata)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Charge {
    pub amount: Money,
    pub reason: Option<String>,
}

impl Charge {
    pub fn new(amount: Money, reason: Option<String>) -> Self {
        Self { amount, reason }
    }
}

/// one service visit in a vehicle's maintenance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub id: EntryId,
    pub description: String,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub odometer_km: Option<u64>,
}

/// format a timestamp as a YYYY-MM month key
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// parse a YYYY-MM month key into (year, month)
pub fn parse_month_key(key: &str) -> Result<(i32, u32)> {
    let invalid = || RentalError::InvalidMonthKey {
        value: key.to_string(),
    };

    let (year, month) = key.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_key_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(month_key(at), "2024-03");
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(parse_month_key("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_month_key("1999-12").unwrap(), (1999, 12));

        for bad in ["2024-13", "2024-0", "24-03", "2024/03", "2024-", "garbage"] {
            assert!(parse_month_key(bad).is_err(), "accepted {bad}");
        }
    }
}
