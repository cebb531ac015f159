use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::decimal::Money;
use crate::types::{EntryId, RentalId, VehicleId, VehicleStatus};

/// abstract error kinds the transport layer maps onto status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Persistence,
}

#[derive(Error, Debug)]
pub enum RentalError {
    #[error("rental period is empty: start {start}, end {end}")]
    EmptyRentalPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("unparseable timestamp for {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("missing required customer field: {field}")]
    MissingCustomerField { field: &'static str },

    #[error("vehicle plate must not be blank")]
    MissingPlate,

    #[error("negative amount for {field}: {amount}")]
    NegativeAmount { field: &'static str, amount: Money },

    #[error("negative rate for {field}: {amount}")]
    InvalidRate { field: &'static str, amount: Money },

    #[error("invalid month key: {value}, expected YYYY-MM")]
    InvalidMonthKey { value: String },

    #[error("vehicle not available: current status is {status:?}")]
    VehicleNotAvailable { status: VehicleStatus },

    #[error("vehicle already held by active rental {rental_id}")]
    RentalStillActive { rental_id: RentalId },

    #[error("plate already registered: {plate}")]
    DuplicatePlate { plate: String },

    #[error("vehicle not found: {id}")]
    VehicleNotFound { id: VehicleId },

    #[error("plate not registered: {plate}")]
    PlateNotFound { plate: String },

    #[error("rental not found: {id}")]
    RentalNotFound { id: RentalId },

    #[error("service entry not found: {id}")]
    ServiceEntryNotFound { id: EntryId },

    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl RentalError {
    /// classify the variant into its abstract kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            RentalError::EmptyRentalPeriod { .. }
            | RentalError::InvalidTimestamp { .. }
            | RentalError::MissingCustomerField { .. }
            | RentalError::MissingPlate
            | RentalError::NegativeAmount { .. }
            | RentalError::InvalidRate { .. }
            | RentalError::InvalidMonthKey { .. } => ErrorKind::Validation,

            RentalError::VehicleNotAvailable { .. }
            | RentalError::RentalStillActive { .. }
            | RentalError::DuplicatePlate { .. } => ErrorKind::Conflict,

            RentalError::VehicleNotFound { .. }
            | RentalError::PlateNotFound { .. }
            | RentalError::RentalNotFound { .. }
            | RentalError::ServiceEntryNotFound { .. } => ErrorKind::NotFound,

            RentalError::Storage { .. } => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, RentalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_kind_classification() {
        let e = RentalError::MissingCustomerField { field: "phone" };
        assert_eq!(e.kind(), ErrorKind::Validation);

        let e = RentalError::VehicleNotAvailable {
            status: VehicleStatus::Rented,
        };
        assert_eq!(e.kind(), ErrorKind::Conflict);

        let e = RentalError::RentalNotFound { id: Uuid::new_v4() };
        assert_eq!(e.kind(), ErrorKind::NotFound);

        let e = RentalError::Storage {
            message: "disk gone".to_string(),
        };
        assert_eq!(e.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_display_is_lowercase_prose() {
        let e = RentalError::InvalidMonthKey {
            value: "2024/01".to_string(),
        };
        assert_eq!(e.to_string(), "invalid month key: 2024/01, expected YYYY-MM");
    }
}
