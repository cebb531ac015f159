pub mod decimal;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod maintenance;
pub mod rates;
pub mod rental;
pub mod reports;
pub mod settlement;
pub mod store;
pub mod types;
pub mod vehicle;

// re-export key types
pub use decimal::Money;
pub use errors::{ErrorKind, RentalError, Result};
pub use events::{Event, EventLog};
pub use lifecycle::{BookingRequest, RentalDesk, RentalUpdate};
pub use maintenance::{MaintenanceLedger, ServiceEntryInput, ServiceEntryPatch};
pub use rates::{BillableUnits, RateCalculator};
pub use rental::Rental;
pub use reports::{
    CarStats, FleetStats, MonthlyStats, RentalReport, ReportAggregator, ReportFilter, VehicleLabel,
};
pub use settlement::{final_amount, Adjustments};
pub use store::{FleetSnapshot, FleetStore, MemoryStore, RentalQuery};
pub use types::{
    Charge, Customer, EntryId, OwnerId, RentalId, RentalStatus, ServiceEntry, VehicleId,
    VehicleStatus,
};
pub use vehicle::{Vehicle, VehicleBuilder};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
