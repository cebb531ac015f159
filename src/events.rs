use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{EntryId, RentalId, RentalStatus, VehicleId, VehicleStatus};

/// all events that can be emitted by desk and ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // rental lifecycle events
    RentalOpened {
        rental_id: RentalId,
        car_id: VehicleId,
        total_rent: Money,
        collected: Money,
        timestamp: DateTime<Utc>,
    },
    RentalRevised {
        rental_id: RentalId,
        total_rent: Money,
        collected: Money,
        timestamp: DateTime<Utc>,
    },
    RentalClosed {
        rental_id: RentalId,
        car_id: VehicleId,
        collected: Money,
        timestamp: DateTime<Utc>,
    },
    RentalDeleted {
        rental_id: RentalId,
        car_id: VehicleId,
        was_active: bool,
        timestamp: DateTime<Utc>,
    },
    RentalStatusChanged {
        rental_id: RentalId,
        old_status: RentalStatus,
        new_status: RentalStatus,
        timestamp: DateTime<Utc>,
    },

    // vehicle events
    VehicleStatusChanged {
        car_id: VehicleId,
        old_status: VehicleStatus,
        new_status: VehicleStatus,
        timestamp: DateTime<Utc>,
    },

    // maintenance events
    ServiceEntryAdded {
        car_id: VehicleId,
        entry_id: EntryId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    ServiceEntryRevised {
        car_id: VehicleId,
        entry_id: EntryId,
        timestamp: DateTime<Utc>,
    },
    ServiceEntryRemoved {
        car_id: VehicleId,
        entry_id: EntryId,
        timestamp: DateTime<Utc>,
    },
}

/// in-memory log collecting events during operations
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// drain all collected events, leaving the log empty
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
