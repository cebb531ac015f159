use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{RentalError, Result};
use crate::events::{Event, EventLog};
use crate::store::FleetStore;
use crate::types::{EntryId, ServiceEntry, VehicleId};
use crate::vehicle::Vehicle;

/// new service entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntryInput {
    pub description: String,
    pub amount: Money,
    /// defaults to the clock's now
    pub date: Option<DateTime<Utc>>,
    pub odometer_km: Option<u64>,
}

/// partial revision of a service entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceEntryPatch {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<DateTime<Utc>>,
    pub odometer_km: Option<u64>,
}

/// service-history bookkeeping for a single vehicle document
///
/// Every operation loads the vehicle, mutates the history, re-derives the
/// last-serviced summary, and saves in one step, so readers never observe
/// a half-applied mutation.
pub struct MaintenanceLedger<'a, S: FleetStore> {
    store: &'a S,
    events: EventLog,
}

impl<'a, S: FleetStore> MaintenanceLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            events: EventLog::new(),
        }
    }

    /// append a service entry and roll the summary forward
    pub fn add_entry(
        &mut self,
        vehicle_id: VehicleId,
        input: &ServiceEntryInput,
        time: &SafeTimeProvider,
    ) -> Result<ServiceEntry> {
        if input.amount.is_negative() {
            return Err(RentalError::NegativeAmount {
                field: "amount",
                amount: input.amount,
            });
        }

        let mut vehicle = self.store.vehicle(vehicle_id)?;
        let entry = ServiceEntry {
            id: Uuid::new_v4(),
            description: input.description.clone(),
            amount: input.amount,
            date: input.date.unwrap_or_else(|| time.now()),
            odometer_km: input.odometer_km,
        };

        vehicle.maintenance_history.push(entry.clone());
        roll_summary_forward(&mut vehicle, &entry);
        self.store.save_vehicle(&vehicle)?;

        self.events.emit(Event::ServiceEntryAdded {
            car_id: vehicle_id,
            entry_id: entry.id,
            amount: entry.amount,
            timestamp: time.now(),
        });
        debug!(car_id = %vehicle_id, entry_id = %entry.id, "service entry added");

        Ok(entry)
    }

    /// revise an entry by identity; the summary is re-derived from the
    /// whole history so out-of-order edits cannot leave it stale
    pub fn update_entry(
        &mut self,
        vehicle_id: VehicleId,
        entry_id: EntryId,
        patch: &ServiceEntryPatch,
        time: &SafeTimeProvider,
    ) -> Result<ServiceEntry> {
        if let Some(amount) = patch.amount {
            if amount.is_negative() {
                return Err(RentalError::NegativeAmount {
                    field: "amount",
                    amount,
                });
            }
        }

        let mut vehicle = self.store.vehicle(vehicle_id)?;
        let entry = vehicle
            .maintenance_history
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or(RentalError::ServiceEntryNotFound { id: entry_id })?;

        if let Some(description) = &patch.description {
            entry.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            entry.amount = amount;
        }
        if let Some(date) = patch.date {
            entry.date = date;
        }
        if let Some(km) = patch.odometer_km {
            entry.odometer_km = Some(km);
        }
        let updated = entry.clone();

        recompute_summary(&mut vehicle);
        self.store.save_vehicle(&vehicle)?;

        self.events.emit(Event::ServiceEntryRevised {
            car_id: vehicle_id,
            entry_id,
            timestamp: time.now(),
        });

        Ok(updated)
    }

    /// delete an entry by identity and re-derive the summary from what
    /// remains
    pub fn remove_entry(
        &mut self,
        vehicle_id: VehicleId,
        entry_id: EntryId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let mut vehicle = self.store.vehicle(vehicle_id)?;
        let before = vehicle.maintenance_history.len();
        vehicle.maintenance_history.retain(|e| e.id != entry_id);
        if vehicle.maintenance_history.len() == before {
            return Err(RentalError::ServiceEntryNotFound { id: entry_id });
        }

        recompute_summary(&mut vehicle);
        self.store.save_vehicle(&vehicle)?;

        self.events.emit(Event::ServiceEntryRemoved {
            car_id: vehicle_id,
            entry_id,
            timestamp: time.now(),
        });

        Ok(())
    }

    /// drain the events collected by operations on this ledger
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}

/// incremental summary roll for an appended entry: only an entry at least
/// as recent as the current summary moves the date, and only such an
/// entry's reading replaces an existing km; a reading is still taken from
/// an older entry when none was known before
fn roll_summary_forward(vehicle: &mut Vehicle, entry: &ServiceEntry) {
    let is_latest = vehicle
        .last_serviced_at
        .map_or(true, |current| entry.date >= current);

    if is_latest {
        vehicle.last_serviced_at = Some(entry.date);
        if let Some(km) = entry.odometer_km {
            vehicle.last_serviced_km = Some(km);
        }
    } else if vehicle.last_serviced_km.is_none() {
        vehicle.last_serviced_km = entry.odometer_km;
    }
}

/// full-history recompute used by edits and removals
///
/// The date tracks the latest remaining entry (cleared when the history
/// empties); the km tracks the latest entry that carries a reading, and
/// is retained otherwise — odometers do not run backwards, so a known
/// reading outlives its entry.
fn recompute_summary(vehicle: &mut Vehicle) {
    vehicle.last_serviced_at = vehicle
        .maintenance_history
        .iter()
        .map(|e| e.date)
        .max();

    let latest_reading = vehicle
        .maintenance_history
        .iter()
        .filter(|e| e.odometer_km.is_some())
        .max_by_key(|e| e.date)
        .and_then(|e| e.odometer_km);
    if latest_reading.is_some() {
        vehicle.last_serviced_km = latest_reading;
    }
}
