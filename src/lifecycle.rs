use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decimal::Money;
use crate::errors::{RentalError, Result};
use crate::events::{Event, EventLog};
use crate::rates::RateCalculator;
use crate::rental::Rental;
use crate::store::{FleetStore, RentalQuery};
use crate::types::{Charge, Customer, OwnerId, RentalId, RentalStatus, VehicleId, VehicleStatus};
use crate::vehicle::Vehicle;

/// booking command accepted from the transport layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub car_id: VehicleId,
    pub owner_id: OwnerId,
    /// ISO-8601 timestamp
    pub start_time: String,
    /// ISO-8601 timestamp; absent while the rental is open-ended
    pub end_time: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_occupation: Option<String>,
    pub deduction_amount: Option<Money>,
    pub deduction_reason: Option<String>,
    pub chot: Option<Money>,
    pub ghata_amount: Option<Money>,
    pub ghata_reason: Option<String>,
    pub manual_total_rent: Option<Money>,
    pub is_settled: Option<bool>,
}

/// partial revision of an existing rental; absent fields stay untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalUpdate {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_occupation: Option<String>,
    pub deduction_amount: Option<Money>,
    pub deduction_reason: Option<String>,
    pub chot: Option<Money>,
    pub ghata_amount: Option<Money>,
    pub ghata_reason: Option<String>,
    pub manual_total_rent: Option<Money>,
    pub is_settled: Option<bool>,
    pub status: Option<RentalStatus>,
}

/// the rental desk: every rental transition and the linked vehicle status
/// flips go through here
///
/// Validation runs before anything is persisted, and persistence is a
/// single guarded store commit, so a failed operation leaves no partial
/// state behind.
pub struct RentalDesk<'a, S: FleetStore> {
    store: &'a S,
    events: EventLog,
}

impl<'a, S: FleetStore> RentalDesk<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            events: EventLog::new(),
        }
    }

    /// accept a booking: validates the request, prices the rental, and
    /// atomically persists it while flipping the vehicle to `Rented`
    pub fn open(&mut self, request: &BookingRequest, time: &SafeTimeProvider) -> Result<Rental> {
        let start = parse_timestamp("start_time", &request.start_time)?;
        let end = request
            .end_time
            .as_deref()
            .map(|s| parse_timestamp("end_time", s))
            .transpose()?;
        if let Some(end) = end {
            if end <= start {
                return Err(RentalError::EmptyRentalPeriod { start, end });
            }
        }

        let customer = Customer {
            name: required_field("customer_name", &request.customer_name)?,
            phone: required_field("customer_phone", &request.customer_phone)?,
            occupation: request.customer_occupation.clone(),
        };

        let adjustments = crate::settlement::Adjustments {
            deduction: Charge::new(
                non_negative("deduction_amount", request.deduction_amount)?,
                request.deduction_reason.clone(),
            ),
            ghata: Charge::new(
                non_negative("ghata_amount", request.ghata_amount)?,
                request.ghata_reason.clone(),
            ),
            chot: non_negative("chot", request.chot)?,
        };

        let vehicle = self.store.vehicle(request.car_id)?;
        if vehicle.status != VehicleStatus::Available {
            return Err(RentalError::VehicleNotAvailable {
                status: vehicle.status,
            });
        }

        let (total_rent, manual_rate) = match request.manual_total_rent {
            Some(total) => (non_negative("manual_total_rent", Some(total))?, true),
            None => (
                RateCalculator::for_vehicle(&vehicle).base_rent(start, end)?,
                false,
            ),
        };

        let rental = Rental::open(
            request.car_id,
            request.owner_id,
            start,
            end,
            customer,
            total_rent,
            manual_rate,
            adjustments,
            request.is_settled.unwrap_or(false),
            time.now(),
        );

        let mut held = vehicle;
        let old_status = held.status;
        held.status = VehicleStatus::Rented;

        // the guard re-checks availability inside the store's atomic
        // step, serializing racing bookings of the same vehicle
        self.store
            .commit_rental(&rental, &held, Some(VehicleStatus::Available))?;

        let now = time.now();
        self.events.emit(Event::VehicleStatusChanged {
            car_id: held.id,
            old_status,
            new_status: VehicleStatus::Rented,
            timestamp: now,
        });
        self.events.emit(Event::RentalOpened {
            rental_id: rental.id,
            car_id: rental.car_id,
            total_rent: rental.total_rent,
            collected: rental.final_amount_collected(),
            timestamp: now,
        });
        info!(rental_id = %rental.id, car_id = %rental.car_id, total = %rental.total_rent, "rental opened");

        Ok(rental)
    }

    /// revise a rental: re-prices when the period changes, re-derives the
    /// settlement, and keeps the vehicle status in step with the rental
    /// status
    pub fn revise(
        &mut self,
        rental_id: RentalId,
        update: &RentalUpdate,
        time: &SafeTimeProvider,
    ) -> Result<Rental> {
        let mut rental = self.store.rental(rental_id)?;
        // rates come from the vehicle as it is now, not as it was booked
        let mut vehicle = self.store.vehicle(rental.car_id)?;

        let old_rental_status = rental.status;
        let mut period_changed = false;

        if let Some(s) = &update.start_time {
            rental.start_time = parse_timestamp("start_time", s)?;
            period_changed = true;
        }
        if let Some(s) = &update.end_time {
            rental.end_time = Some(parse_timestamp("end_time", s)?);
            period_changed = true;
        }
        if let Some(end) = rental.end_time {
            if end <= rental.start_time {
                return Err(RentalError::EmptyRentalPeriod {
                    start: rental.start_time,
                    end,
                });
            }
        }

        if let Some(name) = &update.customer_name {
            rental.customer.name = required_field("customer_name", name)?;
        }
        if let Some(phone) = &update.customer_phone {
            rental.customer.phone = required_field("customer_phone", phone)?;
        }
        if let Some(occupation) = &update.customer_occupation {
            rental.customer.occupation = Some(occupation.clone());
        }

        if let Some(amount) = update.deduction_amount {
            rental.adjustments.deduction.amount = non_negative("deduction_amount", Some(amount))?;
        }
        if let Some(reason) = &update.deduction_reason {
            rental.adjustments.deduction.reason = Some(reason.clone());
        }
        if let Some(amount) = update.ghata_amount {
            rental.adjustments.ghata.amount = non_negative("ghata_amount", Some(amount))?;
        }
        if let Some(reason) = &update.ghata_reason {
            rental.adjustments.ghata.reason = Some(reason.clone());
        }
        if let Some(chot) = update.chot {
            rental.adjustments.chot = non_negative("chot", Some(chot))?;
        }

        if let Some(total) = update.manual_total_rent {
            rental.total_rent = non_negative("manual_total_rent", Some(total))?;
            rental.manual_rate = true;
        } else if period_changed && !rental.manual_rate {
            rental.total_rent = RateCalculator::for_vehicle(&vehicle)
                .base_rent(rental.start_time, rental.end_time)?;
        }

        if let Some(settled) = update.is_settled {
            rental.is_settled = settled;
        }
        if let Some(status) = update.status {
            rental.status = status;
        }
        rental.recalculate();

        // re-activation must not break the one-active-rental invariant;
        // the lookup names the offender, the commit guard below makes the
        // check atomic
        let reactivating =
            old_rental_status == RentalStatus::Completed && rental.status == RentalStatus::Active;
        if reactivating {
            let active = self
                .store
                .rentals(&RentalQuery::all().for_car(vehicle.id).with_status(RentalStatus::Active))?;
            if let Some(other) = active.into_iter().find(|r| r.id != rental.id) {
                return Err(RentalError::RentalStillActive {
                    rental_id: other.id,
                });
            }
        }

        let old_vehicle_status = vehicle.status;
        match (old_rental_status, rental.status) {
            // active rentals hold their vehicle, whether they just
            // (re)started or merely got edited
            (_, RentalStatus::Active) => vehicle.status = VehicleStatus::Rented,
            // only the transition releases the vehicle; editing an old
            // completed rental must not free a vehicle held by a newer one
            (RentalStatus::Active, RentalStatus::Completed) => {
                vehicle.status = VehicleStatus::Available
            }
            (RentalStatus::Completed, RentalStatus::Completed) => {}
        }

        let guard = reactivating.then_some(VehicleStatus::Available);
        self.store.commit_rental(&rental, &vehicle, guard)?;

        let now = time.now();
        if old_vehicle_status != vehicle.status {
            self.events.emit(Event::VehicleStatusChanged {
                car_id: vehicle.id,
                old_status: old_vehicle_status,
                new_status: vehicle.status,
                timestamp: now,
            });
        }
        if old_rental_status != rental.status {
            self.events.emit(Event::RentalStatusChanged {
                rental_id: rental.id,
                old_status: old_rental_status,
                new_status: rental.status,
                timestamp: now,
            });
            if rental.status == RentalStatus::Completed {
                self.events.emit(Event::RentalClosed {
                    rental_id: rental.id,
                    car_id: rental.car_id,
                    collected: rental.final_amount_collected(),
                    timestamp: now,
                });
            }
        }
        self.events.emit(Event::RentalRevised {
            rental_id: rental.id,
            total_rent: rental.total_rent,
            collected: rental.final_amount_collected(),
            timestamp: now,
        });
        debug!(rental_id = %rental.id, collected = %rental.final_amount_collected(), "rental revised");

        Ok(rental)
    }

    /// administratively delete a rental; an active rental hands its
    /// vehicle back to the lot
    pub fn remove(&mut self, rental_id: RentalId, time: &SafeTimeProvider) -> Result<Rental> {
        let rental = self.store.rental(rental_id)?;

        let reconciled = if rental.is_active() {
            match self.store.vehicle(rental.car_id) {
                Ok(mut vehicle) => {
                    let old_status = vehicle.status;
                    vehicle.status = VehicleStatus::Available;
                    Some((vehicle, old_status))
                }
                // weak reference: the vehicle may already be gone
                Err(RentalError::VehicleNotFound { .. }) => None,
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        self.store
            .remove_rental(rental_id, reconciled.as_ref().map(|(v, _)| v))?;

        let now = time.now();
        if let Some((vehicle, old_status)) = &reconciled {
            if *old_status != vehicle.status {
                self.events.emit(Event::VehicleStatusChanged {
                    car_id: vehicle.id,
                    old_status: *old_status,
                    new_status: vehicle.status,
                    timestamp: now,
                });
            }
        }
        self.events.emit(Event::RentalDeleted {
            rental_id: rental.id,
            car_id: rental.car_id,
            was_active: rental.is_active(),
            timestamp: now,
        });
        info!(rental_id = %rental.id, was_active = rental.is_active(), "rental deleted");

        Ok(rental)
    }

    /// explicit manual vehicle status edit (workshop visits and the like)
    pub fn set_vehicle_status(
        &mut self,
        vehicle_id: VehicleId,
        status: VehicleStatus,
        time: &SafeTimeProvider,
    ) -> Result<Vehicle> {
        let mut vehicle = self.store.vehicle(vehicle_id)?;
        let old_status = vehicle.status;
        if old_status != status {
            vehicle.status = status;
            self.store.save_vehicle(&vehicle)?;
            self.events.emit(Event::VehicleStatusChanged {
                car_id: vehicle.id,
                old_status,
                new_status: status,
                timestamp: time.now(),
            });
            debug!(car_id = %vehicle.id, ?status, "vehicle status set manually");
        }
        Ok(vehicle)
    }

    /// drain the events collected by operations on this desk
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| RentalError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn required_field(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RentalError::MissingCustomerField { field });
    }
    Ok(trimmed.to_string())
}

fn non_negative(field: &'static str, amount: Option<Money>) -> Result<Money> {
    let amount = amount.unwrap_or(Money::ZERO);
    if amount.is_negative() {
        return Err(RentalError::NegativeAmount { field, amount });
    }
    Ok(amount)
}
