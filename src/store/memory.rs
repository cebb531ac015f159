use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::{RentalError, Result};
use crate::rental::Rental;
use crate::store::{FleetStore, RentalQuery};
use crate::types::{OwnerId, RentalId, VehicleId, VehicleStatus};
use crate::vehicle::{normalize_plate, Vehicle};

/// in-process reference store
///
/// Two lock-guarded maps; composite writes take the vehicle lock before
/// the rental lock, so the status guard check and the dual write are one
/// atomic step relative to every other writer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    vehicles: RwLock<HashMap<VehicleId, Vehicle>>,
    rentals: RwLock<HashMap<RentalId, Rental>>,
}

fn poisoned() -> RentalError {
    RentalError::Storage {
        message: "store lock poisoned".to_string(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn all_vehicles(&self) -> Result<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().map_err(|_| poisoned())?;
        Ok(vehicles.values().cloned().collect())
    }
}

impl FleetStore for MemoryStore {
    fn vehicle(&self, id: VehicleId) -> Result<Vehicle> {
        let vehicles = self.vehicles.read().map_err(|_| poisoned())?;
        vehicles
            .get(&id)
            .cloned()
            .ok_or(RentalError::VehicleNotFound { id })
    }

    fn vehicle_by_plate(&self, plate: &str) -> Result<Vehicle> {
        let wanted = normalize_plate(plate);
        let vehicles = self.vehicles.read().map_err(|_| poisoned())?;
        vehicles
            .values()
            .find(|v| v.plate == wanted)
            .cloned()
            .ok_or(RentalError::PlateNotFound { plate: wanted })
    }

    fn vehicles_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().map_err(|_| poisoned())?;
        Ok(vehicles
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn save_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        let mut vehicles = self.vehicles.write().map_err(|_| poisoned())?;
        let taken = vehicles
            .values()
            .any(|v| v.id != vehicle.id && v.plate == vehicle.plate);
        if taken {
            return Err(RentalError::DuplicatePlate {
                plate: vehicle.plate.clone(),
            });
        }
        vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    fn remove_vehicle(&self, id: VehicleId) -> Result<()> {
        let mut vehicles = self.vehicles.write().map_err(|_| poisoned())?;
        vehicles
            .remove(&id)
            .map(|_| ())
            .ok_or(RentalError::VehicleNotFound { id })
    }

    fn rental(&self, id: RentalId) -> Result<Rental> {
        let rentals = self.rentals.read().map_err(|_| poisoned())?;
        rentals
            .get(&id)
            .cloned()
            .ok_or(RentalError::RentalNotFound { id })
    }

    fn rentals(&self, query: &RentalQuery) -> Result<Vec<Rental>> {
        let rentals = self.rentals.read().map_err(|_| poisoned())?;
        Ok(rentals
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    fn save_rental(&self, rental: &Rental) -> Result<()> {
        let mut rentals = self.rentals.write().map_err(|_| poisoned())?;
        rentals.insert(rental.id, rental.clone());
        Ok(())
    }

    fn commit_rental(
        &self,
        rental: &Rental,
        vehicle: &Vehicle,
        guard: Option<VehicleStatus>,
    ) -> Result<()> {
        // vehicles before rentals, matching every other composite write
        let mut vehicles = self.vehicles.write().map_err(|_| poisoned())?;
        let mut rentals = self.rentals.write().map_err(|_| poisoned())?;

        let stored = vehicles
            .get(&vehicle.id)
            .ok_or(RentalError::VehicleNotFound { id: vehicle.id })?;
        if let Some(expected) = guard {
            if stored.status != expected {
                return Err(RentalError::VehicleNotAvailable {
                    status: stored.status,
                });
            }
        }

        vehicles.insert(vehicle.id, vehicle.clone());
        rentals.insert(rental.id, rental.clone());
        Ok(())
    }

    fn remove_rental(&self, id: RentalId, vehicle: Option<&Vehicle>) -> Result<()> {
        let mut vehicles = self.vehicles.write().map_err(|_| poisoned())?;
        let mut rentals = self.rentals.write().map_err(|_| poisoned())?;

        rentals
            .remove(&id)
            .ok_or(RentalError::RentalNotFound { id })?;
        if let Some(v) = vehicle {
            vehicles.insert(v.id, v.clone());
        }
        Ok(())
    }
}
