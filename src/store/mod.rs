pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::FleetSnapshot;

use crate::errors::Result;
use crate::rental::Rental;
use crate::types::{OwnerId, RentalId, RentalStatus, VehicleId, VehicleStatus};
use crate::vehicle::Vehicle;

/// filter for rental lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentalQuery {
    pub car_id: Option<VehicleId>,
    pub status: Option<RentalStatus>,
    pub owner_id: Option<OwnerId>,
}

impl RentalQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_car(mut self, car_id: VehicleId) -> Self {
        self.car_id = Some(car_id);
        self
    }

    pub fn with_status(mut self, status: RentalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn for_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn matches(&self, rental: &Rental) -> bool {
        self.car_id.map_or(true, |id| rental.car_id == id)
            && self.status.map_or(true, |s| rental.status == s)
            && self.owner_id.map_or(true, |id| rental.owner_id == id)
    }
}

/// the storage collaborator contract
///
/// Plain keyed lookups and saves, plus two composite writes that keep a
/// rental and its vehicle consistent in one atomic step. The optional
/// status guard on `commit_rental` is the conditional write that
/// serializes concurrent bookings of one vehicle: the write only lands if
/// the stored vehicle still has the expected status.
pub trait FleetStore {
    fn vehicle(&self, id: VehicleId) -> Result<Vehicle>;
    fn vehicle_by_plate(&self, plate: &str) -> Result<Vehicle>;
    fn vehicles_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Vehicle>>;
    fn save_vehicle(&self, vehicle: &Vehicle) -> Result<()>;
    fn remove_vehicle(&self, id: VehicleId) -> Result<()>;

    fn rental(&self, id: RentalId) -> Result<Rental>;
    fn rentals(&self, query: &RentalQuery) -> Result<Vec<Rental>>;
    fn save_rental(&self, rental: &Rental) -> Result<()>;

    /// persist the rental and its vehicle atomically; with a guard, fail
    /// with `VehicleNotAvailable` unless the stored vehicle still has the
    /// guarded status
    fn commit_rental(
        &self,
        rental: &Rental,
        vehicle: &Vehicle,
        guard: Option<VehicleStatus>,
    ) -> Result<()>;

    /// remove the rental and, when a reconciled vehicle is supplied,
    /// persist it in the same atomic step
    fn remove_rental(&self, id: RentalId, vehicle: Option<&Vehicle>) -> Result<()>;
}
