use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::errors::{RentalError, Result};
use crate::rental::Rental;
use crate::store::{FleetStore, MemoryStore, RentalQuery};
use crate::vehicle::Vehicle;

/// serializable capture of the whole fleet state
#[derive(Debug, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub taken_at: DateTime<Utc>,
    pub vehicles: Vec<Vehicle>,
    pub rentals: Vec<Rental>,
}

impl FleetSnapshot {
    /// capture everything held by a memory store
    pub fn capture(store: &MemoryStore, time: &SafeTimeProvider) -> Result<Self> {
        Ok(Self {
            taken_at: time.now(),
            vehicles: store.all_vehicles()?,
            rentals: store.rentals(&RentalQuery::all())?,
        })
    }

    /// replay the snapshot into any store
    pub fn restore_into<S: FleetStore>(&self, store: &S) -> Result<()> {
        for vehicle in &self.vehicles {
            store.save_vehicle(vehicle)?;
        }
        for rental in &self.rentals {
            store.save_rental(rental)?;
        }
        Ok(())
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RentalError::Storage {
            message: e.to_string(),
        })
    }

    /// parse from a json string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RentalError::Storage {
            message: e.to_string(),
        })
    }
}
