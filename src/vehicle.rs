use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{RentalError, Result};
use crate::types::{OwnerId, ServiceEntry, VehicleId, VehicleStatus};

/// a fleet vehicle
///
/// The service summary fields are derived from the maintenance history and
/// only ever written by the ledger's recompute; callers read them through
/// the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate: String,
    pub owner_id: OwnerId,
    pub brand: String,
    pub model: String,
    pub hourly_rate: Money,
    pub daily_rate: Money,
    pub status: VehicleStatus,
    pub maintenance_history: Vec<ServiceEntry>,
    pub(crate) last_serviced_at: Option<DateTime<Utc>>,
    pub(crate) last_serviced_km: Option<u64>,
    pub images: Vec<String>,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn builder() -> VehicleBuilder {
        VehicleBuilder::new()
    }

    /// date of the chronologically latest service entry
    pub fn last_serviced_at(&self) -> Option<DateTime<Utc>> {
        self.last_serviced_at
    }

    /// odometer reading associated with the latest service entry that
    /// carried one
    pub fn last_serviced_km(&self) -> Option<u64> {
        self.last_serviced_km
    }

    /// attach an image path reference
    pub fn attach_image(&mut self, path: impl Into<String>) {
        self.images.push(path.into());
    }

    /// remove an image path reference; returns whether it was present
    pub fn remove_image(&mut self, path: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|p| p != path);
        self.images.len() != before
    }

    /// attach a document path reference
    pub fn attach_document(&mut self, path: impl Into<String>) {
        self.documents.push(path.into());
    }

    /// remove a document path reference; returns whether it was present
    pub fn remove_document(&mut self, path: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|p| p != path);
        self.documents.len() != before
    }
}

/// normalize a plate for identity comparisons: trimmed, upper-cased
pub(crate) fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

/// builder for registering vehicles
pub struct VehicleBuilder {
    plate: Option<String>,
    owner_id: Option<OwnerId>,
    brand: Option<String>,
    model: Option<String>,
    hourly_rate: Option<Money>,
    daily_rate: Option<Money>,
    status: VehicleStatus,
}

impl VehicleBuilder {
    pub fn new() -> Self {
        Self {
            plate: None,
            owner_id: None,
            brand: None,
            model: None,
            hourly_rate: None,
            daily_rate: None,
            status: VehicleStatus::Available,
        }
    }

    pub fn plate(mut self, plate: impl Into<String>) -> Self {
        self.plate = Some(plate.into());
        self
    }

    pub fn owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn hourly_rate(mut self, rate: Money) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    pub fn daily_rate(mut self, rate: Money) -> Self {
        self.daily_rate = Some(rate);
        self
    }

    pub fn status(mut self, status: VehicleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self, time: &SafeTimeProvider) -> Result<Vehicle> {
        let plate = normalize_plate(self.plate.as_deref().unwrap_or(""));
        if plate.is_empty() {
            return Err(RentalError::MissingPlate);
        }

        let hourly_rate = self.hourly_rate.unwrap_or(Money::ZERO);
        if hourly_rate.is_negative() {
            return Err(RentalError::InvalidRate {
                field: "hourly_rate",
                amount: hourly_rate,
            });
        }
        let daily_rate = self.daily_rate.unwrap_or(Money::ZERO);
        if daily_rate.is_negative() {
            return Err(RentalError::InvalidRate {
                field: "daily_rate",
                amount: daily_rate,
            });
        }

        Ok(Vehicle {
            id: Uuid::new_v4(),
            plate,
            owner_id: self.owner_id.unwrap_or_else(Uuid::nil),
            brand: self.brand.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            hourly_rate,
            daily_rate,
            status: self.status,
            maintenance_history: Vec::new(),
            last_serviced_at: None,
            last_serviced_km: None,
            images: Vec::new(),
            documents: Vec::new(),
            created_at: time.now(),
        })
    }
}

impl Default for VehicleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
