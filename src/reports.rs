use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{RentalError, Result};
use crate::rental::Rental;
use crate::store::{FleetStore, RentalQuery};
use crate::types::{month_key, parse_month_key, VehicleId};

/// query parameters for a revenue report
///
/// Precedence: an explicit `start_date` **and** `end_date` pair windows on
/// the return date; otherwise `month` (YYYY-MM) windows the calendar
/// month; otherwise only returned rentals match. A lone date bound does
/// not form a window and falls through. `car_id` always restricts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub car_id: Option<VehicleId>,
    pub month: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// matched rentals with their collected total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalReport {
    pub rentals: Vec<Rental>,
    pub total_collected: Money,
    pub count: usize,
}

/// display label for a per-car stats row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleLabel {
    pub plate: String,
    pub brand: String,
    pub model: String,
}

/// revenue rollup for one vehicle, all rentals regardless of date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarStats {
    pub car_id: VehicleId,
    /// absent when the vehicle record was deleted after the rentals
    pub vehicle: Option<VehicleLabel>,
    pub total_collected: Money,
    pub rental_count: usize,
}

/// revenue rollup for one booking month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    pub total_collected: Money,
    pub rental_count: usize,
}

/// fleet-wide rollups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetStats {
    pub per_car: Vec<CarStats>,
    pub monthly: Vec<MonthlyStats>,
}

enum Window {
    Dates(NaiveDate, NaiveDate),
    Month(i32, u32),
    ReturnedOnly,
}

/// read-side revenue rollups over the persisted rental set
pub struct ReportAggregator<'a, S: FleetStore> {
    store: &'a S,
}

impl<'a, S: FleetStore> ReportAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// filtered revenue report; revenue is recognized on return, so a
    /// rental without an end time never matches
    pub fn rental_report(&self, filter: &ReportFilter) -> Result<RentalReport> {
        let window = match (filter.start_date, filter.end_date, &filter.month) {
            (Some(from), Some(to), _) => Window::Dates(from, to),
            (_, _, Some(month)) => {
                let (year, month) = parse_month_key(month)?;
                Window::Month(year, month)
            }
            _ => Window::ReturnedOnly,
        };

        let mut query = RentalQuery::all();
        query.car_id = filter.car_id;
        let mut rentals = self.store.rentals(&query)?;

        rentals.retain(|rental| match (&window, rental.end_time) {
            (_, None) => false,
            (Window::Dates(from, to), Some(end)) => {
                let returned = end.date_naive();
                returned >= *from && returned <= *to
            }
            (Window::Month(year, month), Some(end)) => {
                end.year() == *year && end.month() == *month
            }
            (Window::ReturnedOnly, Some(_)) => true,
        });
        rentals.sort_by_key(|r| r.start_time);

        let total_collected = rentals.iter().map(|r| r.final_amount_collected()).sum();
        let count = rentals.len();

        Ok(RentalReport {
            rentals,
            total_collected,
            count,
        })
    }

    /// fleet-wide rollups: per vehicle over all rentals, and per booking
    /// month of the start time (deliberately not the return month)
    pub fn stats_report(&self) -> Result<FleetStats> {
        let rentals = self.store.rentals(&RentalQuery::all())?;

        let mut by_car: HashMap<VehicleId, (Money, usize)> = HashMap::new();
        let mut by_month: HashMap<String, (Money, usize)> = HashMap::new();
        for rental in &rentals {
            let car = by_car.entry(rental.car_id).or_insert((Money::ZERO, 0));
            car.0 += rental.final_amount_collected();
            car.1 += 1;

            let month = by_month
                .entry(month_key(rental.start_time))
                .or_insert((Money::ZERO, 0));
            month.0 += rental.final_amount_collected();
            month.1 += 1;
        }

        let mut per_car = Vec::with_capacity(by_car.len());
        for (car_id, (total_collected, rental_count)) in by_car {
            let vehicle = match self.store.vehicle(car_id) {
                Ok(v) => Some(VehicleLabel {
                    plate: v.plate,
                    brand: v.brand,
                    model: v.model,
                }),
                Err(RentalError::VehicleNotFound { .. }) => None,
                Err(e) => return Err(e),
            };
            per_car.push(CarStats {
                car_id,
                vehicle,
                total_collected,
                rental_count,
            });
        }
        per_car.sort_by(|a, b| {
            b.total_collected
                .cmp(&a.total_collected)
                .then_with(|| a.car_id.cmp(&b.car_id))
        });

        let mut monthly: Vec<MonthlyStats> = by_month
            .into_iter()
            .map(|(month, (total_collected, rental_count))| MonthlyStats {
                month,
                total_collected,
                rental_count,
            })
            .collect();
        monthly.sort_by(|a, b| b.month.cmp(&a.month));

        Ok(FleetStats { per_car, monthly })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::Adjustments;
    use crate::store::{FleetStore, MemoryStore};
    use crate::types::Customer;
    use crate::vehicle::Vehicle;
    use chrono::{DateTime, TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use uuid::Uuid;

    fn clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn seed_vehicle(store: &MemoryStore, plate: &str) -> Vehicle {
        let vehicle = Vehicle::builder()
            .plate(plate)
            .brand("Hero")
            .model("Splendor")
            .hourly_rate(Money::from_major(100))
            .daily_rate(Money::from_major(1000))
            .build(&clock())
            .unwrap();
        store.save_vehicle(&vehicle).unwrap();
        vehicle
    }

    fn seed_rental(
        store: &MemoryStore,
        car_id: VehicleId,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        collected: i64,
    ) -> Rental {
        let mut rental = Rental::open(
            car_id,
            Uuid::new_v4(),
            start,
            end,
            Customer {
                name: "Meena".to_string(),
                phone: "7777000033".to_string(),
                occupation: None,
            },
            Money::from_major(collected),
            true,
            Adjustments::none(),
            false,
            start,
        );
        if end.is_some() {
            rental.status = crate::types::RentalStatus::Completed;
        }
        store.save_rental(&rental).unwrap();
        rental
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_default_filter_excludes_ongoing() {
        let store = MemoryStore::new();
        let v = seed_vehicle(&store, "KA-11-A-1");
        seed_rental(&store, v.id, at(2024, 5, 1), Some(at(2024, 5, 3)), 1200);
        seed_rental(&store, v.id, at(2024, 7, 1), None, 999);

        let report = ReportAggregator::new(&store)
            .rental_report(&ReportFilter::default())
            .unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.total_collected, Money::from_major(1200));
        assert!(report.rentals.iter().all(|r| r.end_time.is_some()));
    }

    #[test]
    fn test_month_filter_windows_on_return_date() {
        let store = MemoryStore::new();
        let v = seed_vehicle(&store, "KA-11-A-2");
        // booked in may, returned in june: counts toward june
        seed_rental(&store, v.id, at(2024, 5, 30), Some(at(2024, 6, 2)), 800);
        seed_rental(&store, v.id, at(2024, 6, 10), Some(at(2024, 6, 12)), 700);
        seed_rental(&store, v.id, at(2024, 7, 1), Some(at(2024, 7, 2)), 500);

        let filter = ReportFilter {
            month: Some("2024-06".to_string()),
            ..Default::default()
        };
        let report = ReportAggregator::new(&store).rental_report(&filter).unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.total_collected, Money::from_major(1500));
    }

    #[test]
    fn test_bad_month_key_is_a_validation_error() {
        let store = MemoryStore::new();
        let filter = ReportFilter {
            month: Some("06-2024".to_string()),
            ..Default::default()
        };
        let err = ReportAggregator::new(&store).rental_report(&filter).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Validation);
    }

    #[test]
    fn test_date_pair_takes_precedence_over_month() {
        let store = MemoryStore::new();
        let v = seed_vehicle(&store, "KA-11-A-3");
        seed_rental(&store, v.id, at(2024, 6, 1), Some(at(2024, 6, 2)), 700);
        seed_rental(&store, v.id, at(2024, 7, 1), Some(at(2024, 7, 2)), 500);

        let filter = ReportFilter {
            month: Some("2024-06".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 31),
            ..Default::default()
        };
        let report = ReportAggregator::new(&store).rental_report(&filter).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.total_collected, Money::from_major(500));
    }

    #[test]
    fn test_date_window_is_inclusive() {
        let store = MemoryStore::new();
        let v = seed_vehicle(&store, "KA-11-A-4");
        seed_rental(&store, v.id, at(2024, 6, 1), Some(at(2024, 6, 5)), 300);

        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 5),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 5),
            ..Default::default()
        };
        let report = ReportAggregator::new(&store).rental_report(&filter).unwrap();
        assert_eq!(report.count, 1);
    }

    #[test]
    fn test_lone_date_bound_falls_through() {
        let store = MemoryStore::new();
        let v = seed_vehicle(&store, "KA-11-A-5");
        seed_rental(&store, v.id, at(2024, 6, 1), Some(at(2024, 6, 2)), 700);

        // a start date alone does not form a window; the default
        // returned-only filter applies
        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..Default::default()
        };
        let report = ReportAggregator::new(&store).rental_report(&filter).unwrap();
        assert_eq!(report.count, 1);
    }

    #[test]
    fn test_car_filter_restricts_alongside_dates() {
        let store = MemoryStore::new();
        let a = seed_vehicle(&store, "KA-11-A-6");
        let b = seed_vehicle(&store, "KA-11-B-6");
        seed_rental(&store, a.id, at(2024, 6, 1), Some(at(2024, 6, 2)), 700);
        seed_rental(&store, b.id, at(2024, 6, 3), Some(at(2024, 6, 4)), 900);

        let filter = ReportFilter {
            car_id: Some(b.id),
            month: Some("2024-06".to_string()),
            ..Default::default()
        };
        let report = ReportAggregator::new(&store).rental_report(&filter).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.total_collected, Money::from_major(900));
    }

    #[test]
    fn test_empty_match_is_not_an_error() {
        let store = MemoryStore::new();
        let report = ReportAggregator::new(&store)
            .rental_report(&ReportFilter::default())
            .unwrap();
        assert_eq!(report.count, 0);
        assert_eq!(report.total_collected, Money::ZERO);
        assert!(report.rentals.is_empty());
    }

    #[test]
    fn test_stats_group_by_car_and_booking_month() {
        let store = MemoryStore::new();
        let a = seed_vehicle(&store, "KA-11-A-7");
        let b = seed_vehicle(&store, "KA-11-B-7");
        // booked in june, returned in july: the monthly rollup keys on
        // the booking month
        seed_rental(&store, a.id, at(2024, 6, 28), Some(at(2024, 7, 2)), 1000);
        seed_rental(&store, a.id, at(2024, 7, 10), Some(at(2024, 7, 12)), 600);
        seed_rental(&store, b.id, at(2024, 7, 15), None, 0);

        let stats = ReportAggregator::new(&store).stats_report().unwrap();

        assert_eq!(stats.per_car.len(), 2);
        assert_eq!(stats.per_car[0].car_id, a.id);
        assert_eq!(stats.per_car[0].total_collected, Money::from_major(1600));
        assert_eq!(stats.per_car[0].rental_count, 2);
        let label = stats.per_car[0].vehicle.as_ref().unwrap();
        assert_eq!(label.plate, "KA-11-A-7");
        assert_eq!(label.brand, "Hero");

        assert_eq!(stats.monthly.len(), 2);
        // sorted descending by month key
        assert_eq!(stats.monthly[0].month, "2024-07");
        assert_eq!(stats.monthly[0].total_collected, Money::from_major(600));
        assert_eq!(stats.monthly[0].rental_count, 2);
        assert_eq!(stats.monthly[1].month, "2024-06");
        assert_eq!(stats.monthly[1].total_collected, Money::from_major(1000));
    }

    #[test]
    fn test_stats_keep_rentals_of_deleted_vehicles() {
        let store = MemoryStore::new();
        let v = seed_vehicle(&store, "KA-11-A-8");
        seed_rental(&store, v.id, at(2024, 6, 1), Some(at(2024, 6, 2)), 400);
        store.remove_vehicle(v.id).unwrap();

        let stats = ReportAggregator::new(&store).stats_report().unwrap();
        assert_eq!(stats.per_car.len(), 1);
        assert!(stats.per_car[0].vehicle.is_none());
        assert_eq!(stats.per_car[0].total_collected, Money::from_major(400));
    }
}
