/// reports - revenue rollups and the json snapshot
use fleet_rental_rs::{
    BookingRequest, FleetSnapshot, FleetStore, MemoryStore, Money, RentalDesk, RentalStatus,
    RentalUpdate, ReportAggregator, ReportFilter, SafeTimeProvider, TimeSource, Vehicle,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let store = MemoryStore::new();

    let splendor = Vehicle::builder()
        .plate("KA-05-HJ-55")
        .brand("Hero")
        .model("Splendor")
        .hourly_rate(Money::from_major(100))
        .daily_rate(Money::from_major(1000))
        .build(&time)?;
    let activa = Vehicle::builder()
        .plate("KA-05-HJ-56")
        .brand("Honda")
        .model("Activa")
        .hourly_rate(Money::from_major(80))
        .daily_rate(Money::from_major(700))
        .build(&time)?;
    store.save_vehicle(&splendor)?;
    store.save_vehicle(&activa)?;

    let mut desk = RentalDesk::new(&store);
    for (vehicle, start, end) in [
        (&splendor, "2024-06-01T09:00:00Z", "2024-06-02T11:00:00Z"),
        (&splendor, "2024-06-20T09:00:00Z", "2024-07-01T09:00:00Z"),
        (&activa, "2024-07-03T10:00:00Z", "2024-07-04T10:00:00Z"),
    ] {
        let rental = desk.open(
            &BookingRequest {
                car_id: vehicle.id,
                start_time: start.to_string(),
                end_time: Some(end.to_string()),
                customer_name: "Walk-in".to_string(),
                customer_phone: "9123456780".to_string(),
                ..Default::default()
            },
            &time,
        )?;
        desk.revise(
            rental.id,
            &RentalUpdate {
                status: Some(RentalStatus::Completed),
                is_settled: Some(true),
                ..Default::default()
            },
            &time,
        )?;
    }

    let reports = ReportAggregator::new(&store);

    // june revenue, recognized on the return date
    let june = reports.rental_report(&ReportFilter {
        month: Some("2024-06".to_string()),
        ..Default::default()
    })?;
    println!("june rentals: {}, collected {}", june.count, june.total_collected);

    let stats = reports.stats_report()?;
    for row in &stats.per_car {
        let label = row
            .vehicle
            .as_ref()
            .map(|v| format!("{} {} ({})", v.brand, v.model, v.plate))
            .unwrap_or_else(|| "unregistered".to_string());
        println!("{label}: {} over {} rentals", row.total_collected, row.rental_count);
    }
    for row in &stats.monthly {
        println!("{}: {} over {} bookings", row.month, row.total_collected, row.rental_count);
    }

    // the whole fleet state round-trips through json
    let snapshot = FleetSnapshot::capture(&store, &time)?;
    let json = snapshot.to_json_pretty()?;
    let restored = MemoryStore::new();
    FleetSnapshot::from_json(&json)?.restore_into(&restored)?;
    println!(
        "snapshot restored {} vehicles, {} rentals",
        snapshot.vehicles.len(),
        snapshot.rentals.len()
    );

    Ok(())
}
