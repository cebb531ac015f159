/// rental lifecycle - conflicts, repricing, deletion, events
use fleet_rental_rs::{
    BookingRequest, FleetStore, MemoryStore, Money, RentalDesk, RentalStatus, RentalUpdate,
    SafeTimeProvider, TimeSource, Vehicle, VehicleStatus,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let store = MemoryStore::new();

    let vehicle = Vehicle::builder()
        .plate("MH-12-DE-1433")
        .brand("Honda")
        .model("Activa")
        .hourly_rate(Money::from_major(80))
        .daily_rate(Money::from_major(700))
        .build(&time)?;
    store.save_vehicle(&vehicle)?;

    let mut desk = RentalDesk::new(&store);

    // open-ended booking: no committed rent until a return time is known
    let booking = BookingRequest {
        car_id: vehicle.id,
        start_time: "2024-06-10T08:00:00Z".to_string(),
        customer_name: "Asha Patil".to_string(),
        customer_phone: "9000011122".to_string(),
        ..Default::default()
    };
    let rental = desk.open(&booking, &time)?;
    println!("rent while ongoing: {}", rental.total_rent);

    // the same vehicle cannot be double-booked
    match desk.open(&booking, &time) {
        Err(e) => println!("second booking rejected: {e}"),
        Ok(_) => unreachable!("the desk must refuse a held vehicle"),
    }

    // the return fixes the end time; the desk reprices and releases the
    // vehicle
    let returned = desk.revise(
        rental.id,
        &RentalUpdate {
            end_time: Some("2024-06-11T10:30:00Z".to_string()),
            status: Some(RentalStatus::Completed),
            ghata_amount: Some(Money::from_major(150)),
            ghata_reason: Some("scratched panel".to_string()),
            ..Default::default()
        },
        &time,
    )?;
    println!("repriced rent: {}", returned.total_rent);
    println!("collected:     {}", returned.final_amount_collected());
    println!(
        "vehicle back on the lot: {}",
        store.vehicle(vehicle.id)?.status == VehicleStatus::Available
    );

    for event in desk.drain_events() {
        println!("event: {event:?}");
    }

    Ok(())
}
