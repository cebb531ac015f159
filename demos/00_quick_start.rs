/// quick start - book a vehicle and settle the rental
use fleet_rental_rs::{
    BookingRequest, FleetStore, MemoryStore, Money, RentalDesk, RentalStatus, RentalUpdate,
    SafeTimeProvider, TimeSource, Vehicle,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let store = MemoryStore::new();

    // register a vehicle at 100/hour, 1000/day
    let vehicle = Vehicle::builder()
        .plate("ka-01-ab-1234")
        .brand("Hero")
        .model("Splendor")
        .hourly_rate(Money::from_major(100))
        .daily_rate(Money::from_major(1000))
        .build(&time)?;
    store.save_vehicle(&vehicle)?;

    // book it for 26 hours: 1 day + 2 hours = 1200
    let mut desk = RentalDesk::new(&store);
    let rental = desk.open(
        &BookingRequest {
            car_id: vehicle.id,
            start_time: "2024-06-01T09:00:00Z".to_string(),
            end_time: Some("2024-06-02T11:00:00Z".to_string()),
            customer_name: "Ravi Kumar".to_string(),
            customer_phone: "9876543210".to_string(),
            deduction_amount: Some(Money::from_major(200)),
            deduction_reason: Some("fuel shortfall".to_string()),
            chot: Some(Money::from_major(50)),
            ..Default::default()
        },
        &time,
    )?;

    println!("total rent: {}", rental.total_rent);
    println!("collected:  {}", rental.final_amount_collected());

    // the customer returns the vehicle
    let settled = desk.revise(
        rental.id,
        &RentalUpdate {
            status: Some(RentalStatus::Completed),
            is_settled: Some(true),
            ..Default::default()
        },
        &time,
    )?;
    println!("settled:    {}", settled.is_settled);

    Ok(())
}
