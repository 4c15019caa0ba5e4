//! Read-only fleet report.
//!
//! Opens the store named by `FLEET_DB_PATH` and prints a one-screen summary.
//! Useful as a smoke check that `fleet_core` links and the schema opens.

use fleet_core::db::open_db;
use fleet_core::{init_logging, FleetConfig, FleetService, LastUpdate};
use log::info;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let config = FleetConfig::from_env()?;

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = open_db(&config.db_path)?;
    let service =
        FleetService::from_connection(&conn).with_audit_actor(config.audit_actor.clone());

    let vehicles = service.get_all_vehicles()?;
    let available = vehicles.iter().filter(|vehicle| vehicle.available).count();
    let bookings = service.list_bookings()?;

    println!("fleet_core version={}", fleet_core::core_version());
    println!("store={}", config.db_path.display());
    println!("vehicles={} available={}", vehicles.len(), available);
    println!("bookings={}", bookings.len());

    match service.customer_with_most_rentals()? {
        Some(top) => println!("top_customer={} bookings={}", top.customer_id, top.bookings),
        None => println!("top_customer=none (no bookings found)"),
    }

    match service.most_rented_model()? {
        Some(top) => println!("top_model={} bookings={}", top.model, top.bookings),
        None => println!("top_model=none (no bookings found)"),
    }

    match service.get_last_updated_vehicle()? {
        LastUpdate::Found { vehicle, change } => println!(
            "last_update vehicle_id={} ({} {}) field={} old={} new={} by={} at={}",
            vehicle.id,
            vehicle.company,
            vehicle.model,
            change.field,
            change.old_value,
            change.new_value,
            change.updated_by,
            change.timestamp.to_rfc3339()
        ),
        LastUpdate::VehicleGone { change } => println!(
            "last_update vehicle_id={} (deleted) field={} at={}",
            change.vehicle_id,
            change.field,
            change.timestamp.to_rfc3339()
        ),
        LastUpdate::NoHistory => println!("last_update=none (no update history)"),
    }

    info!(
        "event=fleet_report module=cli status=ok vehicles={} bookings={}",
        vehicles.len(),
        bookings.len()
    );
    Ok(())
}
