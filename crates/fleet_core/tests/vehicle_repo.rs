use fleet_core::db::open_db_in_memory;
use fleet_core::{
    RepoError, SqliteVehicleRepository, ValidationError, Vehicle, VehicleDraft,
    VehicleRepository,
};

fn draft(company: &str, model: &str) -> VehicleDraft {
    VehicleDraft {
        company: company.to_string(),
        model: model.to_string(),
        kms: 25_000,
        year: 2022,
        color: "White".to_string(),
        available: true,
    }
}

#[test]
fn create_assigns_ids_and_get_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::new(&conn);

    let first = repo.create(&draft("Toyota", "Corolla")).unwrap();
    let second = repo.create(&draft("Honda", "Civic")).unwrap();
    assert_ne!(first.id, second.id);

    let loaded = repo.get_by_id(first.id).unwrap().unwrap();
    assert_eq!(loaded, first);
    assert_eq!(loaded.model, "Corolla");
}

#[test]
fn get_missing_id_is_absent_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::new(&conn);

    assert!(repo.get_by_id(42).unwrap().is_none());
}

#[test]
fn update_replaces_every_field_and_reports_affected_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::new(&conn);
    let created = repo.create(&draft("Toyota", "Camry")).unwrap();

    let replacement = Vehicle {
        id: created.id,
        company: "Toyota".to_string(),
        model: "Camry Hybrid".to_string(),
        kms: 31_000,
        year: 2023,
        color: "Silver".to_string(),
        available: false,
    };
    assert!(repo.update(&replacement).unwrap());
    assert_eq!(repo.get_by_id(created.id).unwrap().unwrap(), replacement);

    let ghost = Vehicle {
        id: created.id + 100,
        ..replacement
    };
    assert!(!repo.update(&ghost).unwrap());
}

#[test]
fn delete_returns_removed_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::new(&conn);
    let created = repo.create(&draft("Ford", "Focus")).unwrap();

    assert_eq!(repo.delete(created.id).unwrap(), 1);
    assert_eq!(repo.delete(created.id).unwrap(), 0);
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::new(&conn);

    let first = repo.create(&draft("Ford", "Focus")).unwrap();
    repo.delete(first.id).unwrap();
    let second = repo.create(&draft("Ford", "Fiesta")).unwrap();

    assert!(second.id > first.id);
}

#[test]
fn validation_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::new(&conn);

    let err = repo.create(&draft("", "Civic")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyText("company"))
    ));

    let mut created = repo.create(&draft("Honda", "Civic")).unwrap();
    created.color = " ".to_string();
    let err = repo.update(&created).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyText("color"))
    ));
}

#[test]
fn corrupt_rows_are_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO vehicles (company, model, kms, year, color, available)
         VALUES ('Kia', 'Rio', 1000, 2019, 'Grey', 7);",
    )
    .unwrap();
    let repo = SqliteVehicleRepository::new(&conn);

    let err = repo.list().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("available")));
}
