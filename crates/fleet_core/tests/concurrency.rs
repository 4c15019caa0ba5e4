use fleet_core::db::open_db;
use fleet_core::{
    AuditStatus, FleetError, FleetService, RepoResult, SqliteAuditRepository,
    SqliteBookingRepository, SqliteVehicleRepository, Vehicle, VehicleDraft, VehicleId,
    VehicleRepository, VehicleUpdate,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Barrier;

fn camry() -> VehicleDraft {
    VehicleDraft {
        company: "Toyota".to_string(),
        model: "Camry".to_string(),
        kms: 50_000,
        year: 2020,
        color: "Blue".to_string(),
        available: true,
    }
}

fn audit_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM audit_log;", [], |row| row.get(0))
        .unwrap()
}

/// Vehicle repository whose reads are immediately followed by a delete from
/// a second connection, reproducing a delete landing between read and write.
struct DeleteAfterRead<'conn> {
    inner: SqliteVehicleRepository<'conn>,
    rival: &'conn Connection,
}

impl VehicleRepository for DeleteAfterRead<'_> {
    fn ensure_schema(&self) -> RepoResult<()> {
        self.inner.ensure_schema()
    }

    fn create(&self, draft: &VehicleDraft) -> RepoResult<Vehicle> {
        self.inner.create(draft)
    }

    fn get_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let found = self.inner.get_by_id(id)?;
        FleetService::from_connection(self.rival)
            .delete_vehicle(id)
            .expect("rival delete should succeed");
        Ok(found)
    }

    fn list(&self) -> RepoResult<Vec<Vehicle>> {
        self.inner.list()
    }

    fn update(&self, vehicle: &Vehicle) -> RepoResult<bool> {
        self.inner.update(vehicle)
    }

    fn delete(&self, id: VehicleId) -> RepoResult<usize> {
        self.inner.delete(id)
    }
}

#[test]
fn delete_between_read_and_write_turns_update_into_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.sqlite3");
    let conn = open_db(&path).unwrap();
    let rival = open_db(&path).unwrap();

    let service = FleetService::from_connection(&conn);
    let created = service.create_vehicle(None, &camry()).unwrap();

    let mut first = camry();
    first.kms = 51_000;
    let outcome = service.update_vehicle(created.id, &first).unwrap();
    assert_eq!(outcome.audit, AuditStatus::Recorded(1));

    let racing = FleetService::new(
        DeleteAfterRead {
            inner: SqliteVehicleRepository::new(&conn),
            rival: &rival,
        },
        SqliteAuditRepository::new(&conn),
        SqliteBookingRepository::new(&conn),
    );
    let mut second = camry();
    second.color = "Red".to_string();
    let err = racing.update_vehicle(created.id, &second).unwrap_err();

    assert!(matches!(err, FleetError::NotFound(id) if id == created.id));
    assert_eq!(audit_row_count(&conn), 1);
    assert!(service.get_all_vehicles().unwrap().is_empty());
}

#[test]
fn concurrent_updates_and_delete_never_lose_audited_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.sqlite3");
    let conn = open_db(&path).unwrap();
    let id = FleetService::from_connection(&conn)
        .create_vehicle(None, &camry())
        .unwrap()
        .id;

    let barrier = Barrier::new(3);
    let (update_results, delete_result) = std::thread::scope(|scope| {
        let updates: Vec<_> = [0u8, 1u8]
            .into_iter()
            .map(|variant| {
                let barrier = &barrier;
                let path = path.as_path();
                scope.spawn(move || run_update(path, id, variant, barrier))
            })
            .collect();
        let delete = {
            let barrier = &barrier;
            let path = path.as_path();
            scope.spawn(move || {
                let conn = open_db(path).unwrap();
                let service = FleetService::from_connection(&conn);
                barrier.wait();
                service.delete_vehicle(id)
            })
        };

        let update_results: Vec<_> = updates
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        (update_results, delete.join().unwrap())
    });

    assert_eq!(delete_result.unwrap().id, id);

    let mut audited = 0;
    for result in update_results {
        match result {
            Ok(outcome) => {
                assert_eq!(outcome.audit, AuditStatus::Recorded(outcome.changes.len()));
                audited += outcome.changes.len() as i64;
            }
            Err(FleetError::NotFound(missing)) => assert_eq!(missing, id),
            Err(other) => panic!("unexpected update error: {other}"),
        }
    }

    let service = FleetService::from_connection(&conn);
    assert!(service.get_all_vehicles().unwrap().is_empty());
    assert_eq!(audit_row_count(&conn), audited);
}

fn run_update(
    path: &Path,
    id: VehicleId,
    variant: u8,
    barrier: &Barrier,
) -> Result<VehicleUpdate, FleetError> {
    let conn = open_db(path).unwrap();
    let service = FleetService::from_connection(&conn);
    let mut draft = camry();
    if variant == 0 {
        draft.kms = 60_000;
    } else {
        draft.color = "Red".to_string();
    }
    barrier.wait();
    service.update_vehicle(id, &draft)
}
