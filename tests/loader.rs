//! End-to-end ingestion into the in-memory store.

use std::io::Write;

use places::loader::load_file;
use places::store::{BulkPolicy, MemoryStore, PlaceStore, StoreError};

const HEADER: &str = "ID\tName\tAddress\tPhone\tLongitude\tLatitude\n";

fn places_file(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(HEADER.as_bytes()).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_load_makes_every_id_addressable() {
    let file = places_file(&[
        "1\tSushi Wok\tgorod Moskva, ulitsa Abramtsevskaja, dom 1\t(499) 754-44-44\t37.714565\t55.879001",
        "2\tRyba i mjaso na ugljah\tgorod Moskva, ulitsa Abramtsevskaja, dom 13\t(495) 411-35-71\t37.602112\t55.880011",
        "3\tHleb nasuschnyj\tgorod Moskva, ulitsa Arbat, dom 6/2\t(495) 984-91-82\t37.595604\t55.751748",
    ]);

    let store = MemoryStore::new();
    let report = load_file(&store, file.path(), BulkPolicy::BestEffort)
        .await
        .unwrap();

    assert_eq!(report.submitted, 3);
    assert!(report.is_complete());
    assert_eq!(store.count().await.unwrap(), 3);

    let sushi = store.get("1").unwrap();
    assert_eq!(sushi.name, "Sushi Wok");
    assert_eq!(sushi.location.lon, 37.714565);
    assert_eq!(sushi.location.lat, 55.879001);
    assert!(store.get("3").is_some());
}

#[tokio::test]
async fn test_reload_overwrites_instead_of_duplicating() {
    let store = MemoryStore::new();

    let first = places_file(&["1\tOld name\taddr\tphone\t1\t2", "2\tOther\taddr\tphone\t3\t4"]);
    load_file(&store, first.path(), BulkPolicy::BestEffort)
        .await
        .unwrap();

    let second = places_file(&["1\tNew name\taddr\tphone\t1\t2", "2\tOther\taddr\tphone\t3\t4"]);
    load_file(&store, second.path(), BulkPolicy::BestEffort)
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(store.get("1").unwrap().name, "New name");
}

#[tokio::test]
async fn test_bad_coordinates_keep_the_row() {
    let file = places_file(&["1\tNowhere\taddr\tphone\tn/a\t55.1"]);

    let store = MemoryStore::new();
    load_file(&store, file.path(), BulkPolicy::BestEffort)
        .await
        .unwrap();

    let place = store.get("1").unwrap();
    assert_eq!(place.location.lon, 0.0);
    assert_eq!(place.location.lat, 55.1);
}

#[tokio::test]
async fn test_partial_failure_depends_on_policy() {
    let file = places_file(&["1\tGood\taddr\tphone\t1\t2", "\tNo id\taddr\tphone\t3\t4"]);

    let store = MemoryStore::new();
    let report = load_file(&store, file.path(), BulkPolicy::BestEffort)
        .await
        .unwrap();
    assert_eq!(report.submitted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.indexed(), 1);

    let err = load_file(&store, file.path(), BulkPolicy::FailFast)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::PartialBulk { failed: 1, total: 2 })
    ));
}

#[tokio::test]
async fn test_missing_file_fails_without_writing() {
    let store = MemoryStore::new();
    let result = load_file(
        &store,
        std::path::Path::new("/nonexistent/data.csv"),
        BulkPolicy::BestEffort,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(store.count().await.unwrap(), 0);
}
