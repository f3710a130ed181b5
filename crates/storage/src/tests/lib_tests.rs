use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn total_is_zero_without_confirmations() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.total_attendees().await.expect("total"), 0);
}

#[tokio::test]
async fn total_sums_party_sizes() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for size in [3, 1, 4] {
        storage
            .record_confirmation(PartySize::new(size).expect("size"))
            .await
            .expect("record");
    }
    assert_eq!(storage.total_attendees().await.expect("total"), 8);

    let records = storage.list_confirmations().await.expect("records");
    let sizes: Vec<u32> = records.iter().map(|r| r.party_size.get()).collect();
    assert_eq!(sizes, vec![3, 1, 4]);
    assert!(records[0].recorded_at <= records[2].recorded_at);
}

#[tokio::test]
async fn flags_default_to_false_and_can_be_set() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(!storage.get_flag("isConfirmed").await.expect("get"));

    storage.set_flag("isConfirmed", true).await.expect("set");
    assert!(storage.get_flag("isConfirmed").await.expect("get"));
    assert!(!storage.get_flag("other").await.expect("get"));

    storage.set_flag("isConfirmed", false).await.expect("overwrite");
    assert!(!storage.get_flag("isConfirmed").await.expect("get"));
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn bare_file_path_is_opened_and_parent_created() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("state").join("rsvp_state.db");

    let storage = Storage::new(&db_path.to_string_lossy())
        .await
        .expect("db from bare path");
    storage.set_flag("isConfirmed", true).await.expect("set");
    drop(storage);

    assert!(db_path.exists(), "missing {}", db_path.display());
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:C:\\Users\\host\\rsvp.db"),
        "sqlite://C:/Users/host/rsvp.db"
    );
    assert_eq!(
        sqlite_file_path(&normalize_database_url("./data/x.db")),
        Some(PathBuf::from("./data/x.db"))
    );
}

#[test]
fn keeps_memory_and_full_urls() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url(" sqlite://./data/x.db "),
        "sqlite://./data/x.db"
    );
    assert_eq!(normalize_database_url("   "), "");
}

#[test]
fn memory_urls_have_no_file_path() {
    assert_eq!(sqlite_file_path("sqlite::memory:"), None);
    assert_eq!(sqlite_file_path("postgres://db"), None);
    assert_eq!(
        sqlite_file_path("sqlite://./data/state.db?mode=rwc"),
        Some(PathBuf::from("./data/state.db"))
    );
}
