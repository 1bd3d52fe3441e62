//! Tests for the two habit stores behind the shared trait

use chrono::Utc;
use habit_calendar::*;
use tempfile::TempDir;

fn draft(name: &str, color: &str) -> HabitDraft {
    HabitDraft::new(name, "", color, Utc::now(), CompletedDays::new()).unwrap()
}

fn user(token: &str) -> Caller {
    Caller::from_token(Some(token))
}

/// Same behavior expected from either backend
async fn exercise_store(store: &dyn HabitStore, caller: &Caller) {
    let day = DayKey::from_ymd(2024, 3, 5).unwrap();

    store.create(caller, draft("Read", "green")).await.unwrap();
    assert!(matches!(
        store.create(caller, draft("Read", "green")).await,
        Err(StorageError::DuplicateHabit { .. })
    ));

    assert!(store.toggle(caller, "Read", day).await.unwrap());
    assert!(!store.toggle(caller, "Read", day).await.unwrap());
    assert!(store.toggle(caller, "Read", day).await.unwrap());

    assert!(matches!(
        store.toggle(caller, "Missing", day).await,
        Err(StorageError::HabitNotFound { .. })
    ));

    let habits = store.list(caller).await.unwrap();
    assert_eq!(habits.len(), 1);
    assert!(habits[0].is_completed_on(day));
    assert_eq!(habits[0].color, HabitColor::Green);

    store.delete(caller, "Read").await.unwrap();
    assert!(store.list(caller).await.unwrap().is_empty());
    assert!(matches!(
        store.delete(caller, "Read").await,
        Err(StorageError::HabitNotFound { .. })
    ));
}

#[tokio::test]
async fn test_file_store_contract() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("habits.json"), DayZone::utc());
    exercise_store(&store, &Caller::Anonymous).await;
}

#[tokio::test]
async fn test_sqlite_store_contract() {
    let store = SqliteStore::open_in_memory().unwrap();
    exercise_store(&store, &user("user-1")).await;
}

#[test]
fn test_sqlite_store_isolates_owners() {
    tokio_test::block_on(async {
        let store = SqliteStore::open_in_memory().unwrap();
        let alice = user("alice");
        let bob = user("bob");

        store.create(&alice, draft("Read", "red")).await.unwrap();
        // Names only need to be unique per owner
        store.create(&bob, draft("Read", "red")).await.unwrap();
        store.delete(&bob, "Read").await.unwrap();

        assert_eq!(store.list(&alice).await.unwrap().len(), 1);
        assert!(store.list(&bob).await.unwrap().is_empty());
    });
}

#[tokio::test]
async fn test_file_document_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("habits.json");
    let day = DayKey::from_ymd(2024, 3, 5).unwrap();

    {
        let store = FileStore::new(&path, DayZone::utc());
        store.create(&Caller::Anonymous, draft("Read", "orange")).await.unwrap();
        store.toggle(&Caller::Anonymous, "Read", day).await.unwrap();
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["habits"][0]["name"], "Read");
    assert_eq!(document["habits"][0]["color"], "orange");

    let store = FileStore::new(&path, DayZone::utc());
    let habits = store.list(&Caller::Anonymous).await.unwrap();
    assert!(habits[0].is_completed_on(day));
}

#[tokio::test]
async fn test_corrupt_document_is_reported_not_reset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("habits.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FileStore::new(&path, DayZone::utc());
    assert!(matches!(
        store.list(&Caller::Anonymous).await,
        Err(StorageError::Corrupt { .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

/// Names listed by `store`, in the order it returns them
async fn listed_names(store: &dyn HabitStore, caller: &Caller) -> Vec<String> {
    let habits = store.list(caller).await.unwrap();
    habits.into_iter().map(|habit| habit.name).collect()
}

#[tokio::test]
async fn test_backends_agree_on_list_order() {
    let dir = TempDir::new().unwrap();
    let file = FileStore::new(dir.path().join("habits.json"), DayZone::utc());
    let sqlite = SqliteStore::open_in_memory().unwrap();
    let alice = user("alice");
    let earlier = Utc::now() - chrono::Duration::days(30);

    let stores: [(&dyn HabitStore, &Caller); 2] = [(&file, &Caller::Anonymous), (&sqlite, &alice)];
    for (store, caller) in stores {
        store.create(caller, draft("Read", "red")).await.unwrap();
        let back_dated = HabitDraft::new("Run", "", "red", earlier, CompletedDays::new()).unwrap();
        store.create(caller, back_dated).await.unwrap();

        assert_eq!(listed_names(store, caller).await, ["Read", "Run"]);
    }
}
