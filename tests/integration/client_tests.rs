//! Optimistic client driven over HTTP

use habit_calendar::service::CreateHabitParams;
use habit_calendar::{
    Caller, ClientError, ClientSyncController, DayKey, DayZone, HabitApi, HabitCalendarServer,
    HttpApi, MonthCursor, ServiceApi,
};

use super::TestServer;

fn params(name: &str) -> CreateHabitParams {
    CreateHabitParams {
        name: name.to_string(),
        description: String::new(),
        color: "teal".to_string(),
        created_date: None,
        completed_dates: Vec::new(),
    }
}

fn millis(year: i32, month: u32, day: u32) -> i64 {
    DayZone::utc().start_of_day_millis(DayKey::from_ymd(year, month, day).unwrap())
}

#[tokio::test]
async fn test_controller_agrees_with_server() {
    let server = TestServer::start().await;
    let zone = DayZone::utc();
    let api = HttpApi::new(&server.base_url, Some("user-1".into()));
    let controller = ClientSyncController::new(api, zone);

    controller.create(params("Read")).await.unwrap();
    controller.create(params("Run")).await.unwrap();
    assert!(controller.toggle("Read", millis(2024, 3, 5)).await.unwrap());
    assert!(controller.toggle("Run", millis(2024, 3, 5)).await.unwrap());
    assert!(controller.toggle("Read", millis(2024, 3, 31)).await.unwrap());

    let local = controller.calendar(MonthCursor::new(2024, 3).unwrap());

    // A fresh mirror built from the server sees the same month
    let api = HttpApi::new(&server.base_url, Some("user-1".into()));
    let fresh = ClientSyncController::new(api, zone);
    fresh.refresh().await.unwrap();
    let remote = fresh.calendar(MonthCursor::new(2024, 3).unwrap());

    assert_eq!(local, remote);
    assert_eq!(remote.habits_on(5).unwrap(), ["Read", "Run"]);
    assert_eq!(remote.habits_on(31).unwrap(), ["Read"]);

    server.stop().await;
}

#[tokio::test]
async fn test_rejected_toggle_rolls_back() {
    let server = TestServer::start().await;
    let zone = DayZone::utc();
    let api = HttpApi::new(&server.base_url, Some("user-1".into()));
    api.create(params("Read")).await.unwrap();

    let controller = ClientSyncController::new(api.clone(), zone);
    controller.refresh().await.unwrap();

    // Removed behind the mirror's back; the server now answers 404
    api.delete(habit_calendar::service::DeleteHabitParams {
        habit_name: "Read".to_string(),
    })
    .await
    .unwrap();

    let err = controller.toggle("Read", millis(2024, 3, 5)).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 404, .. }));

    let habits = controller.habits();
    assert!(!habits[0].is_completed_on(DayKey::from_ymd(2024, 3, 5).unwrap()));

    // Deleting fails on the server too, so the habit comes back
    assert!(controller.delete("Read").await.is_err());
    assert_eq!(controller.habits().len(), 1);

    controller.refresh().await.unwrap();
    assert!(controller.habits().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_local_guards_skip_the_network() {
    let server = TestServer::start().await;
    let api = HttpApi::new(&server.base_url, None);
    let controller = ClientSyncController::new(api, DayZone::utc());

    assert!(matches!(
        controller.toggle("Nope", millis(2024, 3, 5)).await,
        Err(ClientError::UnknownHabit(_))
    ));
    assert!(matches!(controller.delete("Nope").await, Err(ClientError::UnknownHabit(_))));

    controller.create(params("Stretch")).await.unwrap();
    assert!(matches!(
        controller.create(params("Stretch")).await,
        Err(ClientError::DuplicateHabit(_))
    ));

    server.stop().await;
}

#[tokio::test]
async fn test_in_process_api_matches_http() {
    let dir = tempfile::TempDir::new().unwrap();
    let server = TestServer::start_in(dir.path()).await;
    let config = server.config.clone();
    server.stop().await;

    let embedded = HabitCalendarServer::new(&config).unwrap();
    let api = ServiceApi::new(embedded.service(), Caller::from_token(Some("user-2")));
    let controller = ClientSyncController::new(api, config.zone);

    controller.create(params("Journal")).await.unwrap();
    assert!(controller.toggle("Journal", millis(2024, 2, 29)).await.unwrap());

    let grid = controller.calendar(MonthCursor::new(2024, 2).unwrap());
    assert_eq!(grid.habits_on(29).unwrap(), ["Journal"]);
}
