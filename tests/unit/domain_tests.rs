//! Tests for habit values, colors and the day convention

use chrono::{TimeZone, Utc};
use habit_calendar::*;

#[test]
fn test_draft_trims_and_validates_name() {
    let draft = HabitDraft::new("  Read  ", "", "green", Utc::now(), CompletedDays::new()).unwrap();
    assert_eq!(draft.name, "Read");

    assert!(HabitDraft::new("   ", "", "green", Utc::now(), CompletedDays::new()).is_err());
    let long_name = "x".repeat(101);
    assert!(HabitDraft::new(&long_name, "", "green", Utc::now(), CompletedDays::new()).is_err());
    let long_description = "d".repeat(501);
    let draft =
        HabitDraft::new("Read", &long_description, "green", Utc::now(), CompletedDays::new());
    assert!(draft.is_err());
}

#[test]
fn test_toggle_twice_restores_membership() {
    let day = DayKey::from_ymd(2024, 3, 5).unwrap();
    let mut days = CompletedDays::new();

    assert!(days.toggle(day));
    assert!(days.contains(day));
    assert_eq!(days.len(), 1);

    assert!(!days.toggle(day));
    assert!(days.is_empty());
}

#[test]
fn test_completed_days_hold_each_day_once() {
    let day = DayKey::from_ymd(2024, 3, 5).unwrap();
    let first = DayKey::from_ymd(2024, 3, 1).unwrap();
    let days: CompletedDays = [day, day, first].into_iter().collect();

    assert_eq!(days.len(), 2);
    // Iteration is chronological
    let listed: Vec<String> = days.iter().map(|d| d.to_string()).collect();
    assert_eq!(listed, vec!["2024-03-01", "2024-03-05"]);
}

#[test]
fn test_every_color_round_trips_through_hex() {
    for color in HabitColor::ALL {
        assert_eq!(HabitColor::from_hex(color.hex()), color);
        assert_eq!(HabitColor::from_token(color.token()), Some(color));
    }

    assert_eq!(HabitColor::hex_for_token("chartreuse"), FALLBACK_HEX);
    assert_eq!(HabitColor::from_hex(FALLBACK_HEX), HabitColor::Blue);
    assert_eq!(HabitColor::normalize("chartreuse"), HabitColor::Blue);
    assert_eq!(HabitColor::normalize("teal"), HabitColor::Teal);
}

#[test]
fn test_instants_on_the_same_day_share_a_key() {
    let zone = DayZone::from_offset_minutes(-300).unwrap();
    let morning = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2024, 3, 6, 4, 59, 0).unwrap();

    assert_eq!(zone.day_of(morning), zone.day_of(evening));
    assert_eq!(zone.day_of(morning), DayKey::from_ymd(2024, 3, 5).unwrap());
}

#[test]
fn test_start_of_day_maps_back_to_the_same_day() {
    let zone = DayZone::from_offset_minutes(540).unwrap();
    let day = DayKey::from_ymd(2024, 12, 31).unwrap();

    let millis = zone.start_of_day_millis(day);
    assert_eq!(zone.day_of_millis(millis).unwrap(), day);
    assert_eq!(zone.day_of_millis(millis + 86_399_999).unwrap(), day);
}

#[test]
fn test_record_conversion_keeps_days() {
    let zone = DayZone::utc();
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let completed: CompletedDays = [DayKey::from_ymd(2024, 3, 5).unwrap()].into_iter().collect();
    let draft = HabitDraft::new("Read", "Twenty pages", "purple", created_at, completed).unwrap();
    let habit = Habit::from_draft(HabitId::from_name("Read"), draft);

    let record = HabitRecord::from_habit(&habit, &zone);
    assert_eq!(record.color, "purple");
    let march_5 = zone.start_of_day_millis(DayKey::from_ymd(2024, 3, 5).unwrap());
    assert_eq!(record.completed_dates, vec![march_5]);

    let back = record.into_habit(&zone).unwrap();
    assert_eq!(back.completed_days, habit.completed_days);
    assert_eq!(back.color, HabitColor::Purple);
}

#[test]
fn test_caller_requires_non_blank_token() {
    assert_eq!(Caller::from_token(None), Caller::Anonymous);
    assert_eq!(Caller::from_token(Some("")), Caller::Anonymous);
    assert!(Caller::from_token(Some("user-1")).is_authenticated());
}
