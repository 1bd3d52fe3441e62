//! Tests for month navigation and the completion grid

use chrono::{Datelike, NaiveDate, Utc};
use habit_calendar::*;

fn habit(name: &str, days: &[(i32, u32, u32)]) -> Habit {
    let completed = days
        .iter()
        .map(|&(y, m, d)| DayKey::from_ymd(y, m, d).unwrap())
        .collect();
    let draft = HabitDraft::new(name, "", "blue", Utc::now(), completed).unwrap();
    Habit::from_draft(HabitId::from_name(name), draft)
}

#[test]
fn test_march_grid_lists_habits_in_input_order() {
    let habits = vec![
        habit("Read", &[(2024, 3, 5), (2024, 3, 31)]),
        habit("Run", &[(2024, 3, 5)]),
    ];
    let grid = aggregate(&habits, MonthCursor::new(2024, 3).unwrap());

    let march_first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(grid.leading_blanks, march_first.weekday().num_days_from_sunday());
    assert_eq!(grid.leading_blanks, 5);
    assert_eq!(grid.cells.len(), 5 + 31);

    assert_eq!(grid.habits_on(5).unwrap(), ["Read", "Run"]);
    assert_eq!(grid.habits_on(31).unwrap(), ["Read"]);
    assert!(grid.habits_on(6).unwrap().is_empty());
    assert!(grid.habits_on(32).is_none());
}

#[test]
fn test_completions_outside_the_month_are_ignored() {
    let habits = vec![habit("Read", &[(2024, 2, 29), (2024, 4, 1)])];
    let grid = aggregate(&habits, MonthCursor::new(2024, 3).unwrap());

    assert!(grid
        .cells
        .iter()
        .all(|cell| !matches!(cell, CalendarCell::Day { habits, .. } if !habits.is_empty())));
}

#[test]
fn test_navigation_from_month_end_never_skips() {
    let cursor = MonthCursor::containing(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

    let previous = cursor.previous();
    assert_eq!((previous.year(), previous.month()), (2024, 2));

    let next = cursor.next();
    assert_eq!((next.year(), next.month()), (2024, 4));

    let wrapped = MonthCursor::new(2024, 12).unwrap().next();
    assert_eq!((wrapped.year(), wrapped.month()), (2025, 1));
    assert_eq!(wrapped.previous(), MonthCursor::new(2024, 12).unwrap());
}

#[test]
fn test_invalid_month_rejected() {
    assert!(MonthCursor::new(2024, 0).is_err());
    assert!(MonthCursor::new(2024, 13).is_err());
}

#[test]
fn test_grid_serializes_with_cell_kinds() {
    let grid = aggregate(&[habit("Read", &[(2024, 3, 1)])], MonthCursor::new(2024, 3).unwrap());
    let json = serde_json::to_value(&grid).unwrap();

    assert_eq!(json["leadingBlanks"], 5);
    assert_eq!(json["cells"][0]["kind"], "blank");
    assert_eq!(json["cells"][5]["kind"], "day");
    assert_eq!(json["cells"][5]["day"], 1);
    assert_eq!(json["cells"][5]["habits"][0], "Read");
}
