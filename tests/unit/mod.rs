//! Unit tests for the domain model, the calendar layout and the stores

mod calendar_tests;
mod domain_tests;
mod storage_tests;
