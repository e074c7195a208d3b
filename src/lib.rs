// src/lib.rs
pub mod calendar;
pub mod extractors;
pub mod utils;
pub mod yahoo;

pub use calendar::{parse_day, EarningsCalendar};
pub use utils::error::CalendarError;
pub use yahoo::models::{EarningsRecord, PageResultSet};
