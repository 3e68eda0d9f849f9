//! Congestion tax engine
//!
//! - `passage`: timestamp parsing
//! - `schedule`: time-of-day fee lookup
//! - `calendar`: toll-free dates
//! - `daily`: single-charge windows and the daily cap
//! - `calculator`: per-request orchestration

pub mod calculator;
pub mod calendar;
pub mod daily;
pub mod passage;
pub mod schedule;

pub use calculator::{calculate, calculate_sorted, TaxResult};
pub use calendar::is_toll_free_date;
pub use daily::{charge_for_day, windows_for_day, DailyWindow};
pub use passage::{parse_passage, parse_passages, PASSAGE_FORMAT};
pub use schedule::fee_at;
