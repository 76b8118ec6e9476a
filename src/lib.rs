// src/lib.rs

//! almanac library: incremental calendar data fetcher and iCalendar renderer.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
