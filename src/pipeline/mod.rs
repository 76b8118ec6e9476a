//! Pipeline entry points.
//!
//! - `run_fetch`: Fetch every missing date and merge it into the store
//! - `run_render`: Render the store into an iCalendar file

pub mod fetch;
pub mod plan;
pub mod render;

pub use fetch::{FetchReport, run_fetch};
pub use plan::{DateRange, plan_dates};
pub use render::{render_calendar, run_render};
