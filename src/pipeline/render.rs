// src/pipeline/render.rs

//! iCalendar rendering of the stored records.

use std::path::Path;

use icalendar::{Calendar, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike};
use serde_json::Value;

use crate::error::Result;
use crate::models::Record;
use crate::storage::RecordStore;

/// Shown when a record carries no holiday list.
pub const NO_HOLIDAY: &str = "无假期";

/// Holiday names of a record, joined with `, `.
///
/// Only a JSON array counts as a holiday list; anything else yields
/// [`NO_HOLIDAY`]. Elements without a string `name` are left out.
pub fn holiday_names(holidays: Option<&Value>) -> String {
    match holidays {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(", "),
        _ => NO_HOLIDAY.to_string(),
    }
}

fn event_for(record: &Record) -> Event {
    let names = holiday_names(record.holidays.as_ref());
    let midnight = record.date.date().and_hms_opt(0, 0, 0).unwrap_or_default();

    Event::new()
        .uid(&format!("{}@almanac", record.date))
        .summary(&format!("假期信息 - {names}"))
        .description(&format!("假期详情: {names}"))
        .starts(DatePerhapsTime::DateTime(CalendarDateTime::Floating(
            midnight,
        )))
        .done()
}

/// Render one event per record, in store order. Reads only `date` and
/// `holidays`.
pub fn render_calendar(records: &[Record]) -> String {
    let mut calendar = Calendar::new();
    for record in records {
        calendar.push(event_for(record));
    }
    calendar.done().to_string()
}

/// Render the store into an `.ics` file at `output`. Returns the number of
/// events written.
pub async fn run_render(store: &dyn RecordStore, output: &Path) -> Result<usize> {
    let records = store.load().await?;
    let ics = render_calendar(&records);

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, ics).await?;

    log::info!(
        "ICS file generated: {} event(s) written to {}",
        records.len(),
        output.display()
    );
    Ok(records.len())
}
