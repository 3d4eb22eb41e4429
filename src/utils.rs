//! Some utility functions

use std::error::Error;

use chrono::{DateTime, NaiveDate};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::query::Row;
use crate::task::Task;
use crate::time_slot::{SlotKind, TimeSlot};

/// Serialize a struct into a store row
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, Box<dyn Error>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(format!("Expected an object, got {}", other).into()),
    }
}

/// Deserialize a store row into a struct
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, Box<dyn Error>> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// The store returns `null` for empty optional columns
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Dates may be stored as plain dates (`2021-03-05`) or as RFC3339 timestamps (`2021-03-05T00:00:00+00:00`).
/// Timestamps keep the date they have in their own offset.
pub fn date_or_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<String>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(text) => text,
    };
    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| Some(dt.naive_local().date()))
        .map_err(|_| de::Error::custom(format!("invalid date {:?}", text)))
}

/// A debug utility that pretty-prints a task
pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    let due = task.due_date().map(|d| format!(" (due {})", d)).unwrap_or_default();
    println!("    {} [{}] {}{}\t{}", completion, task.priority(), task.title(), due, task.id());
}

/// A debug utility that pretty-prints a time slot
pub fn print_slot(slot: &TimeSlot) {
    let kind = match slot.kind {
        SlotKind::College => "C",
        SlotKind::Personal => "P",
    };
    println!("    {} {} - {}  {}\t{}", kind, slot.start.format("%a %d %H:%M"), slot.end.format("%H:%M"), slot.title, slot.id);
}

/// A debug utility that pretty-prints a list of slots, sorted by their start
pub fn print_schedule(slots: &[TimeSlot]) {
    let mut sorted: Vec<&TimeSlot> = slots.iter().collect();
    sorted.sort_by_key(|s| s.start);
    for slot in sorted {
        print_slot(slot);
    }
}
