//! Calendar time slots (events)
//!
//! The store names its columns differently from this crate (`start_time`/`end_time` rather than `start`/`end`).
//! This module is the only place where the two representations meet.

use std::error::Error;

use chrono::{DateTime, Utc};
use csscolorparser::Color;
use serde::{Deserialize, Serialize};

use crate::outcome::ValidationError;
use crate::query::Row;

/// Store column holding the start of a slot
pub const START_COLUMN: &str = "start_time";
/// Store column holding the end of a slot
pub const END_COLUMN: &str = "end_time";

/// Every college slot id starts with this prefix. Store-issued ids never do.
pub const COLLEGE_ID_PREFIX: &str = "college-";

/// Where a slot comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Created by the user, and stored
    Personal,
    /// Generated from the fixed class timetable, never stored
    College,
}

/// A calendar entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: SlotKind,
    pub description: Option<String>,
    pub color: Option<Color>,
    pub editable: bool,
}

impl TimeSlot {
    pub fn is_college(&self) -> bool {
        self.kind == SlotKind::College
    }

    /// Whether this slot intersects the closed range `[start, end]`
    pub fn intersects(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
        &self.start <= end && &self.end >= start
    }

    /// Build a personal slot from a row of the `time_slots` collection.
    ///
    /// Everything that lives in the store is personal, whatever its `type` column says.
    pub fn from_stored_row(row: Row) -> Result<Self, Box<dyn Error>> {
        let stored: StoredTimeSlot = crate::utils::from_row(row)?;
        let id = stored.id.ok_or("A stored time slot has no id")?;
        if is_college_id(&id) {
            return Err(format!("The store holds a slot with a college id ({})", id).into());
        }

        Ok(Self {
            id,
            title: stored.title,
            start: stored.start_time,
            end: stored.end_time,
            kind: SlotKind::Personal,
            description: stored.description,
            color: stored.color,
            editable: stored.editable,
        })
    }
}

/// Whether an id designates a generated college slot
pub fn is_college_id(id: &str) -> bool {
    id.starts_with(COLLEGE_ID_PREFIX)
}

/// A row of the `time_slots` collection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct StoredTimeSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    title: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: SlotKind,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default = "default_editable")]
    editable: bool,
}

fn default_editable() -> bool {
    true
}


/// The content of a personal slot that is not in the store yet
#[derive(Clone, Debug, PartialEq)]
pub struct NewTimeSlot {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: Option<String>,
    pub color: Option<Color>,
    pub editable: bool,
}

impl NewTimeSlot {
    /// An editable slot, with no description nor color.
    /// `end` is expected to be after `start`, but this is not enforced
    pub fn new<S: ToString>(title: S, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            start,
            end,
            description: None,
            color: None,
            editable: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// The row to insert into the `time_slots` collection
    pub fn to_row(&self) -> Result<Row, Box<dyn Error>> {
        crate::utils::to_row(&StoredTimeSlot {
            id: None,
            title: self.title.clone(),
            start_time: self.start,
            end_time: self.end,
            kind: SlotKind::Personal,
            description: self.description.clone(),
            color: self.color.clone(),
            editable: self.editable,
        })
    }
}


/// Some fields of a slot to overwrite. Fields that are `None` are left untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimeSlotChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "start_time", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(rename = "end_time", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

impl TimeSlotChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title<S: ToString>(mut self, title: S) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn description<S: ToString>(mut self, description: S) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(ValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }

    /// The partial row to send to the store, with the store's column names
    pub fn to_row(&self) -> Result<Row, Box<dyn Error>> {
        crate::utils::to_row(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn stored_rows_use_store_column_names() {
        let mut new_slot = NewTimeSlot::new("Gym", at(18), at(19));
        new_slot.color = Some(csscolorparser::parse("#ff0000").unwrap());
        let row = new_slot.to_row().unwrap();

        assert_eq!(row["start_time"], json!("2021-03-01T18:00:00Z"));
        assert_eq!(row["end_time"], json!("2021-03-01T19:00:00Z"));
        assert_eq!(row["type"], json!("personal"));
        assert!(row.get("start").is_none());
        assert!(row.get("id").is_none());
    }

    #[test]
    fn slots_from_store_rows() {
        let mut row = NewTimeSlot::new("Gym", at(18), at(19)).to_row().unwrap();
        row.insert("id".to_string(), json!("6c1d"));
        row.insert("type".to_string(), json!("college"));
        row.insert("created_at".to_string(), json!("2021-03-01T08:00:00Z"));

        let slot = TimeSlot::from_stored_row(row).unwrap();
        assert_eq!(slot.id, "6c1d");
        assert_eq!(slot.start, at(18));
        assert_eq!(slot.end, at(19));
        assert_eq!(slot.kind, SlotKind::Personal);
        assert!(slot.editable);

        let without_id = NewTimeSlot::new("Gym", at(18), at(19)).to_row().unwrap();
        assert!(TimeSlot::from_stored_row(without_id).is_err());
    }

    #[test]
    fn changes_map_to_store_columns() {
        let changes = TimeSlotChanges::new().title("Swim").end(at(20));
        assert_eq!(changes.to_row().unwrap(), crate::utils::to_row(&json!({
            "title": "Swim",
            "end_time": "2021-03-01T20:00:00Z",
        })).unwrap());
        assert_eq!(TimeSlotChanges::new().title(" ").validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn intersection() {
        let slot = TimeSlot::from_stored_row({
            let mut row = NewTimeSlot::new("Gym", at(18), at(19)).to_row().unwrap();
            row.insert("id".to_string(), json!("6c1d"));
            row
        }).unwrap();

        assert!(slot.intersects(&at(19), &at(20)));
        assert!(slot.intersects(&at(10), &at(18)));
        assert!(slot.intersects(&at(20), &at(21)) == false);
    }
}
