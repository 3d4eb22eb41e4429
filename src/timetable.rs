//! The fixed weekly class timetable
//!
//! College slots are never stored: they are generated again, from this table, for every requested range.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Utc, Weekday};
use csscolorparser::Color;
use once_cell::sync::Lazy;

use crate::time_slot::{SlotKind, TimeSlot, COLLEGE_ID_PREFIX};

/// Label of the timetable entries that are not a class
pub const NO_CLASS_LABEL: &str = "No applicable class";

/// One class (or break) of the timetable, in local time
#[derive(Clone, Debug, PartialEq)]
pub struct TimetableEntry {
    pub start: (u32, u32),
    pub end: (u32, u32),
    pub label: &'static str,
}

const fn entry(start: (u32, u32), end: (u32, u32), label: &'static str) -> TimetableEntry {
    TimetableEntry { start, end, label }
}

static MONDAY: Lazy<Vec<TimetableEntry>> = Lazy::new(|| vec![
    entry(( 8, 45), (10, 45), "B1-PIC"),
    entry((10, 45), (11, 45), "AMS"),
    entry((11, 45), (12, 45), "BEE"),
    entry((12, 45), (13, 30), "RECESS"),
    entry((13, 30), (14, 30), "PIC"),
    entry((14, 30), (15, 30), "WPD"),
    entry((15, 30), (16, 30), "BA-AMS (T)"),
]);

static TUESDAY: Lazy<Vec<TimetableEntry>> = Lazy::new(|| vec![
    entry(( 8, 45), ( 9, 45), "AMS"),
    entry(( 9, 45), (10, 45), "PIC"),
    entry((10, 45), (12, 45), "BA-WPD"),
    entry((12, 45), (13, 30), "RECESS"),
    entry((13, 30), (14, 30), "PIC"),
    entry((14, 30), (16, 30), "B1-BEE"),
]);

static WEDNESDAY: Lazy<Vec<TimetableEntry>> = Lazy::new(|| vec![
    entry(( 8, 45), ( 9, 45), "AMS"),
    entry(( 9, 45), (10, 45), "BEE"),
    entry((10, 45), (12, 45), "B1-PCO"),
    entry((12, 45), (13, 30), "RECESS"),
    entry((13, 30), (14, 30), "BA-PIC (T)"),
    entry((14, 30), (15, 30), NO_CLASS_LABEL),
    entry((15, 30), (16, 30), "BLP"),
]);

static THURSDAY: Lazy<Vec<TimetableEntry>> = Lazy::new(|| vec![
    entry(( 8, 45), (10, 45), "BA-WPD"),
    entry((10, 45), (11, 45), "PIC"),
    entry((11, 45), (12, 45), "RECESS"),
    entry((12, 45), (14, 30), "B1-PIC"),
    entry((14, 30), (16, 30), "B1-BEE"),
]);

static FRIDAY: Lazy<Vec<TimetableEntry>> = Lazy::new(|| vec![
    entry(( 8, 45), ( 9, 45), "AMS"),
    entry(( 9, 45), (10, 45), "BEE"),
    entry((10, 45), (11, 45), "BLP"),
    entry((11, 45), (12, 45), "BA-BLP"),
    entry((12, 45), (13, 30), "RECESS"),
    entry((13, 30), (14, 30), "WPD"),
]);

/// The entries of a day, in chronological order. There are no classes on week-ends
pub fn entries(weekday: Weekday) -> &'static [TimetableEntry] {
    match weekday {
        Weekday::Mon => &MONDAY,
        Weekday::Tue => &TUESDAY,
        Weekday::Wed => &WEDNESDAY,
        Weekday::Thu => &THURSDAY,
        Weekday::Fri => &FRIDAY,
        Weekday::Sat | Weekday::Sun => &[],
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// The display color of a timetable entry, chosen from its label
pub fn label_color(label: &str) -> Color {
    if label.contains("RECESS") {
        Color::from_rgb_u8(0x10, 0xb9, 0x81)
    } else if label.contains("No applicable") {
        Color::from_rgb_u8(0x9c, 0xa3, 0xaf)
    } else if label.contains("B1-") {
        Color::from_rgb_u8(0x3b, 0x82, 0xf6)
    } else if label.contains("BA-") {
        Color::from_rgb_u8(0x8b, 0x5c, 0xf6)
    } else {
        Color::from_rgb_u8(0x4f, 0x46, 0xe5)
    }
}

/// The stable id of a college slot
pub fn college_slot_id(date: NaiveDate, index: usize) -> String {
    format!("{}{}-{}-{}", COLLEGE_ID_PREFIX, date.format("%Y-%m-%d"), weekday_name(date.weekday()), index)
}


/// Generates college slots. The timetable is expressed in the local time of a fixed UTC offset
#[derive(Clone, Debug, PartialEq)]
pub struct Timetable {
    offset: FixedOffset,
}

impl Default for Timetable {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl Timetable {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Every college slot that starts within `[start, end)`.
    ///
    /// The result only depends on the arguments: two calls with the same range return the same slots, with the same ids, in the same order.
    pub fn college_slots(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        if end <= start {
            return slots;
        }

        let first_day = start.with_timezone(&self.offset).naive_local().date();
        let last_day = end.with_timezone(&self.offset).naive_local().date();

        let mut day = first_day;
        while day <= last_day {
            for (index, entry) in entries(day.weekday()).iter().enumerate() {
                let slot = match self.college_slot(day, index, entry) {
                    None => {
                        log::warn!("Unable to place {} on {} at {:?}. Skipping it", entry.label, day, entry.start);
                        continue;
                    },
                    Some(slot) => slot,
                };
                if slot.start >= start && slot.start < end {
                    slots.push(slot);
                }
            }

            day = match day.succ_opt() {
                None => break,
                Some(next) => next,
            };
        }

        slots
    }

    fn college_slot(&self, day: NaiveDate, index: usize, entry: &TimetableEntry) -> Option<TimeSlot> {
        let start = self.instant(day, entry.start)?;
        let end = self.instant(day, entry.end)?;

        Some(TimeSlot {
            id: college_slot_id(day, index),
            title: entry.label.to_string(),
            start,
            end,
            kind: SlotKind::College,
            description: Some(format!("Regular {} class", weekday_name(day.weekday()))),
            color: Some(label_color(entry.label)),
            editable: false,
        })
    }

    fn instant(&self, day: NaiveDate, (hour, minute): (u32, u32)) -> Option<DateTime<Utc>> {
        let local = day.and_hms_opt(hour, minute, 0)?;
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
