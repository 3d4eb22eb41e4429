//! The schedule: personal slots from the store, merged with the college timetable

use std::error::Error;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Timelike, Utc};
use serde_json::Value;

use crate::config::TIME_SLOTS;
use crate::outcome::{Outcome, ValidationError};
use crate::query::Query;
use crate::time_slot::{is_college_id, NewTimeSlot, TimeSlot, TimeSlotChanges, END_COLUMN, START_COLUMN};
use crate::timetable::Timetable;
use crate::traits::RemoteStore;
use crate::view::{Generation, Ticket};

fn instant_value(dt: &DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Reads the whole schedule, and writes personal slots
pub struct ScheduleService<S: RemoteStore> {
    store: S,
    timetable: Timetable,
}

impl<S: RemoteStore> ScheduleService<S> {
    pub fn new(store: S, timetable: Timetable) -> Self {
        Self { store, timetable }
    }

    pub fn store(&self) -> &S { &self.store }
    pub fn timetable(&self) -> &Timetable { &self.timetable }

    /// Every slot of the range: the personal slots that intersect `[start, end]`, and the college slots that start in `[start, end)`.
    ///
    /// This never fails. In case the store cannot be read, only the college slots are returned.
    /// Slots are not sorted.
    pub async fn get_schedule(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimeSlot> {
        let college_slots = self.timetable.college_slots(start, end);

        let query = Query::new()
            .lte(START_COLUMN, instant_value(&end))
            .gte(END_COLUMN, instant_value(&start));
        let rows = match self.store.select(TIME_SLOTS, &query).await {
            Err(err) => {
                log::warn!("Unable to fetch the personal schedule ({}). Only returning the college schedule", err);
                return college_slots;
            },
            Ok(rows) => rows,
        };

        let mut slots: Vec<TimeSlot> = Vec::with_capacity(rows.len() + college_slots.len());
        for row in rows {
            match TimeSlot::from_stored_row(row) {
                Err(err) => log::warn!("Ignoring an invalid stored time slot: {}", err),
                Ok(slot) => slots.push(slot),
            }
        }
        slots.extend(college_slots);
        slots
    }

    /// Store a new personal slot. The returned slot is the one the store has saved, with its issued id
    pub async fn create_time_slot(&self, new_slot: &NewTimeSlot) -> Result<Outcome<TimeSlot>, ValidationError> {
        new_slot.validate()?;

        let result = self.insert_slot(new_slot).await;
        Ok(Outcome::from_result(result, "creating a time slot"))
    }

    /// Overwrite some fields of a personal slot. College slots are read-only
    pub async fn update_time_slot(&self, id: &str, changes: &TimeSlotChanges) -> Result<Outcome<TimeSlot>, ValidationError> {
        if is_college_id(id) {
            return Err(ValidationError::ReadOnlySlot(id.to_string()));
        }
        changes.validate()?;

        let result = self.update_slot(id, changes).await;
        Ok(Outcome::from_result(result, format!("updating time slot {}", id)))
    }

    /// Delete a personal slot. College slots are read-only
    pub async fn delete_time_slot(&self, id: &str) -> Result<Outcome<()>, ValidationError> {
        if is_college_id(id) {
            return Err(ValidationError::ReadOnlySlot(id.to_string()));
        }

        let result = self.store.delete(TIME_SLOTS, id).await;
        Ok(Outcome::from_result(result, format!("deleting time slot {}", id)))
    }

    async fn insert_slot(&self, new_slot: &NewTimeSlot) -> Result<TimeSlot, Box<dyn Error>> {
        let row = new_slot.to_row()?;
        let stored = self.store.insert(TIME_SLOTS, row).await?;
        TimeSlot::from_stored_row(stored)
    }

    async fn update_slot(&self, id: &str, changes: &TimeSlotChanges) -> Result<TimeSlot, Box<dyn Error>> {
        let row = changes.to_row()?;
        let stored = self.store.update(TIME_SLOTS, id, row).await?;
        TimeSlot::from_stored_row(stored)
    }
}


/// The Monday 00:00 to Sunday 23:59:59 week that contains `date`, in a given local time
pub fn week_bounds(date: NaiveDate, offset: &FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);

    let start = offset.from_local_datetime(&monday.and_hms_opt(0, 0, 0)?).single()?;
    let end = offset.from_local_datetime(&sunday.and_hms_opt(23, 59, 59)?).single()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// A two-hour period of a day view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Period {
    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:00", self.start_hour, self.end_hour)
    }
}

/// Periods a day view is split in, from 06:00 to 22:00
pub const DAY_PERIODS: [Period; 8] = [
    Period { start_hour: 6, end_hour: 8 },
    Period { start_hour: 8, end_hour: 10 },
    Period { start_hour: 10, end_hour: 12 },
    Period { start_hour: 12, end_hour: 14 },
    Period { start_hour: 14, end_hour: 16 },
    Period { start_hour: 16, end_hour: 18 },
    Period { start_hour: 18, end_hour: 20 },
    Period { start_hour: 20, end_hour: 22 },
];


/// The slots a calendar view currently displays.
///
/// This is a disposable copy of what the store holds: it is replaced by every fetch, and patched with the store's answer after every write.
#[derive(Debug)]
pub struct ScheduleView {
    offset: FixedOffset,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    slots: Vec<TimeSlot>,
    generation: Generation,
}

impl ScheduleView {
    /// An empty view, that displays days in the given local time
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            window: None,
            slots: Vec::new(),
            generation: Generation::new(),
        }
    }

    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> { self.window }
    pub fn slots(&self) -> &[TimeSlot] { &self.slots }

    /// Start displaying another range. Fetches that are still in flight for a previous range will be ignored.
    ///
    /// Writes that change the view also invalidate the fetches started before them.
    pub fn begin_fetch(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Ticket {
        self.window = Some((start, end));
        self.generation.issue()
    }

    /// Apply the result of a fetch. Returns `false` (and ignores the slots) in case the view has moved on since the fetch started
    pub fn finish_fetch(&mut self, ticket: Ticket, slots: Vec<TimeSlot>) -> bool {
        if self.generation.is_current(ticket) == false {
            log::debug!("Ignoring a stale schedule fetch");
            return false;
        }
        self.slots = slots;
        true
    }

    /// The view is no longer displayed. Fetches in flight will be ignored
    pub fn detach(&mut self) {
        self.generation.invalidate();
    }

    /// Fetch a range and display it
    pub async fn load<S: RemoteStore>(&mut self, service: &ScheduleService<S>, start: DateTime<Utc>, end: DateTime<Utc>) {
        let ticket = self.begin_fetch(start, end);
        let slots = service.get_schedule(start, end).await;
        self.finish_fetch(ticket, slots);
    }

    /// Slots that start on a given local day, sorted by start
    pub fn slots_on(&self, date: NaiveDate) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self.slots.iter()
            .filter(|s| s.start.with_timezone(&self.offset).naive_local().date() == date)
            .collect();
        slots.sort_by_key(|s| s.start);
        slots
    }

    /// Slots of a day, grouped by the period their start falls in.
    /// Slots that start before 06:00 or after 22:00 are not in any period
    pub fn periods_on(&self, date: NaiveDate) -> Vec<(Period, Vec<&TimeSlot>)> {
        let day = self.slots_on(date);
        DAY_PERIODS.iter()
            .map(|period| {
                let in_period: Vec<&TimeSlot> = day.iter()
                    .filter(|s| {
                        let hour = s.start.with_timezone(&self.offset).hour();
                        hour >= period.start_hour && hour < period.end_hour
                    })
                    .cloned()
                    .collect();
                (*period, in_period)
            })
            .collect()
    }

    /// Create a personal slot, and display it if the store has saved it
    pub async fn create_slot<S: RemoteStore>(&mut self, service: &ScheduleService<S>, new_slot: &NewTimeSlot) -> Result<Outcome<()>, ValidationError> {
        let outcome = service.create_time_slot(new_slot).await?;
        Ok(outcome.map(|slot| {
            self.generation.invalidate();
            self.slots.push(slot);
        }))
    }

    /// Update a personal slot, and display the store's version of it
    pub async fn update_slot<S: RemoteStore>(&mut self, service: &ScheduleService<S>, id: &str, changes: &TimeSlotChanges) -> Result<Outcome<()>, ValidationError> {
        let outcome = service.update_time_slot(id, changes).await?;
        Ok(outcome.map(|updated| {
            self.generation.invalidate();
            match self.slots.iter().position(|s| s.id == updated.id) {
                Some(index) => self.slots[index] = updated,
                None => self.slots.push(updated),
            }
        }))
    }

    /// Delete a personal slot, and stop displaying it once the store has deleted it
    pub async fn delete_slot<S: RemoteStore>(&mut self, service: &ScheduleService<S>, id: &str) -> Result<Outcome<()>, ValidationError> {
        let outcome = service.delete_time_slot(id).await?;
        if outcome.is_done() {
            self.generation.invalidate();
            self.slots.retain(|s| s.id != id);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;

    use crate::time_slot::SlotKind;

    fn utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, d, h, min, 0).unwrap()
    }

    #[test]
    fn weeks_start_on_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2021, 3, 3).unwrap();
        let (start, end) = week_bounds(wednesday, &Utc.fix()).unwrap();
        assert_eq!(start, utc(1, 0, 0));
        assert_eq!(end, Utc.with_ymd_and_hms(2021, 3, 7, 23, 59, 59).unwrap());

        let sunday = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();
        assert_eq!(week_bounds(sunday, &Utc.fix()).unwrap().0, utc(1, 0, 0));
    }

    #[test]
    fn stale_fetches_are_ignored() {
        let timetable = Timetable::default();
        let mut view = ScheduleView::new(Utc.fix());

        let first = view.begin_fetch(utc(1, 0, 0), utc(7, 23, 59));
        let second = view.begin_fetch(utc(8, 0, 0), utc(14, 23, 59));

        assert!(view.finish_fetch(first, timetable.college_slots(utc(1, 0, 0), utc(7, 23, 59))) == false);
        assert!(view.slots().is_empty());

        assert!(view.finish_fetch(second, timetable.college_slots(utc(8, 0, 0), utc(14, 23, 59))));
        assert!(view.slots().iter().all(|s| s.start >= utc(8, 0, 0)));

        let third = view.begin_fetch(utc(1, 0, 0), utc(7, 23, 59));
        view.detach();
        assert!(view.finish_fetch(third, Vec::new()) == false);
        assert!(view.slots().is_empty() == false);
    }

    #[tokio::test]
    async fn writes_invalidate_pending_fetches() {
        let _ = env_logger::builder().is_test(true).try_init();
        let service = ScheduleService::new(crate::cache::Cache::new(), Timetable::default());
        let mut view = ScheduleView::new(Utc.fix());

        let ticket = view.begin_fetch(utc(1, 0, 0), utc(7, 23, 59));
        let stale = service.get_schedule(utc(1, 0, 0), utc(7, 23, 59)).await;
        let gym = NewTimeSlot::new("Gym", utc(2, 18, 0), utc(2, 19, 0));
        assert!(view.create_slot(&service, &gym).await.unwrap().is_done());

        assert!(view.finish_fetch(ticket, stale) == false);
        assert_eq!(view.slots().len(), 1);
        assert_eq!(view.slots()[0].title, "Gym");
    }

    #[test]
    fn day_periods() {
        let timetable = Timetable::default();
        let mut view = ScheduleView::new(Utc.fix());
        let ticket = view.begin_fetch(utc(1, 0, 0), utc(7, 23, 59));
        let mut slots = timetable.college_slots(utc(1, 0, 0), utc(7, 23, 59));
        slots.reverse();
        view.finish_fetch(ticket, slots);

        let monday = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let day = view.slots_on(monday);
        assert_eq!(day.len(), 7);
        assert!(day.windows(2).all(|w| w[0].start <= w[1].start));
        assert!(day.iter().all(|s| s.kind == SlotKind::College));

        let periods = view.periods_on(monday);
        assert_eq!(periods.len(), 8);
        assert_eq!(periods[0].0.label(), "06:00 - 08:00");
        assert!(periods[0].1.is_empty());
        // 08:45 B1-PIC
        assert_eq!(periods[1].1.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(), vec!["B1-PIC"]);
        // 10:45 AMS, 11:45 BEE
        assert_eq!(periods[2].1.len(), 2);
        // 12:45 RECESS, 13:30 PIC
        assert_eq!(periods[3].1.len(), 2);
    }
}
