//! This crate provides the data layer of a personal planner: tasks, a weekly schedule, and a few health trackers.
//!
//! Tasks and personal time slots live in a hosted store, reached through the [`client`] module. \
//! For offline use and for tests, the [`cache`] module provides a local store that behaves the same way. \
//! Both implement the [`RemoteStore`](traits::RemoteStore) trait.
//!
//! College classes are not stored: they are generated from a fixed weekly [`timetable`], and merged
//! with personal slots by the [`ScheduleService`](schedule::ScheduleService). \
//! The [`TaskService`](tasks::TaskService) is a thin layer over the `tasks` collection.
//!
//! Views hold disposable copies of the store data: see [`TaskBoard`](board::TaskBoard) and [`ScheduleView`](schedule::ScheduleView).

pub mod traits;
pub mod query;

pub mod resource;
pub mod client;
pub mod cache;
pub mod mock_behaviour;
pub mod config;

pub mod outcome;
pub use outcome::{Outcome, ValidationError};
pub mod view;

pub mod task;
pub use task::{NewTask, Priority, Task, TaskChanges};
pub mod time_slot;
pub use time_slot::{NewTimeSlot, SlotKind, TimeSlot, TimeSlotChanges};
pub mod timetable;
pub use timetable::Timetable;

pub mod schedule;
pub use schedule::ScheduleService;
pub mod tasks;
pub use tasks::TaskService;
pub mod board;
pub use board::TaskBoard;
pub mod health;

pub mod utils;
