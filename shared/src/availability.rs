//! Calendar availability for any capacity-bound resource.
//!
//! Slots are bucketed by day and every day of the visible month gets a
//! [`DaySummary`]. The calendar grid built from it is Monday-first and padded
//! to whole weeks, so the UI only has to render cells.

use crate::{month_name, Slot};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields the day classification reads from a bookable resource
pub trait CapacityResource {
    fn day(&self) -> NaiveDate;
    fn capacity(&self) -> u32;
    fn free_spots(&self) -> u32;
    fn is_open(&self) -> bool;
}

impl CapacityResource for Slot {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn free_spots(&self) -> u32 {
        Slot::free_spots(self)
    }

    fn is_open(&self) -> bool {
        Slot::is_open(self)
    }
}

/// Derived availability of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Every slot is open and nothing is booked yet
    Available,
    /// Some capacity is used or some slots are closed
    Partial,
    /// No slot has a free spot left
    Full,
    /// No slots on this day
    Empty,
}

impl DayStatus {
    pub fn css_class(&self) -> &'static str {
        match self {
            DayStatus::Available => "available",
            DayStatus::Partial => "partial",
            DayStatus::Full => "full",
            DayStatus::Empty => "empty",
        }
    }

    /// Days a guardian may pick in the booking calendar
    pub fn is_selectable(&self) -> bool {
        matches!(self, DayStatus::Available | DayStatus::Partial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_slots: u32,
    /// Open slots with at least one free spot
    pub available_slots: u32,
    pub total_capacity: u32,
    /// Free spots over open slots
    pub available_capacity: u32,
    pub status: DayStatus,
}

impl DaySummary {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_slots: 0,
            available_slots: 0,
            total_capacity: 0,
            available_capacity: 0,
            status: DayStatus::Empty,
        }
    }
}

/// Summarizes the slots of a single day.
///
/// `full` wins over `available`, so a day made only of zero-capacity slots
/// is reported full.
pub fn summarize_day<'a, R, I>(date: NaiveDate, slots: I) -> DaySummary
where
    R: CapacityResource + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut summary = DaySummary::empty(date);
    let mut every_slot_full = true;
    let mut every_slot_untouched = true;

    for slot in slots {
        let capacity = slot.capacity();
        let free = slot.free_spots().min(capacity);

        summary.total_slots += 1;
        summary.total_capacity += capacity;
        if slot.is_open() && free > 0 {
            summary.available_slots += 1;
            summary.available_capacity += free;
        }

        every_slot_full &= free == 0;
        every_slot_untouched &= slot.is_open() && free == capacity;
    }

    summary.status = if summary.total_slots == 0 {
        DayStatus::Empty
    } else if every_slot_full {
        DayStatus::Full
    } else if every_slot_untouched {
        DayStatus::Available
    } else {
        DayStatus::Partial
    };
    summary
}

/// A calendar month, always valid by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Moves by whole months, crossing year boundaries
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn prev(&self) -> Self {
        self.offset(-1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day()
            .iter_days()
            .take(self.days_in_month() as usize)
    }

    /// e.g. "June 2024"
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// Type of calendar cell for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalendarDayType {
    /// Empty padding cell before the first day of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty padding cell after the last day, completing the final week
    PaddingAfter,
}

/// One cell of the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day_type: CalendarDayType,
    /// `None` for padding cells
    pub summary: Option<DaySummary>,
}

/// Month grid handed to the calendar component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: MonthCursor,
    pub days: Vec<CalendarDay>,
    /// Padding cells before day 1 (0 = Monday, ..., 6 = Sunday)
    pub first_day_of_week: u32,
}

impl CalendarMonth {
    /// Cells split into rows of seven
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(7)
    }
}

/// Per-day availability of one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthAvailability {
    month: MonthCursor,
    days: BTreeMap<NaiveDate, DaySummary>,
}

impl MonthAvailability {
    /// Buckets `slots` by day; slots outside the month are ignored
    pub fn from_resources<R: CapacityResource>(month: MonthCursor, slots: &[R]) -> Self {
        let mut by_day: BTreeMap<NaiveDate, Vec<&R>> = BTreeMap::new();
        let mut outside = 0usize;
        for slot in slots {
            if month.contains(slot.day()) {
                by_day.entry(slot.day()).or_default().push(slot);
            } else {
                outside += 1;
            }
        }
        if outside > 0 {
            log::debug!("Ignored {} slots outside {}", outside, month.label());
        }

        let days = month
            .days()
            .map(|date| {
                let summary = match by_day.get(&date) {
                    Some(day_slots) => summarize_day(date, day_slots.iter().copied()),
                    None => DaySummary::empty(date),
                };
                (date, summary)
            })
            .collect();

        Self { month, days }
    }

    /// A month with no slot data, used when fetching fails
    pub fn empty(month: MonthCursor) -> Self {
        Self::from_resources::<Slot>(month, &[])
    }

    /// Monday-first grid padded to whole weeks
    pub fn calendar(&self) -> CalendarMonth {
        let first_day_of_week = self.month.first_day().weekday().num_days_from_monday();
        let mut days = Vec::with_capacity(42);

        for _ in 0..first_day_of_week {
            days.push(CalendarDay {
                day_type: CalendarDayType::PaddingBefore,
                summary: None,
            });
        }
        for summary in self.days.values() {
            days.push(CalendarDay {
                day_type: CalendarDayType::MonthDay,
                summary: Some(summary.clone()),
            });
        }
        while days.len() % 7 != 0 {
            days.push(CalendarDay {
                day_type: CalendarDayType::PaddingAfter,
                summary: None,
            });
        }

        CalendarMonth {
            month: self.month,
            days,
            first_day_of_week,
        }
    }
}

/// Slots of one day ordered by start time
pub fn slots_for_day(slots: &[Slot], day: NaiveDate) -> Vec<Slot> {
    let mut day_slots: Vec<Slot> = slots.iter().filter(|slot| slot.date == day).cloned().collect();
    day_slots.sort_by_key(|slot| (slot.start_time, slot.id));
    day_slots
}

/// Inclusive date range covering the whole month, as sent to range endpoints
pub fn month_range(month: MonthCursor) -> (NaiveDate, NaiveDate) {
    (month.first_day(), month.last_day())
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, slot};
    use crate::SlotStatus;

    fn status_of(availability: &MonthAvailability, date: NaiveDate) -> Option<DayStatus> {
        availability.days.get(&date).map(|summary| summary.status)
    }

    #[test]
    fn test_untouched_open_slot_is_available_then_full() {
        let day = date(2024, 6, 1);
        let mut slots = vec![slot(1, day, "10:00", 5, 5)];
        let month = MonthCursor::containing(day);

        let availability = MonthAvailability::from_resources(month, &slots);
        assert_eq!(status_of(&availability, day), Some(DayStatus::Available));

        slots[0].available_spots = 0;
        let availability = MonthAvailability::from_resources(month, &slots);
        assert_eq!(status_of(&availability, day), Some(DayStatus::Full));
    }

    #[test]
    fn test_day_status_classification() {
        let day = date(2024, 6, 3);
        let untouched = slot(1, day, "09:00", 4, 4);
        let used = slot(2, day, "11:00", 4, 1);
        let full = slot(3, day, "13:00", 4, 0);
        let mut closed = slot(4, day, "15:00", 4, 4);
        closed.status = SlotStatus::Closed;

        assert_eq!(summarize_day(day, [&untouched]).status, DayStatus::Available);
        assert_eq!(summarize_day(day, [&untouched, &used]).status, DayStatus::Partial);
        assert_eq!(summarize_day(day, [&full]).status, DayStatus::Full);
        assert_eq!(summarize_day(day, [&untouched, &full]).status, DayStatus::Partial);
        assert_eq!(summarize_day(day, [&untouched, &closed]).status, DayStatus::Partial);
        assert_eq!(summarize_day::<Slot, _>(day, []).status, DayStatus::Empty);
    }

    #[test]
    fn test_closed_full_slots_are_full() {
        let day = date(2024, 6, 3);
        let mut closed_full = slot(1, day, "09:00", 4, 0);
        closed_full.status = SlotStatus::Closed;
        let full = slot(2, day, "10:00", 4, 0);
        assert_eq!(summarize_day(day, [&closed_full, &full]).status, DayStatus::Full);
    }

    #[test]
    fn test_zero_capacity_day_is_full() {
        let day = date(2024, 6, 3);
        let empty_capacity = slot(1, day, "09:00", 0, 0);
        assert_eq!(summarize_day(day, [&empty_capacity]).status, DayStatus::Full);
    }

    #[test]
    fn test_day_summary_counts() {
        let day = date(2024, 6, 3);
        let a = slot(1, day, "09:00", 5, 3);
        let b = slot(2, day, "11:00", 4, 0);
        let mut c = slot(3, day, "13:00", 6, 6);
        c.status = SlotStatus::Closed;
        let overbooked = slot(4, day, "15:00", 2, 7);

        let summary = summarize_day(day, [&a, &b, &c, &overbooked]);
        assert_eq!(summary.total_slots, 4);
        assert_eq!(summary.total_capacity, 17);
        assert_eq!(summary.available_slots, 2);
        assert_eq!(summary.available_capacity, 5);
        assert_eq!(summary.status, DayStatus::Partial);
    }

    #[test]
    fn test_month_availability_covers_every_day() {
        let month = MonthCursor::new(2024, 2).unwrap();
        let slots = vec![
            slot(1, date(2024, 2, 10), "10:00", 5, 5),
            slot(2, date(2024, 3, 1), "10:00", 5, 5),
        ];
        let availability = MonthAvailability::from_resources(month, &slots);
        let grid = availability.calendar();
        assert_eq!(grid.days.iter().filter(|d| d.summary.is_some()).count(), 29);
        assert_eq!(
            status_of(&availability, date(2024, 2, 10)),
            Some(DayStatus::Available)
        );
        assert_eq!(
            status_of(&availability, date(2024, 2, 11)),
            Some(DayStatus::Empty)
        );
        assert_eq!(status_of(&availability, date(2024, 3, 1)), None);
        assert_eq!(
            status_of(&MonthAvailability::empty(month), date(2024, 2, 10)),
            Some(DayStatus::Empty)
        );
    }

    #[test]
    fn test_calendar_grid_is_monday_first_and_padded() {
        // June 2024 starts on a Saturday and has 30 days
        let month = MonthCursor::new(2024, 6).unwrap();
        let calendar = MonthAvailability::empty(month).calendar();
        assert_eq!(calendar.first_day_of_week, 5);
        assert_eq!(calendar.days.len(), 35);
        assert_eq!(calendar.days[4].day_type, CalendarDayType::PaddingBefore);
        let day_of = |index: usize| calendar.days[index].summary.as_ref().map(|s| s.date);
        assert_eq!(day_of(5), Some(date(2024, 6, 1)));
        assert_eq!(day_of(34), Some(date(2024, 6, 30)));
        assert_eq!(calendar.weeks().count(), 5);

        // September 2024 starts on a Sunday and needs padding after
        let calendar = MonthAvailability::empty(MonthCursor::new(2024, 9).unwrap()).calendar();
        assert_eq!(calendar.first_day_of_week, 6);
        assert_eq!(calendar.days.len(), 42);
        assert_eq!(calendar.days[41].day_type, CalendarDayType::PaddingAfter);
    }

    #[test]
    fn test_month_cursor_navigation() {
        let january = MonthCursor::new(2024, 1).unwrap();
        assert_eq!(january.prev(), MonthCursor::new(2023, 12).unwrap());
        assert_eq!(january.offset(13), MonthCursor::new(2025, 2).unwrap());
        assert_eq!(january.offset(-25), MonthCursor::new(2021, 12).unwrap());
        assert_eq!(MonthCursor::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthCursor::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));
        assert_eq!(MonthCursor::new(2024, 13), None);
        assert_eq!(january.label(), "January 2024");
        assert!(january < january.next());
    }

    #[test]
    fn test_slots_for_day_are_sorted() {
        let day = date(2024, 6, 3);
        let slots = vec![
            slot(3, day, "15:00", 4, 4),
            slot(1, date(2024, 6, 4), "09:00", 4, 4),
            slot(2, day, "09:30", 4, 4),
        ];
        let ids: Vec<_> = slots_for_day(&slots, day).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_week_start_is_monday() {
        assert_eq!(week_start(date(2024, 6, 1)), date(2024, 5, 27));
        assert_eq!(week_start(date(2024, 6, 3)), date(2024, 6, 3));
        assert_eq!(week_start(date(2024, 6, 9)), date(2024, 6, 3));
    }
}
