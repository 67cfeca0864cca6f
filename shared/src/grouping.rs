//! Month → week grouping, search and paging for booking lists.

use crate::availability::{week_start, MonthCursor};
use crate::{BookingRecord, BookingStatus};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// How many months before and after the current one always get a group
pub const PLACEHOLDER_MONTHS: i32 = 11;

/// Bookings shown per page inside an expanded week
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: BookingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    /// Parses the value of a filter `<select>`; unknown values mean `All`
    pub fn from_param(raw: &str) -> Self {
        BookingStatus::parse(raw)
            .map(StatusFilter::Only)
            .unwrap_or(StatusFilter::All)
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            StatusFilter::All => "ALL",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

/// Case-insensitive substring match over the record's search fields.
/// A blank query matches everything.
pub fn matches_query<R: BookingRecord>(record: &R, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_bookings<'a, R: BookingRecord>(
    records: &'a [R],
    filter: StatusFilter,
    query: &str,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| filter.accepts(record.status()) && matches_query(*record, query))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekGroup<T> {
    /// Monday of the week
    pub start: NaiveDate,
    pub bookings: Vec<T>,
}

impl<T> WeekGroup<T> {
    pub fn end(&self) -> NaiveDate {
        self.start + chrono::Duration::days(6)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup<T> {
    pub month: MonthCursor,
    /// Ascending by week start; empty for placeholder months
    pub weeks: Vec<WeekGroup<T>>,
}

impl<T> MonthGroup<T> {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn booking_count(&self) -> usize {
        self.weeks.iter().map(|week| week.bookings.len()).sum()
    }
}

/// Groups records by the month and Monday-started week of their schedule
/// point. Months come most recent first and always include the placeholder
/// window around `today`.
pub fn group_by_month_and_week<T, R>(records: T, today: NaiveDate) -> Vec<MonthGroup<R>>
where
    T: IntoIterator<Item = R>,
    R: BookingRecord,
{
    let mut months: BTreeMap<MonthCursor, BTreeMap<NaiveDate, Vec<R>>> = BTreeMap::new();

    let current = MonthCursor::containing(today);
    for offset in -PLACEHOLDER_MONTHS..=PLACEHOLDER_MONTHS {
        months.entry(current.offset(offset)).or_default();
    }

    for record in records {
        let day = record.scheduled_at().date();
        months
            .entry(MonthCursor::containing(day))
            .or_default()
            .entry(week_start(day))
            .or_default()
            .push(record);
    }

    months
        .into_iter()
        .rev()
        .map(|(month, weeks)| MonthGroup {
            month,
            weeks: weeks
                .into_iter()
                .map(|(start, mut bookings)| {
                    bookings.sort_by_key(|record| (record.scheduled_at(), record.record_id()));
                    WeekGroup { start, bookings }
                })
                .collect(),
        })
        .collect()
}

/// Page state per week, keyed by the week's Monday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekPager {
    page_size: usize,
    pages: HashMap<NaiveDate, usize>,
}

impl Default for WeekPager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl WeekPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            pages: HashMap::new(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Never less than one, so an empty week still shows "page 1 of 1"
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Zero-based page for `week`, clamped to the pages `len` items produce
    pub fn page(&self, week: NaiveDate, len: usize) -> usize {
        let stored = self.pages.get(&week).copied().unwrap_or(0);
        stored.min(self.page_count(len) - 1)
    }

    pub fn set_page(&mut self, week: NaiveDate, page: usize, len: usize) {
        let clamped = page.min(self.page_count(len) - 1);
        self.pages.insert(week, clamped);
    }

    pub fn next(&mut self, week: NaiveDate, len: usize) {
        let page = self.page(week, len);
        self.set_page(week, page + 1, len);
    }

    pub fn prev(&mut self, week: NaiveDate, len: usize) {
        let page = self.page(week, len);
        self.set_page(week, page.saturating_sub(1), len);
    }

    /// Items of the current page of `week`
    pub fn visible<'a, T>(&self, week: NaiveDate, items: &'a [T]) -> &'a [T] {
        let start = self.page(week, items.len()) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        items.get(start..end).unwrap_or(&[])
    }

    /// Forgets every week's page, e.g. after the filter changes
    pub fn reset(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{booking, date, slot};
    use crate::Booking;

    fn sample() -> Vec<Booking> {
        vec![
            booking(1, BookingStatus::Pending, vec![slot(10, date(2024, 6, 5), "10:00", 5, 4)]),
            booking(2, BookingStatus::Confirmed, vec![slot(11, date(2024, 6, 3), "16:00", 5, 4)]),
            booking(3, BookingStatus::Cancelled, vec![slot(12, date(2024, 6, 3), "09:00", 5, 4)]),
            booking(4, BookingStatus::Pending, vec![slot(13, date(2024, 7, 1), "11:30", 5, 4)]),
            booking(5, BookingStatus::Closed, vec![]),
        ]
    }

    #[test]
    fn test_every_booking_lands_in_one_week() {
        let bookings = sample();
        let groups = group_by_month_and_week(&bookings, date(2024, 6, 15));

        let mut seen: Vec<i64> = groups
            .iter()
            .flat_map(|month| month.weeks.iter())
            .flat_map(|week| week.bookings.iter().map(|b| b.id))
            .collect();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_months_descend_and_weeks_ascend() {
        let bookings = sample();
        let groups = group_by_month_and_week(&bookings, date(2024, 6, 15));

        assert_eq!(groups.len(), 23);
        assert_eq!(groups[0].month, MonthCursor::new(2025, 5).unwrap());
        assert_eq!(groups[22].month, MonthCursor::new(2023, 7).unwrap());
        assert!(groups.windows(2).all(|pair| pair[0].month > pair[1].month));

        let june = groups
            .iter()
            .find(|group| group.month == MonthCursor::new(2024, 6).unwrap())
            .unwrap();
        let starts: Vec<_> = june.weeks.iter().map(|week| week.start).collect();
        assert_eq!(starts, vec![date(2024, 6, 3)]);
        let ids: Vec<_> = june.weeks[0].bookings.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_booking_without_slots_uses_creation_time() {
        let bookings = sample();
        let groups = group_by_month_and_week(&bookings, date(2024, 6, 15));
        let may = groups
            .iter()
            .find(|group| group.month == MonthCursor::new(2024, 5).unwrap())
            .unwrap();
        assert_eq!(may.weeks.len(), 1);
        assert_eq!(may.weeks[0].start, date(2024, 5, 20));
        assert_eq!(may.weeks[0].bookings[0].id, 5);
    }

    #[test]
    fn test_bookings_outside_placeholder_window_get_their_own_month() {
        let old = vec![booking(
            9,
            BookingStatus::Closed,
            vec![slot(1, date(2020, 1, 8), "10:00", 5, 5)],
        )];
        let groups = group_by_month_and_week(&old, date(2024, 6, 15));
        assert_eq!(groups.len(), 24);
        let last = groups.last().unwrap();
        assert_eq!(last.month, MonthCursor::new(2020, 1).unwrap());
        assert_eq!(last.booking_count(), 1);
    }

    #[test]
    fn test_search_fields() {
        let bookings = sample();
        let ids = |query: &str| -> Vec<i64> {
            filter_bookings(&bookings, StatusFilter::All, query)
                .iter()
                .map(|b| b.id)
                .collect()
        };

        assert_eq!(ids("").len(), 5);
        assert_eq!(ids("   ").len(), 5);
        assert_eq!(ids("LAURA@EXAMPLE").len(), 5);
        assert_eq!(ids("03/06/2024"), vec![2, 3]);
        assert_eq!(ids("16:00"), vec![2]);
        assert_eq!(ids("09:00 - 10:00"), vec![3]);
        assert_eq!(ids("cancelled"), vec![3]);
        assert_eq!(ids("600123"), vec![1, 2, 3, 4, 5]);
        assert!(ids("nobody").is_empty());
    }

    #[test]
    fn test_status_filter() {
        let bookings = sample();
        let pending = filter_bookings(&bookings, StatusFilter::Only(BookingStatus::Pending), "");
        assert_eq!(pending.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 4]);

        assert_eq!(
            StatusFilter::from_param("confirmed"),
            StatusFilter::Only(BookingStatus::Confirmed)
        );
        assert_eq!(StatusFilter::from_param("ALL"), StatusFilter::All);
        assert_eq!(StatusFilter::Only(BookingStatus::Closed).as_param(), "CLOSED");
    }

    #[test]
    fn test_week_pager_keeps_pages_per_week_and_clamps() {
        let week_a = date(2024, 6, 3);
        let week_b = date(2024, 6, 10);
        let items: Vec<u32> = (0..23).collect();
        let mut pager = WeekPager::default();

        assert_eq!(pager.page_count(items.len()), 3);
        assert_eq!(pager.page_count(0), 1);

        pager.next(week_a, items.len());
        pager.next(week_a, items.len());
        pager.next(week_a, items.len());
        assert_eq!(pager.page(week_a, items.len()), 2);
        assert_eq!(pager.visible(week_a, &items), &[20, 21, 22]);
        assert_eq!(pager.page(week_b, items.len()), 0);

        // The week shrank after a filter change
        assert_eq!(pager.page(week_a, 12), 1);
        assert_eq!(pager.visible(week_a, &items[..12]), &[10, 11]);

        pager.prev(week_a, items.len());
        assert_eq!(pager.page(week_a, items.len()), 1);

        pager.reset();
        assert_eq!(pager.page(week_a, items.len()), 0);
    }
}
