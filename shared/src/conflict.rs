//! Client-side check that a guardian does not book the same day twice.
//! The backend still has the final word.

use crate::{BookingId, BookingRecord};
use chrono::NaiveDate;
use thiserror::Error;

/// What the booking form is about to submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingIntent {
    Create,
    Edit(BookingId),
}

impl BookingIntent {
    pub fn is_edit(&self) -> bool {
        matches!(self, BookingIntent::Edit(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("You already have booking #{existing} on {}", .day.format("%d/%m/%Y"))]
pub struct DayConflict {
    pub day: NaiveDate,
    pub existing: BookingId,
}

/// Fails when one of the requester's own non-cancelled bookings occupies
/// `day`. Edits are never checked.
pub fn check_day_conflict<R: BookingRecord>(
    intent: BookingIntent,
    day: NaiveDate,
    own_bookings: &[R],
) -> Result<(), DayConflict> {
    if intent.is_edit() {
        return Ok(());
    }

    match own_bookings
        .iter()
        .find(|booking| booking.status().holds_capacity() && booking.occupies(day))
    {
        Some(existing) => Err(DayConflict {
            day,
            existing: existing.record_id(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{booking, date, slot};
    use crate::BookingStatus;

    #[test]
    fn test_active_booking_on_same_day_conflicts() {
        let day = date(2024, 6, 3);
        for status in [BookingStatus::Pending, BookingStatus::Confirmed] {
            let own = vec![booking(4, status, vec![slot(1, day, "10:00", 5, 4)])];
            let conflict = check_day_conflict(BookingIntent::Create, day, &own).unwrap_err();
            assert_eq!(conflict.existing, 4);
            assert_eq!(
                conflict.to_string(),
                "You already have booking #4 on 03/06/2024"
            );
        }
    }

    #[test]
    fn test_cancelled_or_other_day_does_not_conflict() {
        let day = date(2024, 6, 3);
        let own = vec![
            booking(1, BookingStatus::Cancelled, vec![slot(1, day, "10:00", 5, 4)]),
            booking(2, BookingStatus::Pending, vec![slot(2, date(2024, 6, 4), "10:00", 5, 4)]),
        ];
        assert!(check_day_conflict(BookingIntent::Create, day, &own).is_ok());
    }

    #[test]
    fn test_edit_is_never_flagged() {
        let day = date(2024, 6, 3);
        let own = vec![booking(4, BookingStatus::Pending, vec![slot(1, day, "10:00", 5, 4)])];
        assert!(check_day_conflict(BookingIntent::Edit(4), day, &own).is_ok());
        assert!(check_day_conflict(BookingIntent::Edit(99), day, &own).is_ok());
    }
}
