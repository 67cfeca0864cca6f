//! Optimistic status changes and deletions on an in-memory booking list.
//!
//! A mutation is validated against the status machine and applied locally,
//! handing back a [`MutationTicket`]. Once the request resolves the ticket is
//! either committed or rolled back, which restores the exact previous state.
//! A ticket outlived by a refetch or a newer mutation on the same record is
//! ignored.

use crate::sequence::{RequestSequence, RequestTicket};
use crate::{Booking, BookingDomain, BookingId, BookingRecord, BookingStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Records whose status can be changed in place
pub trait StatusMut: BookingRecord {
    fn set_status(&mut self, status: BookingStatus);
}

impl StatusMut for Booking {
    fn set_status(&mut self, status: BookingStatus) {
        self.status = status;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Confirm,
    Cancel,
    Close,
    SetStatus(BookingStatus),
    Delete,
}

impl Mutation {
    /// Status the record ends up in, `None` for deletions
    pub fn target_status(&self) -> Option<BookingStatus> {
        match self {
            Mutation::Confirm => Some(BookingStatus::Confirmed),
            Mutation::Cancel => Some(BookingStatus::Cancelled),
            Mutation::Close => Some(BookingStatus::Closed),
            Mutation::SetStatus(status) => Some(*status),
            Mutation::Delete => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Booking #{0} is not in the list")]
    UnknownBooking(BookingId),
    #[error("A {0} booking can no longer be changed")]
    Immutable(BookingStatus),
    #[error("Cannot move a booking from {from} to {to}")]
    Forbidden {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("{status} is not a valid status for {domain}")]
    Unsupported {
        domain: BookingDomain,
        status: BookingStatus,
    },
    #[error("Booking #{0} already has a change in progress")]
    InFlight(BookingId),
}

/// Checks a mutation against the status machine of `domain`
pub fn validate_transition(
    domain: BookingDomain,
    current: BookingStatus,
    mutation: Mutation,
) -> Result<(), TransitionError> {
    let Some(target) = mutation.target_status() else {
        return match current {
            BookingStatus::Closed => Err(TransitionError::Immutable(current)),
            _ => Ok(()),
        };
    };

    if !domain.supports(target) {
        return Err(TransitionError::Unsupported {
            domain,
            status: target,
        });
    }
    if current.is_terminal() {
        return Err(TransitionError::Immutable(current));
    }
    if !current.can_transition_to(target) {
        return Err(TransitionError::Forbidden {
            from: current,
            to: target,
        });
    }
    Ok(())
}

/// Handle for an applied but unconfirmed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct MutationTicket {
    pub id: BookingId,
    pub mutation: Mutation,
    generation: RequestTicket,
}

#[derive(Debug, Clone, PartialEq)]
enum Undo<T> {
    Status(BookingStatus),
    Removed { index: usize, item: T },
}

#[derive(Debug, Clone, PartialEq)]
struct PendingChange<T> {
    generation: RequestTicket,
    undo: Undo<T>,
}

/// Booking list with at most one unconfirmed mutation per record
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticList<T> {
    domain: BookingDomain,
    items: Vec<T>,
    pending: HashMap<BookingId, PendingChange<T>>,
    generations: RequestSequence,
}

impl<T: StatusMut + Clone> OptimisticList<T> {
    pub fn new(domain: BookingDomain, items: Vec<T>) -> Self {
        Self {
            domain,
            items,
            pending: HashMap::new(),
            generations: RequestSequence::new(),
        }
    }

    pub fn domain(&self) -> BookingDomain {
        self.domain
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: BookingId) -> Option<&T> {
        self.items.iter().find(|item| item.record_id() == id)
    }

    /// Swaps in freshly fetched data, dropping pending undo state
    pub fn replace(&mut self, items: Vec<T>) {
        if !self.pending.is_empty() {
            log::debug!("Dropping {} pending undo entries on refresh", self.pending.len());
        }
        self.items = items;
        self.pending.clear();
    }

    pub fn is_pending(&self, id: BookingId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Validates and applies `mutation` locally. Nothing changes on error.
    pub fn apply(
        &mut self,
        id: BookingId,
        mutation: Mutation,
    ) -> Result<MutationTicket, TransitionError> {
        if self.is_pending(id) {
            return Err(TransitionError::InFlight(id));
        }
        let index = self
            .items
            .iter()
            .position(|item| item.record_id() == id)
            .ok_or(TransitionError::UnknownBooking(id))?;

        let current = self.items[index].status();
        validate_transition(self.domain, current, mutation)?;

        let undo = match mutation.target_status() {
            Some(target) => {
                self.items[index].set_status(target);
                Undo::Status(current)
            }
            None => Undo::Removed {
                index,
                item: self.items.remove(index),
            },
        };
        let generation = self.generations.issue();
        self.pending.insert(id, PendingChange { generation, undo });
        Ok(MutationTicket {
            id,
            mutation,
            generation,
        })
    }

    /// Takes the undo entry `ticket` created, if it is still the live one
    fn take_pending(&mut self, ticket: MutationTicket) -> Option<Undo<T>> {
        match self.pending.get(&ticket.id) {
            Some(change) if change.generation == ticket.generation => {
                self.pending.remove(&ticket.id).map(|change| change.undo)
            }
            _ => {
                log::debug!(
                    "Ignoring stale {:?} ticket for booking #{}",
                    ticket.mutation,
                    ticket.id
                );
                None
            }
        }
    }

    /// Keeps the optimistic state
    pub fn commit(&mut self, ticket: MutationTicket) {
        self.take_pending(ticket);
    }

    /// Restores the record as it was before `ticket` was applied
    pub fn rollback(&mut self, ticket: MutationTicket) {
        match self.take_pending(ticket) {
            Some(Undo::Status(previous)) => {
                if let Some(item) = self
                    .items
                    .iter_mut()
                    .find(|item| item.record_id() == ticket.id)
                {
                    item.set_status(previous);
                }
            }
            Some(Undo::Removed { index, item }) => {
                let index = index.min(self.items.len());
                self.items.insert(index, item);
            }
            None => {}
        }
    }

    /// Inserts or replaces a record, e.g. with the server's copy after a save
    pub fn upsert(&mut self, item: T) {
        let id = item.record_id();
        match self.items.iter_mut().find(|existing| existing.record_id() == id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{booking, date, slot};

    fn list(domain: BookingDomain) -> OptimisticList<Booking> {
        let day = date(2024, 6, 3);
        OptimisticList::new(
            domain,
            vec![
                booking(1, BookingStatus::Pending, vec![slot(1, day, "09:00", 5, 4)]),
                booking(2, BookingStatus::Confirmed, vec![slot(2, day, "10:00", 5, 4)]),
                booking(3, BookingStatus::Closed, vec![slot(3, day, "11:00", 5, 4)]),
                booking(4, BookingStatus::Cancelled, vec![slot(4, day, "12:00", 5, 4)]),
            ],
        )
    }

    fn statuses(list: &OptimisticList<Booking>) -> Vec<(i64, BookingStatus)> {
        list.items().iter().map(|b| (b.id, b.status)).collect()
    }

    #[test]
    fn test_status_change_commit_keeps_state() {
        let mut bookings = list(BookingDomain::Daycare);
        let ticket = bookings.apply(1, Mutation::Confirm).unwrap();
        assert!(bookings.is_pending(1));
        assert_eq!(bookings.get(1).unwrap().status, BookingStatus::Confirmed);

        bookings.commit(ticket);
        assert!(!bookings.is_pending(1));
        assert_eq!(bookings.get(1).unwrap().status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_failed_status_change_rolls_back_exactly() {
        let mut bookings = list(BookingDomain::Visit);
        let before = bookings.items().to_vec();
        let ticket = bookings.apply(2, Mutation::Close).unwrap();
        assert_eq!(bookings.get(2).unwrap().status, BookingStatus::Closed);

        bookings.rollback(ticket);
        assert_eq!(bookings.items(), before.as_slice());
        assert!(!bookings.is_pending(2));
    }

    #[test]
    fn test_failed_delete_restores_position() {
        let mut bookings = list(BookingDomain::Daycare);
        let before = statuses(&bookings);
        let ticket = bookings.apply(2, Mutation::Delete).unwrap();
        assert!(bookings.get(2).is_none());
        assert_eq!(bookings.items().len(), 3);

        bookings.rollback(ticket);
        assert_eq!(statuses(&bookings), before);
    }

    #[test]
    fn test_invalid_transitions_have_no_side_effects() {
        let mut bookings = list(BookingDomain::Daycare);
        let before = bookings.clone();

        assert_eq!(
            bookings.apply(4, Mutation::Confirm),
            Err(TransitionError::Immutable(BookingStatus::Cancelled))
        );
        assert_eq!(
            bookings.apply(3, Mutation::Cancel),
            Err(TransitionError::Immutable(BookingStatus::Closed))
        );
        assert_eq!(
            bookings.apply(1, Mutation::Close),
            Err(TransitionError::Forbidden {
                from: BookingStatus::Pending,
                to: BookingStatus::Closed,
            })
        );
        assert_eq!(
            bookings.apply(1, Mutation::SetStatus(BookingStatus::Pending)),
            Err(TransitionError::Forbidden {
                from: BookingStatus::Pending,
                to: BookingStatus::Pending,
            })
        );
        assert_eq!(
            bookings.apply(3, Mutation::Delete),
            Err(TransitionError::Immutable(BookingStatus::Closed))
        );
        assert_eq!(
            bookings.apply(42, Mutation::Cancel),
            Err(TransitionError::UnknownBooking(42))
        );
        assert_eq!(bookings, before);
    }

    #[test]
    fn test_birthday_bookings_cannot_be_closed() {
        let mut bookings = list(BookingDomain::Birthday);
        assert_eq!(
            bookings.apply(2, Mutation::Close),
            Err(TransitionError::Unsupported {
                domain: BookingDomain::Birthday,
                status: BookingStatus::Closed,
            })
        );
        assert!(bookings.apply(2, Mutation::Cancel).is_ok());
    }

    #[test]
    fn test_second_mutation_while_in_flight_is_rejected() {
        let mut bookings = list(BookingDomain::Daycare);
        let ticket = bookings.apply(1, Mutation::Confirm).unwrap();
        assert_eq!(
            bookings.apply(1, Mutation::Cancel),
            Err(TransitionError::InFlight(1))
        );
        bookings.commit(ticket);
        assert!(bookings.apply(1, Mutation::Cancel).is_ok());
    }

    #[test]
    fn test_cancelled_booking_can_be_deleted() {
        let mut bookings = list(BookingDomain::Visit);
        let ticket = bookings.apply(4, Mutation::Delete).unwrap();
        bookings.commit(ticket);
        assert!(bookings.get(4).is_none());
    }

    #[test]
    fn test_replace_and_upsert() {
        let mut bookings = list(BookingDomain::Daycare);
        let _ticket = bookings.apply(1, Mutation::Cancel).unwrap();
        bookings.replace(vec![booking(9, BookingStatus::Pending, vec![])]);
        assert!(!bookings.is_pending(1));

        bookings.upsert(booking(9, BookingStatus::Confirmed, vec![]));
        bookings.upsert(booking(10, BookingStatus::Pending, vec![]));
        assert_eq!(
            statuses(&bookings),
            vec![(9, BookingStatus::Confirmed), (10, BookingStatus::Pending)]
        );
    }

    #[test]
    fn test_ticket_from_before_refetch_cannot_undo_newer_change() {
        let day = date(2024, 6, 3);
        let mut bookings = list(BookingDomain::Daycare);
        let first = bookings.apply(1, Mutation::Confirm).unwrap();

        // Refetch lands while the confirm is still in flight
        bookings.replace(vec![booking(
            1,
            BookingStatus::Confirmed,
            vec![slot(1, day, "09:00", 5, 4)],
        )]);
        let second = bookings.apply(1, Mutation::Cancel).unwrap();

        bookings.rollback(first);
        assert_eq!(bookings.get(1).unwrap().status, BookingStatus::Cancelled);
        assert!(bookings.is_pending(1));

        bookings.commit(second);
        assert_eq!(bookings.get(1).unwrap().status, BookingStatus::Cancelled);
        assert!(!bookings.is_pending(1));
    }

    #[test]
    fn test_stale_commit_keeps_newer_undo_entry() {
        let day = date(2024, 6, 3);
        let mut bookings = list(BookingDomain::Daycare);
        let first = bookings.apply(1, Mutation::Confirm).unwrap();
        bookings.replace(vec![booking(
            1,
            BookingStatus::Confirmed,
            vec![slot(1, day, "09:00", 5, 4)],
        )]);
        let second = bookings.apply(1, Mutation::Delete).unwrap();

        bookings.commit(first);
        assert!(bookings.is_pending(1));

        bookings.rollback(second);
        assert_eq!(bookings.get(1).unwrap().status, BookingStatus::Confirmed);
        assert!(!bookings.is_pending(1));
    }
}
