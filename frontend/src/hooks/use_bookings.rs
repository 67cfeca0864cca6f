use std::cell::RefCell;

use shared::optimistic::{Mutation, OptimisticList};
use shared::sequence::RequestSequence;
use shared::{Booking, BookingDomain, BookingId};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_notice::{Notice, NoticeHandle};
use crate::hooks::use_session::use_session;

const TARGET: &str = "bookings";

#[derive(Clone, PartialEq)]
pub struct BookingsState {
    pub bookings: Vec<Booking>,
    /// Bookings with a change in flight; their controls stay disabled
    pub pending: Vec<BookingId>,
    pub loading: bool,
}

impl BookingsState {
    pub fn is_pending(&self, id: BookingId) -> bool {
        self.pending.contains(&id)
    }
}

pub struct UseBookingsResult {
    pub state: BookingsState,
    pub actions: UseBookingsActions,
}

#[derive(Clone, PartialEq)]
pub struct UseBookingsActions {
    pub refresh_bookings: Callback<()>,
    pub mutate: Callback<(BookingId, Mutation)>,
    pub upsert: Callback<Booking>,
}

fn snapshot(list: &RefCell<OptimisticList<Booking>>) -> (Vec<Booking>, Vec<BookingId>) {
    let list = list.borrow();
    let pending = list
        .items()
        .iter()
        .map(|booking| booking.id)
        .filter(|id| list.is_pending(*id))
        .collect();
    (list.items().to_vec(), pending)
}

fn done_text(id: BookingId, mutation: Mutation) -> String {
    match mutation {
        Mutation::Delete => format!("Booking #{} deleted", id),
        other => match other.target_status() {
            Some(status) => format!("Booking #{} is now {}", id, status.label().to_lowercase()),
            None => format!("Booking #{} updated", id),
        },
    }
}

#[hook]
pub fn use_bookings(domain: BookingDomain, notice: &NoticeHandle) -> UseBookingsResult {
    let session = use_session();
    let list = use_mut_ref(|| OptimisticList::<Booking>::new(domain, Vec::new()));
    let bookings = use_state(Vec::<Booking>::new);
    let pending = use_state(Vec::<BookingId>::new);
    let loading = use_state(|| true);
    let sequence = use_mut_ref(RequestSequence::new);

    let publish = {
        let list = list.clone();
        let bookings = bookings.clone();
        let pending = pending.clone();
        Callback::from(move |_: ()| {
            let (items, in_flight) = snapshot(&list);
            bookings.set(items);
            pending.set(in_flight);
        })
    };

    let refresh_bookings = {
        let list = list.clone();
        let loading = loading.clone();
        let sequence = sequence.clone();
        let publish = publish.clone();
        let api_error = notice.api_error.clone();

        use_callback((domain, session.api()), move |_, (domain, api_client)| {
            let api_client = api_client.clone();
            let list = list.clone();
            let loading = loading.clone();
            let sequence = sequence.clone();
            let publish = publish.clone();
            let api_error = api_error.clone();
            let domain = *domain;
            let ticket = sequence.borrow_mut().issue();

            spawn_local(async move {
                loading.set(true);
                let result = api_client.get_bookings(domain).await;
                if !sequence.borrow().is_current(ticket) {
                    return;
                }

                match result {
                    Ok(data) => {
                        let mut list = list.borrow_mut();
                        if list.domain() == domain {
                            list.replace(data);
                        } else {
                            *list = OptimisticList::new(domain, data);
                        }
                    }
                    Err(e) => {
                        log::error!(target: TARGET, "Failed to fetch {} bookings: {}", domain, e);
                        api_error.emit(e);
                    }
                }
                publish.emit(());
                loading.set(false);
            });
        })
    };

    let mutate = {
        let list = list.clone();
        let publish = publish.clone();
        let show = notice.show.clone();
        let api_error = notice.api_error.clone();

        use_callback(
            (domain, session.api()),
            move |(id, mutation): (BookingId, Mutation), (domain, api_client)| {
                let ticket = match list.borrow_mut().apply(id, mutation) {
                    Ok(ticket) => ticket,
                    Err(e) => {
                        log::info!(
                            target: TARGET,
                            "Rejected {:?} on booking #{}: {}",
                            mutation,
                            id,
                            e
                        );
                        show.emit(Notice::error(e.to_string()));
                        return;
                    }
                };
                publish.emit(());

                let api_client = api_client.clone();
                let list = list.clone();
                let publish = publish.clone();
                let show = show.clone();
                let api_error = api_error.clone();
                let domain = *domain;

                spawn_local(async move {
                    let result = match mutation.target_status() {
                        Some(status) => {
                            api_client.change_booking_status(domain, id, status).await
                        }
                        None => api_client.delete_booking(domain, id).await,
                    };

                    match result {
                        Ok(()) => {
                            list.borrow_mut().commit(ticket);
                            show.emit(Notice::success(done_text(id, mutation)));
                        }
                        Err(e) => {
                            log::warn!(
                                target: TARGET,
                                "Rolling back {:?} on booking #{}: {}",
                                mutation,
                                id,
                                e
                            );
                            list.borrow_mut().rollback(ticket);
                            api_error.emit(e);
                        }
                    }
                    publish.emit(());
                });
            },
        )
    };

    let upsert = {
        let list = list.clone();
        let publish = publish.clone();
        use_callback((), move |booking: Booking, _| {
            list.borrow_mut().upsert(booking);
            publish.emit(());
        })
    };

    use_effect_with(refresh_bookings.clone(), |refresh_bookings| {
        refresh_bookings.emit(());
        || ()
    });

    use_effect_with((), {
        let sequence = sequence.clone();
        move |_| move || sequence.borrow_mut().invalidate()
    });

    let state = BookingsState {
        bookings: (*bookings).clone(),
        pending: (*pending).clone(),
        loading: *loading,
    };

    let actions = UseBookingsActions {
        refresh_bookings,
        mutate,
        upsert,
    };

    UseBookingsResult { state, actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_done_text() {
        assert_eq!(done_text(4, Mutation::Delete), "Booking #4 deleted");
        assert_eq!(done_text(4, Mutation::Confirm), "Booking #4 is now confirmed");
        assert_eq!(
            done_text(9, Mutation::SetStatus(shared::BookingStatus::Closed)),
            "Booking #9 is now closed"
        );
    }
}
