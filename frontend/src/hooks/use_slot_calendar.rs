use shared::availability::{month_range, CalendarMonth, MonthAvailability, MonthCursor};
use shared::sequence::RequestSequence;
use shared::{BookingDomain, Slot};
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;
use yew::prelude::*;

use crate::hooks::use_session::use_session;
use crate::services::date_utils::today;

const TARGET: &str = "slot-calendar";

#[derive(Clone, PartialEq)]
pub struct SlotCalendarState {
    pub slots: Vec<Slot>,
    pub calendar: CalendarMonth,
    pub loading: bool,
}

pub struct UseSlotCalendarResult {
    pub state: SlotCalendarState,
    pub actions: UseSlotCalendarActions,
}

#[derive(Clone, PartialEq)]
pub struct UseSlotCalendarActions {
    pub prev_month: Callback<MouseEvent>,
    pub next_month: Callback<MouseEvent>,
    pub refresh_calendar: Callback<()>,
}

#[hook]
pub fn use_slot_calendar(domain: BookingDomain) -> UseSlotCalendarResult {
    let session = use_session();
    let month = use_state(|| MonthCursor::containing(today()));
    let slots = use_state(Vec::<Slot>::new);
    let availability = use_state(|| MonthAvailability::empty(MonthCursor::containing(today())));
    let loading = use_state(|| false);
    let sequence = use_mut_ref(RequestSequence::new);

    let refresh_calendar = {
        let api_client = session.api();
        let slots = slots.clone();
        let availability = availability.clone();
        let loading = loading.clone();
        let sequence = sequence.clone();

        use_callback((*month, domain, api_client), move |_, (month, domain, api_client)| {
            let api_client = api_client.clone();
            let slots = slots.clone();
            let availability = availability.clone();
            let loading = loading.clone();
            let sequence = sequence.clone();
            let month = *month;
            let domain = *domain;
            let ticket = sequence.borrow_mut().issue();

            spawn_local(async move {
                loading.set(true);
                let (start, end) = month_range(month);

                let fetched = match api_client.get_slots(domain, start, end).await {
                    Ok(data) => data,
                    Err(e) => {
                        log::warn!(
                            target: TARGET,
                            "Failed to fetch {} slots for {}: {}",
                            domain,
                            month.label(),
                            e
                        );
                        Vec::new()
                    }
                };

                if !sequence.borrow().is_current(ticket) {
                    log::debug!(target: TARGET, "Discarding stale slots for {}", month.label());
                    return;
                }

                availability.set(MonthAvailability::from_resources(month, &fetched));
                slots.set(fetched);
                loading.set(false);
            });
        })
    };

    let prev_month = {
        let month = month.clone();
        use_callback(*month, move |_: MouseEvent, current| month.set(current.prev()))
    };

    let next_month = {
        let month = month.clone();
        use_callback(*month, move |_: MouseEvent, current| month.set(current.next()))
    };

    // Reload whenever the visible month or the token changes
    use_effect_with(refresh_calendar.clone(), |refresh_calendar| {
        refresh_calendar.emit(());
        || ()
    });

    // Late responses after unmount are ignored
    use_effect_with((), {
        let sequence = sequence.clone();
        move |_| move || sequence.borrow_mut().invalidate()
    });

    let state = SlotCalendarState {
        slots: (*slots).clone(),
        calendar: availability.calendar(),
        loading: *loading,
    };

    let actions = UseSlotCalendarActions {
        prev_month,
        next_month,
        refresh_calendar,
    };

    UseSlotCalendarResult { state, actions }
}
