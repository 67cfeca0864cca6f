use chrono::NaiveDate;
use shared::availability::slots_for_day;
use shared::conflict::{check_day_conflict, BookingIntent};
use shared::sequence::RequestSequence;
use shared::{Booking, BookingDomain, BookingDraft, ChildId, Slot, SlotId};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_notice::{Notice, NoticeHandle};
use crate::hooks::use_session::use_session;
use crate::services::api::ApiClient;

const TARGET: &str = "booking-form";

#[derive(Clone, PartialEq)]
pub struct BookingFormState {
    pub intent: BookingIntent,
    pub draft: BookingDraft,
    /// Slots listed for the selected day, by start time
    pub day_slots: Vec<Slot>,
    pub loading_slots: bool,
    pub submitting: bool,
    pub errors: Vec<String>,
}

pub struct UseBookingFormResult {
    pub state: BookingFormState,
    pub actions: UseBookingFormActions,
}

#[derive(Clone, PartialEq)]
pub struct UseBookingFormActions {
    pub select_day: Callback<NaiveDate>,
    pub toggle_slot: Callback<SlotId>,
    pub toggle_child: Callback<ChildId>,
    pub set_comments: Callback<String>,
    pub submit: Callback<()>,
}

/// Everything `submit` reads; a change to any field rebuilds the callback
#[derive(Clone, PartialEq)]
struct SubmitInputs {
    draft: BookingDraft,
    day_slots: Vec<Slot>,
    editing: Option<Booking>,
    domain: BookingDomain,
    api_client: ApiClient,
    in_flight: bool,
    on_saved: Callback<Booking>,
}

fn load_day_slots(
    api_client: ApiClient,
    domain: BookingDomain,
    day: NaiveDate,
    sequence: std::rc::Rc<std::cell::RefCell<RequestSequence>>,
    day_slots: UseStateHandle<Vec<Slot>>,
    loading: UseStateHandle<bool>,
) {
    let ticket = sequence.borrow_mut().issue();
    loading.set(true);
    spawn_local(async move {
        let result = api_client.get_slots_for_day(domain, day).await;
        if !sequence.borrow().is_current(ticket) {
            return;
        }
        match result {
            Ok(slots) => day_slots.set(slots_for_day(&slots, day)),
            Err(e) => {
                log::warn!(target: TARGET, "Failed to load slots for {}: {}", day, e);
                day_slots.set(Vec::new());
            }
        }
        loading.set(false);
    });
}

#[hook]
pub fn use_booking_form(
    domain: BookingDomain,
    editing: Option<Booking>,
    on_saved: Callback<Booking>,
    notice: &NoticeHandle,
) -> UseBookingFormResult {
    let session = use_session();
    let intent = editing
        .as_ref()
        .map(|booking| BookingIntent::Edit(booking.id))
        .unwrap_or(BookingIntent::Create);

    let draft = use_state(|| editing.as_ref().map(BookingDraft::from_booking).unwrap_or_default());
    let day_slots = use_state(Vec::<Slot>::new);
    let loading_slots = use_state(|| false);
    let submitting = use_state(|| false);
    let errors = use_state(Vec::<String>::new);
    let sequence = use_mut_ref(RequestSequence::new);

    // Prefill when the edited booking changes
    {
        let api_client = session.api();
        let draft = draft.clone();
        let errors = errors.clone();
        let day_slots = day_slots.clone();
        let loading_slots = loading_slots.clone();
        let sequence = sequence.clone();
        use_effect_with((domain, editing.clone()), move |(domain, editing)| {
            let next = editing.as_ref().map(BookingDraft::from_booking).unwrap_or_default();
            match next.day {
                Some(day) => {
                    load_day_slots(api_client, *domain, day, sequence, day_slots, loading_slots)
                }
                None => day_slots.set(Vec::new()),
            }
            draft.set(next);
            errors.set(Vec::new());
            || ()
        });
    }

    let select_day = {
        let api_client = session.api();
        let draft = draft.clone();
        let errors = errors.clone();
        let day_slots = day_slots.clone();
        let loading_slots = loading_slots.clone();
        let sequence = sequence.clone();
        use_callback(
            ((*draft).clone(), domain, api_client),
            move |day: NaiveDate, (current, domain, api_client)| {
                let mut next = current.clone();
                if next.day != Some(day) {
                    next.slot_ids.clear();
                }
                next.day = Some(day);
                draft.set(next);
                errors.set(Vec::new());
                load_day_slots(
                    api_client.clone(),
                    *domain,
                    day,
                    sequence.clone(),
                    day_slots.clone(),
                    loading_slots.clone(),
                );
            },
        )
    };

    let toggle_slot = {
        let draft = draft.clone();
        use_callback(((*draft).clone(), domain), move |slot_id: SlotId, (current, domain)| {
            let mut next = current.clone();
            next.toggle_slot(slot_id, domain.allows_multiple_slots());
            draft.set(next);
        })
    };

    let toggle_child = {
        let draft = draft.clone();
        use_callback((*draft).clone(), move |child_id: ChildId, current| {
            let mut next = current.clone();
            next.toggle_child(child_id);
            draft.set(next);
        })
    };

    let set_comments = {
        let draft = draft.clone();
        use_callback((*draft).clone(), move |comments: String, current| {
            let mut next = current.clone();
            next.comments = comments;
            draft.set(next);
        })
    };

    let submit = {
        let api_client = session.api();
        let submitting = submitting.clone();
        let errors = errors.clone();
        let draft_handle = draft.clone();
        let show = notice.show.clone();
        let api_error = notice.api_error.clone();
        use_callback(
            SubmitInputs {
                draft: (*draft).clone(),
                day_slots: (*day_slots).clone(),
                editing: editing.clone(),
                domain,
                api_client,
                in_flight: *submitting,
                on_saved,
            },
            move |_: (), inputs| {
                let SubmitInputs {
                    draft,
                    day_slots,
                    editing,
                    domain,
                    api_client,
                    in_flight,
                    on_saved,
                } = inputs;
                if *in_flight {
                    return;
                }

                let problems = draft.validate(*domain, day_slots, editing.as_ref());
                if !problems.is_empty() {
                    errors.set(problems.iter().map(ToString::to_string).collect());
                    return;
                }
                let Some(day) = draft.day else {
                    return;
                };
                errors.set(Vec::new());
                submitting.set(true);

                let intent = editing
                    .as_ref()
                    .map(|booking| BookingIntent::Edit(booking.id))
                    .unwrap_or(BookingIntent::Create);
                let request = draft.to_request();
                let api_client = api_client.clone();
                let domain = *domain;
                let submitting = submitting.clone();
                let draft_handle = draft_handle.clone();
                let show = show.clone();
                let api_error = api_error.clone();
                let on_saved = on_saved.clone();

                spawn_local(async move {
                    if intent == BookingIntent::Create {
                        match api_client.get_bookings_on_day(domain, day).await {
                            Ok(own) => {
                                if let Err(conflict) = check_day_conflict(intent, day, &own) {
                                    show.emit(Notice::blocking(conflict.to_string()));
                                    submitting.set(false);
                                    return;
                                }
                            }
                            // Advisory only, the backend still rejects duplicates
                            Err(e) => {
                                log::warn!(target: TARGET, "Day conflict check skipped: {}", e)
                            }
                        }
                    }

                    let result = match intent {
                        BookingIntent::Create => {
                            api_client.create_booking(domain, &request).await
                        }
                        BookingIntent::Edit(id) => {
                            api_client.update_booking(domain, id, &request).await
                        }
                    };

                    match result {
                        Ok(booking) => {
                            log::info!(target: TARGET, "Saved {} booking #{}", domain, booking.id);
                            show.emit(Notice::success(format!("Booking #{} saved", booking.id)));
                            if intent == BookingIntent::Create {
                                draft_handle.set(BookingDraft::default());
                            }
                            on_saved.emit(booking);
                        }
                        Err(e) => api_error.emit(e),
                    }
                    submitting.set(false);
                });
            },
        )
    };

    let state = BookingFormState {
        intent,
        draft: (*draft).clone(),
        day_slots: (*day_slots).clone(),
        loading_slots: *loading_slots,
        submitting: *submitting,
        errors: (*errors).clone(),
    };

    let actions = UseBookingFormActions {
        select_day,
        toggle_slot,
        toggle_child,
        set_comments,
        submit,
    };

    UseBookingFormResult { state, actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn inputs(on_saved: Callback<Booking>) -> SubmitInputs {
        SubmitInputs {
            draft: BookingDraft::default(),
            day_slots: Vec::new(),
            editing: None,
            domain: BookingDomain::Daycare,
            api_client: ApiClient::new("http://localhost:8080"),
            in_flight: false,
            on_saved,
        }
    }

    #[wasm_bindgen_test]
    fn test_new_saved_handler_rebuilds_submit() {
        let first = Callback::from(|_: Booking| ());
        let second = Callback::from(|_: Booking| ());
        assert!(inputs(first.clone()) == inputs(first.clone()));
        assert!(inputs(first) != inputs(second));
    }
}
