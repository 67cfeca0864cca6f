use shared::conflict::BookingIntent;
use shared::{format_long_date, Booking, BookingDomain, Child};
use web_sys::{HtmlTextAreaElement, MouseEvent};
use yew::prelude::*;

use super::calendar::SlotCalendar;
use crate::hooks::use_booking_form::use_booking_form;
use crate::hooks::use_notice::NoticeHandle;
use crate::hooks::use_slot_calendar::use_slot_calendar;

#[derive(Properties, PartialEq)]
pub struct BookingFormProps {
    pub domain: BookingDomain,
    #[prop_or_default]
    pub editing: Option<Booking>,
    #[prop_or_default]
    pub children: Vec<Child>,
    pub notice: NoticeHandle,
    pub on_saved: Callback<Booking>,
    #[prop_or_default]
    pub on_cancel: Option<Callback<()>>,
}

#[function_component(BookingForm)]
pub fn booking_form(props: &BookingFormProps) -> Html {
    let calendar = use_slot_calendar(props.domain);

    // Saving changes availability, so the calendar reloads too
    let on_saved = {
        let on_saved = props.on_saved.clone();
        let refresh_calendar = calendar.actions.refresh_calendar.clone();
        Callback::from(move |booking: Booking| {
            refresh_calendar.emit(());
            on_saved.emit(booking);
        })
    };

    let form = use_booking_form(props.domain, props.editing.clone(), on_saved, &props.notice);
    let state = &form.state;
    let multiple = props.domain.allows_multiple_slots();

    let held_slots: Vec<_> = props
        .editing
        .as_ref()
        .map(|booking| booking.slots.iter().map(|slot| slot.id).collect())
        .unwrap_or_default();

    let on_comments = {
        let set_comments = form.actions.set_comments.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            set_comments.emit(area.value());
        })
    };

    let on_submit = {
        let submit = form.actions.submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            submit.emit(());
        })
    };

    let title = match state.intent {
        BookingIntent::Create => format!("New {} booking", props.domain.label().to_lowercase()),
        BookingIntent::Edit(id) => format!("Edit booking #{}", id),
    };

    html! {
        <div class="booking-form">
            <h2>{title}</h2>

            <SlotCalendar
                calendar={calendar.state.calendar.clone()}
                selected={state.draft.day}
                on_select={form.actions.select_day.clone()}
                on_prev={calendar.actions.prev_month.clone()}
                on_next={calendar.actions.next_month.clone()}
                loading={calendar.state.loading}
            />

            <form onsubmit={on_submit}>
                {match state.draft.day {
                    None => html! { <p class="hint">{"Pick a day in the calendar"}</p> },
                    Some(day) => html! {
                        <fieldset class="slot-picker" disabled={state.submitting}>
                            <legend>{format_long_date(day)}</legend>
                            {if state.loading_slots {
                                html! { <div class="loading">{"Loading slots..."}</div> }
                            } else if state.day_slots.is_empty() {
                                html! { <p class="empty-state">{"No slots on this day"}</p> }
                            } else {
                                html! {
                                    {for state.day_slots.iter().map(|slot| {
                                        let id = slot.id;
                                        let checked = state.draft.slot_ids.contains(&id);
                                        let enabled =
                                            slot.is_bookable() || held_slots.contains(&id);
                                        let onchange = {
                                            let toggle_slot = form.actions.toggle_slot.clone();
                                            Callback::from(move |_: Event| toggle_slot.emit(id))
                                        };
                                        html! {
                                            <label class={classes!("slot-option", (!enabled).then_some("disabled"))}>
                                                <input
                                                    type={if multiple { "checkbox" } else { "radio" }}
                                                    name="slot"
                                                    {checked}
                                                    disabled={!enabled}
                                                    {onchange}
                                                />
                                                <span>{slot.time_range_label()}</span>
                                                <span class="muted">
                                                    {format!(
                                                        "{} of {} places free",
                                                        slot.free_spots(),
                                                        slot.capacity
                                                    )}
                                                </span>
                                            </label>
                                        }
                                    })}
                                }
                            }}
                        </fieldset>
                    },
                }}

                {if props.domain.requires_children() {
                    html! {
                        <fieldset class="child-picker" disabled={state.submitting}>
                            <legend>{"Children"}</legend>
                            {if props.children.is_empty() {
                                html! { <p class="hint">{"Add a child in the Children tab first"}</p> }
                            } else {
                                html! {
                                    {for props.children.iter().map(|child| {
                                        let id = child.id;
                                        let onchange = {
                                            let toggle_child = form.actions.toggle_child.clone();
                                            Callback::from(move |_: Event| toggle_child.emit(id))
                                        };
                                        html! {
                                            <label class="child-option">
                                                <input
                                                    type="checkbox"
                                                    checked={state.draft.child_ids.contains(&id)}
                                                    {onchange}
                                                />
                                                {child.full_name()}
                                            </label>
                                        }
                                    })}
                                }
                            }}
                        </fieldset>
                    }
                } else {
                    html! {}
                }}

                <div class="form-group">
                    <label for="booking-comments">{"Comments"}</label>
                    <textarea
                        id="booking-comments"
                        value={state.draft.comments.clone()}
                        oninput={on_comments}
                        disabled={state.submitting}
                    />
                </div>

                {if state.errors.is_empty() {
                    html! {}
                } else {
                    html! {
                        <ul class="form-message error">
                            {for state.errors.iter().map(|error| html! { <li>{error}</li> })}
                        </ul>
                    }
                }}

                <div class="form-buttons">
                    <button type="submit" class="btn btn-primary" disabled={state.submitting}>
                        {if state.submitting { "Saving..." } else { "Save booking" }}
                    </button>
                    {match &props.on_cancel {
                        Some(on_cancel) => {
                            let on_cancel = on_cancel.clone();
                            html! {
                                <button
                                    type="button"
                                    class="btn btn-secondary"
                                    disabled={state.submitting}
                                    onclick={Callback::from(move |_: MouseEvent| on_cancel.emit(()))}
                                >
                                    {"Cancel"}
                                </button>
                            }
                        }
                        None => html! {},
                    }}
                </div>
            </form>
        </div>
    }
}
