use chrono::NaiveDate;
use shared::optimistic::Mutation;
use shared::{format_long_date, Booking, BookingDomain, BookingId, BookingRecord};
use web_sys::MouseEvent;
use yew::prelude::*;

use super::booking_list::{BookingList, BookingTable};
use super::calendar::SlotCalendar;
use super::slot_admin::SlotAdmin;
use crate::hooks::use_bookings::{use_bookings, BookingsState};
use crate::hooks::use_notice::NoticeHandle;
use crate::hooks::use_persisted_tab::use_persisted_tab;
use crate::hooks::use_slot_calendar::use_slot_calendar;

const TABS: &[&str] = &["bookings", "calendar", "slots"];

fn tab_label(tab: &str) -> &'static str {
    match tab {
        "calendar" => "By day",
        "slots" => "Slots",
        _ => "Bookings",
    }
}

#[derive(Properties, PartialEq)]
pub struct DomainPanelProps {
    pub domain: BookingDomain,
    pub notice: NoticeHandle,
}

/// Staff view of one booking domain
#[function_component(DomainPanel)]
pub fn domain_panel(props: &DomainPanelProps) -> Html {
    let (active, select_tab) = use_persisted_tab(props.domain.tab_storage_key(), TABS);
    let bookings = use_bookings(props.domain, &props.notice);

    html! {
        <div class="domain-panel">
            <nav class="sub-tabs">
                {for TABS.iter().map(|tab| {
                    let onclick = {
                        let select_tab = select_tab.clone();
                        Callback::from(move |_: MouseEvent| select_tab.emit(tab.to_string()))
                    };
                    html! {
                        <button
                            type="button"
                            class={classes!("sub-tab", (active == *tab).then_some("active"))}
                            {onclick}
                        >
                            {tab_label(tab)}
                        </button>
                    }
                })}
                <button
                    type="button"
                    class="btn btn-small refresh"
                    disabled={bookings.state.loading}
                    onclick={{
                        let refresh = bookings.actions.refresh_bookings.clone();
                        Callback::from(move |_: MouseEvent| refresh.emit(()))
                    }}
                >
                    {"Refresh"}
                </button>
            </nav>

            {match active.as_str() {
                "calendar" => html! {
                    <DayBookings
                        domain={props.domain}
                        state={bookings.state.clone()}
                        on_mutate={bookings.actions.mutate.clone()}
                    />
                },
                "slots" => html! { <SlotAdmin domain={props.domain} notice={props.notice.clone()} /> },
                _ => html! {
                    <BookingList
                        domain={props.domain}
                        state={bookings.state.clone()}
                        on_mutate={bookings.actions.mutate.clone()}
                        staff=true
                    />
                },
            }}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct DayBookingsProps {
    domain: BookingDomain,
    state: BookingsState,
    on_mutate: Callback<(BookingId, Mutation)>,
}

/// Calendar plus the bookings of the picked day, taken from the same list
/// as the main tab so a status change shows in both
#[function_component(DayBookings)]
fn day_bookings(props: &DayBookingsProps) -> Html {
    let calendar = use_slot_calendar(props.domain);
    let selected = use_state(|| Option::<NaiveDate>::None);

    let on_select = {
        let selected = selected.clone();
        Callback::from(move |day: NaiveDate| selected.set(Some(day)))
    };

    let day_bookings: Vec<Booking> = selected
        .map(|day| {
            let mut on_day: Vec<Booking> = props
                .state
                .bookings
                .iter()
                .filter(|booking| booking.occupies(day))
                .cloned()
                .collect();
            on_day.sort_by_key(|booking| (booking.scheduled_at(), booking.id));
            on_day
        })
        .unwrap_or_default();

    html! {
        <div class="day-bookings">
            <SlotCalendar
                calendar={calendar.state.calendar.clone()}
                selected={*selected}
                {on_select}
                on_prev={calendar.actions.prev_month.clone()}
                on_next={calendar.actions.next_month.clone()}
                loading={calendar.state.loading}
                allow_all_days=true
            />
            {match *selected {
                Some(day) => html! {
                    <>
                        <h3>{format_long_date(day)}</h3>
                        {if day_bookings.is_empty() {
                            html! { <p class="empty-state">{"No bookings on this day"}</p> }
                        } else {
                            html! {
                                <BookingTable
                                    domain={props.domain}
                                    bookings={day_bookings}
                                    pending={props.state.pending.clone()}
                                    on_mutate={props.on_mutate.clone()}
                                    staff=true
                                />
                            }
                        }}
                    </>
                },
                None => html! { <p class="hint">{"Pick a day to see its bookings"}</p> },
            }}
        </div>
    }
}
