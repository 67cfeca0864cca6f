use std::collections::BTreeSet;

use chrono::NaiveDate;
use shared::grouping::{
    filter_bookings, group_by_month_and_week, StatusFilter, WeekGroup, WeekPager,
};
use shared::optimistic::{validate_transition, Mutation};
use shared::{format_date, Booking, BookingDomain, BookingId, BookingStatus};
use web_sys::{HtmlInputElement, HtmlSelectElement, MouseEvent};
use yew::prelude::*;

use crate::hooks::use_bookings::BookingsState;
use crate::hooks::use_debounce::use_debounce;
use crate::hooks::use_session::use_session;
use crate::services::date_utils::today;

#[derive(Properties, PartialEq)]
pub struct BookingListProps {
    pub domain: BookingDomain,
    pub state: BookingsState,
    pub on_mutate: Callback<(BookingId, Mutation)>,
    /// Staff see confirm/close/delete, guardians only cancel
    #[prop_or_default]
    pub staff: bool,
    #[prop_or_default]
    pub on_edit: Option<Callback<Booking>>,
}

/// Buttons offered for a booking, already filtered by the status machine
fn available_actions(
    domain: BookingDomain,
    booking: &Booking,
    staff: bool,
) -> Vec<(Mutation, &'static str)> {
    let candidates: &[(Mutation, &'static str)] = if staff {
        &[
            (Mutation::Confirm, "Confirm"),
            (Mutation::Close, "Close"),
            (Mutation::Cancel, "Cancel"),
            (Mutation::Delete, "Delete"),
        ]
    } else {
        &[(Mutation::Cancel, "Cancel")]
    };
    candidates
        .iter()
        .copied()
        .filter(|(mutation, _)| validate_transition(domain, booking.status, *mutation).is_ok())
        .collect()
}

fn status_class(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "status-badge pending",
        BookingStatus::Confirmed => "status-badge confirmed",
        BookingStatus::Cancelled => "status-badge cancelled",
        BookingStatus::Closed => "status-badge closed",
    }
}

#[derive(Properties, PartialEq)]
pub struct BookingTableProps {
    pub domain: BookingDomain,
    pub bookings: Vec<Booking>,
    /// Bookings with a change in flight
    #[prop_or_default]
    pub pending: Vec<BookingId>,
    pub on_mutate: Callback<(BookingId, Mutation)>,
    #[prop_or_default]
    pub staff: bool,
    #[prop_or_default]
    pub on_edit: Option<Callback<Booking>>,
}

#[function_component(BookingTable)]
pub fn booking_table(props: &BookingTableProps) -> Html {
    let render_booking = |booking: &Booking| {
        let in_flight = props.pending.contains(&booking.id);
        let slots = booking
            .slots
            .iter()
            .map(|slot| format!("{} {}", format_date(slot.date), slot.time_range_label()))
            .collect::<Vec<_>>()
            .join(", ");
        let children = booking
            .children
            .iter()
            .map(|child| child.full_name())
            .collect::<Vec<_>>()
            .join(", ");
        let actions = available_actions(props.domain, booking, props.staff);

        html! {
            <tr key={booking.id} class={classes!(in_flight.then_some("in-flight"))}>
                <td class="booking-id">{format!("#{}", booking.id)}</td>
                <td>{slots}</td>
                <td>
                    <div>{&booking.user.email}</div>
                    <div class="muted">{booking.user.phone.clone().unwrap_or_default()}</div>
                </td>
                <td>{children}</td>
                <td><span class={status_class(booking.status)}>{booking.status.label()}</span></td>
                <td class="booking-actions">
                    {for actions.into_iter().map(|(mutation, label)| {
                        let on_mutate = props.on_mutate.clone();
                        let id = booking.id;
                        let class = match mutation {
                            Mutation::Delete | Mutation::Cancel => "btn btn-small btn-danger",
                            _ => "btn btn-small",
                        };
                        let onclick = Callback::from(move |_: MouseEvent| {
                            on_mutate.emit((id, mutation))
                        });
                        html! {
                            <button
                                type="button"
                                {class}
                                disabled={in_flight}
                                {onclick}
                            >
                                {label}
                            </button>
                        }
                    })}
                    {match (&props.on_edit, booking.status) {
                        (Some(on_edit), BookingStatus::Pending) => {
                            let on_edit = on_edit.clone();
                            let booking = booking.clone();
                            let onclick = Callback::from(move |_: MouseEvent| {
                                on_edit.emit(booking.clone())
                            });
                            html! {
                                <button
                                    type="button"
                                    class="btn btn-small btn-secondary"
                                    disabled={in_flight}
                                    {onclick}
                                >
                                    {"Edit"}
                                </button>
                            }
                        }
                        _ => html! {},
                    }}
                </td>
            </tr>
        }
    };

    html! {
        <table class="bookings-table">
            <thead>
                <tr>
                    <th>{"#"}</th>
                    <th>{"Slots"}</th>
                    <th>{"Requester"}</th>
                    <th>{"Children"}</th>
                    <th>{"Status"}</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                {for props.bookings.iter().map(render_booking)}
            </tbody>
        </table>
    }
}

#[function_component(BookingList)]
pub fn booking_list(props: &BookingListProps) -> Html {
    let session = use_session();
    let filter = use_state(StatusFilter::default);
    let query = use_state(String::new);
    let pager = use_state(WeekPager::default);
    let expanded = use_state(BTreeSet::<NaiveDate>::new);
    let debounced_query = use_debounce((*query).clone(), session.config.search_debounce_ms);

    // A new filter starts every week from its first page
    {
        let pager = pager.clone();
        use_effect_with((*filter, debounced_query.clone()), move |_| {
            let mut next = (*pager).clone();
            next.reset();
            pager.set(next);
            || ()
        });
    }

    let on_filter_change = {
        let filter = filter.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            filter.set(StatusFilter::from_param(&select.value()));
        })
    };

    let on_query_input = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            query.set(input.value());
        })
    };

    let toggle_week = {
        let expanded = expanded.clone();
        Callback::from(move |week: NaiveDate| {
            let mut next = (*expanded).clone();
            if !next.remove(&week) {
                next.insert(week);
            }
            expanded.set(next);
        })
    };

    let turn_page = {
        let pager = pager.clone();
        Callback::from(move |(week, len, forward): (NaiveDate, usize, bool)| {
            let mut next = (*pager).clone();
            if forward {
                next.next(week, len);
            } else {
                next.prev(week, len);
            }
            pager.set(next);
        })
    };

    let matching = filter_bookings(&props.state.bookings, *filter, &debounced_query);
    let months = group_by_month_and_week(matching, today());

    let render_week = |week: &WeekGroup<&Booking>| {
        let start = week.start;
        let is_open = expanded.contains(&start);
        let len = week.bookings.len();
        let page = pager.page(start, len);
        let page_count = pager.page_count(len);
        let onclick = {
            let toggle_week = toggle_week.clone();
            Callback::from(move |_: MouseEvent| toggle_week.emit(start))
        };

        html! {
            <div class="week-group" key={start.to_string()}>
                <button type="button" class="week-header" {onclick}>
                    {format!(
                        "{} {} - {} ({})",
                        if is_open { "▾" } else { "▸" },
                        format_date(start),
                        format_date(week.end()),
                        len
                    )}
                </button>
                {if is_open {
                    let prev = {
                        let turn_page = turn_page.clone();
                        Callback::from(move |_: MouseEvent| turn_page.emit((start, len, false)))
                    };
                    let next = {
                        let turn_page = turn_page.clone();
                        Callback::from(move |_: MouseEvent| turn_page.emit((start, len, true)))
                    };
                    let visible: Vec<Booking> = pager
                        .visible(start, &week.bookings)
                        .iter()
                        .map(|booking| (*booking).clone())
                        .collect();
                    html! {
                        <>
                            <BookingTable
                                domain={props.domain}
                                bookings={visible}
                                pending={props.state.pending.clone()}
                                on_mutate={props.on_mutate.clone()}
                                staff={props.staff}
                                on_edit={props.on_edit.clone()}
                            />
                            {if page_count > 1 {
                                html! {
                                    <div class="pager">
                                        <button
                                            type="button"
                                            class="btn btn-small"
                                            onclick={prev}
                                            disabled={page == 0}
                                        >
                                            {"Previous"}
                                        </button>
                                        <span>{format!("Page {} of {}", page + 1, page_count)}</span>
                                        <button
                                            type="button"
                                            class="btn btn-small"
                                            onclick={next}
                                            disabled={page + 1 >= page_count}
                                        >
                                            {"Next"}
                                        </button>
                                    </div>
                                }
                            } else {
                                html! {}
                            }}
                        </>
                    }
                } else {
                    html! {}
                }}
            </div>
        }
    };

    html! {
        <section class="booking-list">
            <div class="booking-filters">
                <select onchange={on_filter_change}>
                    <option
                        value={StatusFilter::All.as_param()}
                        selected={*filter == StatusFilter::All}
                    >
                        {"All statuses"}
                    </option>
                    {for props.domain.statuses().iter().map(|status| {
                        let option = StatusFilter::Only(*status);
                        html! {
                            <option value={option.as_param()} selected={*filter == option}>
                                {status.label()}
                            </option>
                        }
                    })}
                </select>
                <input
                    type="search"
                    placeholder="Search by id, email, phone, date, time or status"
                    value={(*query).clone()}
                    oninput={on_query_input}
                />
            </div>

            {if props.state.loading && props.state.bookings.is_empty() {
                html! { <div class="loading">{"Loading bookings..."}</div> }
            } else {
                html! {
                    {for months.iter().map(|month| html! {
                        <div class="month-group" key={month.month.label()}>
                            <h3 class="month-title">
                                {month.month.label()}
                                <span class="muted">{format!(" ({})", month.booking_count())}</span>
                            </h3>
                            {if month.is_empty() {
                                html! { <p class="empty-state">{"No bookings this month"}</p> }
                            } else {
                                html! { {for month.weeks.iter().map(&render_week)} }
                            }}
                        </div>
                    })}
                }
            }}
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Requester, Slot, SlotStatus};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn booking(status: BookingStatus) -> Booking {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        Booking {
            id: 1,
            status,
            slots: vec![Slot {
                id: 1,
                date,
                start_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                capacity: 5,
                available_spots: 4,
                status: SlotStatus::Open,
            }],
            user: Requester {
                id: 1,
                name: "Laura".into(),
                email: "laura@example.com".into(),
                phone: None,
            },
            children: vec![],
            comments: None,
            created_at: "2024-05-20T09:30:00Z".parse().unwrap(),
        }
    }

    #[wasm_bindgen_test]
    fn test_staff_actions_follow_status_machine() {
        let labels = |domain, status| -> Vec<&'static str> {
            available_actions(domain, &booking(status), true)
                .into_iter()
                .map(|(_, label)| label)
                .collect()
        };
        assert_eq!(
            labels(BookingDomain::Visit, BookingStatus::Pending),
            vec!["Confirm", "Cancel", "Delete"]
        );
        assert_eq!(
            labels(BookingDomain::Visit, BookingStatus::Confirmed),
            vec!["Close", "Cancel", "Delete"]
        );
        assert_eq!(
            labels(BookingDomain::Birthday, BookingStatus::Confirmed),
            vec!["Cancel", "Delete"]
        );
        assert!(labels(BookingDomain::Daycare, BookingStatus::Closed).is_empty());
        assert_eq!(labels(BookingDomain::Daycare, BookingStatus::Cancelled), vec!["Delete"]);
    }

    #[wasm_bindgen_test]
    fn test_guardians_can_only_cancel() {
        let confirmed = booking(BookingStatus::Confirmed);
        let actions = available_actions(BookingDomain::Daycare, &confirmed, false);
        assert_eq!(actions, vec![(Mutation::Cancel, "Cancel")]);

        let cancelled = booking(BookingStatus::Cancelled);
        assert!(available_actions(BookingDomain::Daycare, &cancelled, false).is_empty());
    }
}
