use shared::{format_date, Booking, BookingDomain, Child, ChildId};
use web_sys::MouseEvent;
use yew::prelude::*;

use super::booking_form::BookingForm;
use super::booking_list::BookingList;
use super::child_form_modal::ChildFormModal;
use super::child_notes::ChildNotes;
use super::notice::NoticeBanner;
use crate::hooks::use_bookings::use_bookings;
use crate::hooks::use_children::{use_children, ChildrenState, UseChildrenActions};
use crate::hooks::use_notice::{use_notice, Notice, NoticeHandle};
use crate::services::date_utils::today;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardianTab {
    Book,
    Bookings,
    Children,
}

impl GuardianTab {
    const ALL: [GuardianTab; 3] = [GuardianTab::Book, GuardianTab::Bookings, GuardianTab::Children];

    fn label(&self) -> &'static str {
        match self {
            GuardianTab::Book => "Book",
            GuardianTab::Bookings => "My bookings",
            GuardianTab::Children => "Children",
        }
    }
}

fn domain_key(domain: BookingDomain) -> String {
    domain.to_string()
}

#[derive(Properties, PartialEq)]
struct DomainPickerProps {
    selected: BookingDomain,
    on_pick: Callback<BookingDomain>,
}

#[function_component(DomainPicker)]
fn domain_picker(props: &DomainPickerProps) -> Html {
    html! {
        <div class="domain-picker">
            {for BookingDomain::ALL.iter().map(|domain| {
                let domain = *domain;
                let on_pick = props.on_pick.clone();
                html! {
                    <button
                        type="button"
                        class={classes!("sub-tab", (domain == props.selected).then_some("active"))}
                        onclick={Callback::from(move |_: MouseEvent| on_pick.emit(domain))}
                    >
                        {domain.label()}
                    </button>
                }
            })}
        </div>
    }
}

#[function_component(GuardianDashboard)]
pub fn guardian_dashboard() -> Html {
    let notice = use_notice();
    let children = use_children(&notice);
    let tab = use_state(|| GuardianTab::Book);
    let domain = use_state(|| BookingDomain::Daycare);

    let on_pick = {
        let domain = domain.clone();
        Callback::from(move |next: BookingDomain| domain.set(next))
    };

    let on_booked = {
        let tab = tab.clone();
        Callback::from(move |_: Booking| tab.set(GuardianTab::Bookings))
    };

    html! {
        <main class="dashboard guardian-dashboard">
            <NoticeBanner notice={notice.clone()} />
            <nav class="tabs">
                {for GuardianTab::ALL.iter().map(|item| {
                    let item = *item;
                    let onclick = {
                        let tab = tab.clone();
                        Callback::from(move |_: MouseEvent| tab.set(item))
                    };
                    html! {
                        <button
                            type="button"
                            class={classes!("tab", (*tab == item).then_some("active"))}
                            {onclick}
                        >
                            {item.label()}
                        </button>
                    }
                })}
            </nav>

            {match *tab {
                GuardianTab::Book => html! {
                    <>
                        <DomainPicker selected={*domain} on_pick={on_pick.clone()} />
                        <BookingForm
                            key={domain_key(*domain)}
                            domain={*domain}
                            children={children.state.children.clone()}
                            notice={notice.clone()}
                            on_saved={on_booked}
                        />
                    </>
                },
                GuardianTab::Bookings => html! {
                    <>
                        <DomainPicker selected={*domain} on_pick={on_pick.clone()} />
                        <MyBookings
                            key={domain_key(*domain)}
                            domain={*domain}
                            children={children.state.children.clone()}
                            notice={notice.clone()}
                        />
                    </>
                },
                GuardianTab::Children => html! {
                    <ChildrenPanel
                        state={children.state.clone()}
                        actions={children.actions.clone()}
                        notice={notice.clone()}
                    />
                },
            }}
        </main>
    }
}

#[derive(Properties, PartialEq)]
struct MyBookingsProps {
    domain: BookingDomain,
    children: Vec<Child>,
    notice: NoticeHandle,
}

/// The guardian's bookings of one domain, with cancel and edit
#[function_component(MyBookings)]
fn my_bookings(props: &MyBookingsProps) -> Html {
    let bookings = use_bookings(props.domain, &props.notice);
    let editing = use_state(|| Option::<Booking>::None);

    let on_edit = {
        let editing = editing.clone();
        Callback::from(move |booking: Booking| editing.set(Some(booking)))
    };

    let on_saved = {
        let editing = editing.clone();
        let upsert = bookings.actions.upsert.clone();
        Callback::from(move |booking: Booking| {
            upsert.emit(booking);
            editing.set(None);
        })
    };

    let on_cancel = {
        let editing = editing.clone();
        Callback::from(move |_: ()| editing.set(None))
    };

    match &*editing {
        Some(booking) => html! {
            <BookingForm
                domain={props.domain}
                editing={booking.clone()}
                children={props.children.clone()}
                notice={props.notice.clone()}
                {on_saved}
                {on_cancel}
            />
        },
        None => html! {
            <BookingList
                domain={props.domain}
                state={bookings.state.clone()}
                on_mutate={bookings.actions.mutate.clone()}
                {on_edit}
            />
        },
    }
}

#[derive(Properties, PartialEq)]
struct ChildrenPanelProps {
    state: ChildrenState,
    actions: UseChildrenActions,
    notice: NoticeHandle,
}

#[function_component(ChildrenPanel)]
fn children_panel(props: &ChildrenPanelProps) -> Html {
    let modal_open = use_state(|| false);
    let editing = use_state(|| Option::<Child>::None);
    let notes_for = use_state(|| Option::<ChildId>::None);
    let today = today();

    let open_modal = |child: Option<Child>| {
        let modal_open = modal_open.clone();
        let editing = editing.clone();
        Callback::from(move |_: MouseEvent| {
            editing.set(child.clone());
            modal_open.set(true);
        })
    };

    let on_close = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: ()| modal_open.set(false))
    };

    let on_saved = {
        let modal_open = modal_open.clone();
        let refresh_children = props.actions.refresh_children.clone();
        let show = props.notice.show.clone();
        Callback::from(move |child: Child| {
            modal_open.set(false);
            show.emit(Notice::success(format!("{} saved", child.full_name())));
            refresh_children.emit(());
        })
    };

    html! {
        <section class="children-panel">
            <div class="section-header">
                <h2>{"Children"}</h2>
                <button type="button" class="btn btn-primary" onclick={open_modal(None)}>
                    {"Add child"}
                </button>
            </div>

            {if props.state.loading && props.state.children.is_empty() {
                html! { <div class="loading">{"Loading children..."}</div> }
            } else if props.state.children.is_empty() {
                html! { <p class="empty-state">{"No children registered yet"}</p> }
            } else {
                html! {
                    <ul class="child-list">
                        {for props.state.children.iter().map(|child| {
                            let id = child.id;
                            let deleting = props.state.deleting == Some(id);
                            let on_delete = {
                                let delete_child = props.actions.delete_child.clone();
                                Callback::from(move |_: MouseEvent| delete_child.emit(id))
                            };
                            let on_notes = {
                                let notes_for = notes_for.clone();
                                Callback::from(move |_: MouseEvent| {
                                    let next = if *notes_for == Some(id) { None } else { Some(id) };
                                    notes_for.set(next);
                                })
                            };
                            let summary = format!(
                                " {} years, born {}",
                                child.age_on(today),
                                format_date(child.date_of_birth)
                            );
                            html! {
                                <li class="child-card" key={id}>
                                    <div class="child-summary">
                                        <strong>{child.full_name()}</strong>
                                        <span class="muted">{summary}</span>
                                    </div>
                                    <div class="child-actions">
                                        <button type="button" class="btn btn-small" onclick={on_notes}>{"Notes"}</button>
                                        <button
                                            type="button"
                                            class="btn btn-small"
                                            onclick={open_modal(Some(child.clone()))}
                                            disabled={deleting}
                                        >
                                            {"Edit"}
                                        </button>
                                        <button
                                            type="button"
                                            class="btn btn-small btn-danger"
                                            onclick={on_delete}
                                            disabled={props.state.deleting.is_some()}
                                        >
                                            {if deleting { "Removing..." } else { "Remove" }}
                                        </button>
                                    </div>
                                    {if *notes_for == Some(id) {
                                        html! { <ChildNotes child={child.clone()} notice={props.notice.clone()} /> }
                                    } else {
                                        html! {}
                                    }}
                                </li>
                            }
                        })}
                    </ul>
                }
            }}

            <ChildFormModal
                is_open={*modal_open}
                editing={(*editing).clone()}
                {on_saved}
                {on_close}
            />
        </section>
    }
}
