use std::collections::BTreeSet;

use shared::{format_date, Child, UserId};
use web_sys::{HtmlInputElement, MouseEvent};
use yew::prelude::*;

use super::child_notes::ChildNotes;
use crate::hooks::use_notice::NoticeHandle;
use crate::hooks::use_tutors::use_tutors;

#[derive(Properties, PartialEq)]
pub struct TutorTableProps {
    pub notice: NoticeHandle,
}

/// Staff listing of guardians and their children
#[function_component(TutorTable)]
pub fn tutor_table(props: &TutorTableProps) -> Html {
    let tutors = use_tutors(&props.notice);
    let expanded = use_state(BTreeSet::<UserId>::new);
    let state = &tutors.state;

    let on_search = {
        let set_search = tutors.actions.set_search.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set_search.emit(input.value());
        })
    };

    let go_to = |page: u32| {
        let set_page = tutors.actions.set_page.clone();
        Callback::from(move |_: MouseEvent| set_page.emit(page))
    };

    let toggle = |id: UserId| {
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*expanded).clone();
            if !next.remove(&id) {
                next.insert(id);
            }
            expanded.set(next);
        })
    };

    let render_child = |child: &Child| {
        html! {
            <div class="child-card" key={child.id}>
                <strong>{child.full_name()}</strong>
                <span class="muted">{format!(" born {}", format_date(child.date_of_birth))}</span>
                {child.allergies.as_ref().map(|allergies| html! {
                    <div class="allergies">{format!("Allergies: {}", allergies)}</div>
                }).unwrap_or_default()}
                <ChildNotes child={child.clone()} staff=true notice={props.notice.clone()} />
            </div>
        }
    };

    html! {
        <section class="tutor-table">
            <input
                type="search"
                class="search-input"
                placeholder="Search guardians by name or email"
                value={state.search.clone()}
                oninput={on_search}
            />

            {match &state.result {
                None if state.loading => html! { <div class="loading">{"Loading guardians..."}</div> },
                None => html! { <p class="empty-state">{"No guardians found"}</p> },
                Some(page) if page.tutors.is_empty() => {
                    html! { <p class="empty-state">{"No guardians found"}</p> }
                }
                Some(page) => html! {
                    <>
                        <table class={classes!("tutors", state.loading.then_some("loading"))}>
                            <thead>
                                <tr>
                                    <th>{"Name"}</th>
                                    <th>{"Email"}</th>
                                    <th>{"Phone"}</th>
                                    <th>{"Children"}</th>
                                </tr>
                            </thead>
                            <tbody>
                                {for page.tutors.iter().map(|tutor| {
                                    let is_open = expanded.contains(&tutor.id);
                                    let marker = if is_open { "▾" } else { "▸" };
                                    html! {
                                        <>
                                            <tr>
                                                <td>{format!("{} {}", tutor.name, tutor.surname)}</td>
                                                <td>{&tutor.email}</td>
                                                <td>{tutor.phone.clone().unwrap_or_default()}</td>
                                                <td>
                                                    <button type="button" class="btn btn-small" onclick={toggle(tutor.id)}>
                                                        {format!("{} {}", marker, tutor.children.len())}
                                                    </button>
                                                </td>
                                            </tr>
                                            {if is_open {
                                                html! {
                                                    <tr class="tutor-children">
                                                        <td colspan="4">
                                                            {for tutor.children.iter().map(render_child)}
                                                        </td>
                                                    </tr>
                                                }
                                            } else {
                                                html! {}
                                            }}
                                        </>
                                    }
                                })}
                            </tbody>
                        </table>
                        <div class="pager">
                            <button
                                type="button"
                                class="btn btn-small"
                                disabled={!page.has_previous() || state.loading}
                                onclick={go_to(state.page.saturating_sub(1))}
                            >
                                {"Previous"}
                            </button>
                            <span>
                                {format!(
                                    "Page {} of {} ({} guardians)",
                                    state.page,
                                    page.total_pages(),
                                    page.total
                                )}
                            </span>
                            <button
                                type="button"
                                class="btn btn-small"
                                disabled={!page.has_next() || state.loading}
                                onclick={go_to(state.page + 1)}
                            >
                                {"Next"}
                            </button>
                        </div>
                    </>
                },
            }}
        </section>
    }
}
