use chrono::NaiveDate;
use shared::availability::slots_for_day;
use shared::{
    format_long_date, format_time, parse_time, BookingDomain, Slot, SlotId, SlotRequest, SlotStatus,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, MouseEvent};
use yew::prelude::*;

use super::calendar::SlotCalendar;
use crate::hooks::use_notice::{Notice, NoticeHandle};
use crate::hooks::use_session::use_session;
use crate::hooks::use_slot_calendar::use_slot_calendar;

#[derive(Properties, PartialEq)]
pub struct SlotAdminProps {
    pub domain: BookingDomain,
    pub notice: NoticeHandle,
}

#[derive(Clone, PartialEq)]
struct SlotFields {
    editing: Option<SlotId>,
    start: String,
    end: String,
    capacity: String,
    status: SlotStatus,
}

impl Default for SlotFields {
    fn default() -> Self {
        Self {
            editing: None,
            start: "09:00".into(),
            end: "10:00".into(),
            capacity: "10".into(),
            status: SlotStatus::Open,
        }
    }
}

impl SlotFields {
    fn from_slot(slot: &Slot) -> Self {
        Self {
            editing: Some(slot.id),
            start: format_time(slot.start_time),
            end: format_time(slot.end_time),
            capacity: slot.capacity.to_string(),
            status: slot.status,
        }
    }

    fn to_request(&self, date: NaiveDate) -> Result<SlotRequest, Vec<String>> {
        let (Some(start_time), Some(end_time)) = (parse_time(&self.start), parse_time(&self.end))
        else {
            return Err(vec!["Please enter start and end times as HH:MM".to_string()]);
        };
        let Ok(capacity) = self.capacity.trim().parse::<u32>() else {
            return Err(vec!["Capacity must be a whole number".to_string()]);
        };
        let request = SlotRequest {
            date,
            start_time,
            end_time,
            capacity,
            status: self.status,
        };
        let errors = request.validate();
        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors.iter().map(ToString::to_string).collect())
        }
    }
}

/// Staff calendar for opening, editing and removing slots
#[function_component(SlotAdmin)]
pub fn slot_admin(props: &SlotAdminProps) -> Html {
    let session = use_session();
    let calendar = use_slot_calendar(props.domain);
    let selected = use_state(|| Option::<NaiveDate>::None);
    let fields = use_state(SlotFields::default);
    let saving = use_state(|| false);
    let errors = use_state(Vec::<String>::new);

    let day_slots = selected
        .map(|day| slots_for_day(&calendar.state.slots, day))
        .unwrap_or_default();

    let on_select = {
        let selected = selected.clone();
        let fields = fields.clone();
        let errors = errors.clone();
        Callback::from(move |day: NaiveDate| {
            selected.set(Some(day));
            fields.set(SlotFields::default());
            errors.set(Vec::new());
        })
    };

    let text_setter = |apply: fn(&mut SlotFields, String)| {
        let fields = fields.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*fields).clone();
            apply(&mut next, input.value());
            fields.set(next);
        })
    };

    let on_status_change = {
        let fields = fields.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let mut next = (*fields).clone();
            next.status = if select.value() == "CLOSED" {
                SlotStatus::Closed
            } else {
                SlotStatus::Open
            };
            fields.set(next);
        })
    };

    let on_submit = {
        let fields = fields.clone();
        let saving = saving.clone();
        let errors = errors.clone();
        let selected = *selected;
        let domain = props.domain;
        let api_client = session.api();
        let refresh_calendar = calendar.actions.refresh_calendar.clone();
        let show = props.notice.show.clone();
        let api_error = props.notice.api_error.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(day) = selected else {
                return;
            };
            if *saving {
                return;
            }
            let request = match fields.to_request(day) {
                Ok(request) => request,
                Err(problems) => {
                    errors.set(problems);
                    return;
                }
            };
            errors.set(Vec::new());
            saving.set(true);

            let editing = fields.editing;
            let fields = fields.clone();
            let saving = saving.clone();
            let api_client = api_client.clone();
            let refresh_calendar = refresh_calendar.clone();
            let show = show.clone();
            let api_error = api_error.clone();
            spawn_local(async move {
                let result = match editing {
                    Some(id) => api_client.update_slot(domain, id, &request).await,
                    None => api_client.create_slot(domain, &request).await,
                };
                match result {
                    Ok(slot) => {
                        log::info!(target: "slots", "Saved {} slot #{}", domain, slot.id);
                        let text = format!("Slot {} saved", slot.time_range_label());
                        show.emit(Notice::success(text));
                        fields.set(SlotFields::default());
                        refresh_calendar.emit(());
                    }
                    Err(e) => api_error.emit(e),
                }
                saving.set(false);
            });
        })
    };

    let on_delete = {
        let saving = saving.clone();
        let domain = props.domain;
        let api_client = session.api();
        let refresh_calendar = calendar.actions.refresh_calendar.clone();
        let show = props.notice.show.clone();
        let api_error = props.notice.api_error.clone();

        Callback::from(move |id: SlotId| {
            if *saving {
                return;
            }
            saving.set(true);
            let saving = saving.clone();
            let api_client = api_client.clone();
            let refresh_calendar = refresh_calendar.clone();
            let show = show.clone();
            let api_error = api_error.clone();
            spawn_local(async move {
                match api_client.delete_slot(domain, id).await {
                    Ok(()) => {
                        show.emit(Notice::success("Slot deleted"));
                        refresh_calendar.emit(());
                    }
                    Err(e) => api_error.emit(e),
                }
                saving.set(false);
            });
        })
    };

    let busy = *saving;

    html! {
        <section class="slot-admin">
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
                None => html! { <p class="hint">{"Pick a day to manage its slots"}</p> },
                Some(day) => html! {
                    <div class="slot-day">
                        <h3>{format_long_date(day)}</h3>
                        {if day_slots.is_empty() {
                            html! { <p class="empty-state">{"No slots on this day"}</p> }
                        } else {
                            html! {
                                <table class="slots-table">
                                    <thead>
                                        <tr>
                                            <th>{"Time"}</th>
                                            <th>{"Places"}</th>
                                            <th>{"Status"}</th>
                                            <th></th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {for day_slots.iter().map(|slot| {
                                            let on_edit = {
                                                let fields = fields.clone();
                                                let slot = slot.clone();
                                                Callback::from(move |_: MouseEvent| {
                                                    fields.set(SlotFields::from_slot(&slot))
                                                })
                                            };
                                            let on_remove = {
                                                let on_delete = on_delete.clone();
                                                let id = slot.id;
                                                Callback::from(move |_: MouseEvent| on_delete.emit(id))
                                            };
                                            let places = format!("{}/{}", slot.free_spots(), slot.capacity);
                                            let status = if slot.is_open() { "Open" } else { "Closed" };
                                            html! {
                                                <tr key={slot.id}>
                                                    <td>{slot.time_range_label()}</td>
                                                    <td>{places}</td>
                                                    <td>{status}</td>
                                                    <td>
                                                        <button
                                                            type="button"
                                                            class="btn btn-small"
                                                            onclick={on_edit}
                                                            disabled={busy}
                                                        >
                                                            {"Edit"}
                                                        </button>
                                                        <button
                                                            type="button"
                                                            class="btn btn-small btn-danger"
                                                            onclick={on_remove}
                                                            disabled={busy}
                                                        >
                                                            {"Delete"}
                                                        </button>
                                                    </td>
                                                </tr>
                                            }
                                        })}
                                    </tbody>
                                </table>
                            }
                        }}

                        <form class="slot-form" onsubmit={on_submit}>
                            <h4>{if fields.editing.is_some() { "Edit slot" } else { "New slot" }}</h4>
                            {for errors.iter().map(|error| html! {
                                <div class="form-message error">{error}</div>
                            })}
                            <div class="form-row">
                                <input
                                    type="time"
                                    value={fields.start.clone()}
                                    onchange={text_setter(|f, v| f.start = v)}
                                    disabled={busy}
                                />
                                <input
                                    type="time"
                                    value={fields.end.clone()}
                                    onchange={text_setter(|f, v| f.end = v)}
                                    disabled={busy}
                                />
                                <input
                                    type="number"
                                    min="1"
                                    value={fields.capacity.clone()}
                                    onchange={text_setter(|f, v| f.capacity = v)}
                                    disabled={busy}
                                />
                                <select onchange={on_status_change} disabled={busy}>
                                    <option value="OPEN" selected={fields.status == SlotStatus::Open}>
                                        {"Open"}
                                    </option>
                                    <option value="CLOSED" selected={fields.status == SlotStatus::Closed}>
                                        {"Closed"}
                                    </option>
                                </select>
                            </div>
                            <button type="submit" class="btn btn-primary" disabled={busy}>
                                {if busy { "Saving..." } else { "Save slot" }}
                            </button>
                        </form>
                    </div>
                },
            }}
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_slot_fields_build_request() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let request = SlotFields::default().to_request(date).unwrap();
        assert_eq!(format_time(request.start_time), "09:00");
        assert_eq!(request.capacity, 10);

        let mut fields = SlotFields::default();
        fields.end = "08:00".into();
        assert_eq!(
            fields.to_request(date).unwrap_err(),
            vec!["The slot must end after it starts".to_string()]
        );

        fields.capacity = "many".into();
        assert_eq!(
            fields.to_request(date).unwrap_err(),
            vec!["Capacity must be a whole number".to_string()]
        );
    }
}
