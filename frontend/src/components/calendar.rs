use chrono::{Datelike, NaiveDate};
use shared::availability::{CalendarDayType, CalendarMonth, DayStatus};
use web_sys::MouseEvent;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SlotCalendarProps {
    pub calendar: CalendarMonth,
    pub selected: Option<NaiveDate>,
    pub on_select: Callback<NaiveDate>,
    pub on_prev: Callback<MouseEvent>,
    pub on_next: Callback<MouseEvent>,
    #[prop_or_default]
    pub loading: bool,
    /// Staff may open any day, guardians only days with room left
    #[prop_or_default]
    pub allow_all_days: bool,
}

fn status_label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Available => "Available",
        DayStatus::Partial => "Some places left",
        DayStatus::Full => "Full",
        DayStatus::Empty => "No slots",
    }
}

#[function_component(SlotCalendar)]
pub fn slot_calendar(props: &SlotCalendarProps) -> Html {
    let calendar = &props.calendar;

    let cells = calendar.days.iter().map(|cell| {
        let Some(summary) = cell.summary.as_ref() else {
            let class = match cell.day_type {
                CalendarDayType::PaddingBefore => "calendar-day empty before",
                _ => "calendar-day empty after",
            };
            return html! { <div class={class}></div> };
        };

        let date = summary.date;
        let selectable = props.allow_all_days || summary.status.is_selectable();
        let selected = props.selected == Some(date);
        let class = classes!(
            "calendar-day",
            summary.status.css_class(),
            selected.then_some("selected"),
            (!selectable).then_some("disabled"),
        );
        let tooltip = format!(
            "{}: {} of {} slots open, {} of {} places free",
            status_label(summary.status),
            summary.available_slots,
            summary.total_slots,
            summary.available_capacity,
            summary.total_capacity
        );
        let onclick = {
            let on_select = props.on_select.clone();
            Callback::from(move |_: MouseEvent| {
                if selectable {
                    on_select.emit(date);
                }
            })
        };

        html! {
            <button type="button" {class} title={tooltip} {onclick} disabled={!selectable}>
                <div class="day-number">{date.day()}</div>
                {if summary.total_slots > 0 {
                    html! {
                        <div class="day-capacity">
                            {format!("{}/{}", summary.available_capacity, summary.total_capacity)}
                        </div>
                    }
                } else {
                    html! {}
                }}
            </button>
        }
    });

    html! {
        <div class={classes!("calendar", props.loading.then_some("loading"))}>
            <div class="calendar-header">
                <button type="button" class="calendar-nav" onclick={props.on_prev.clone()}>{"‹"}</button>
                <h3 class="calendar-title">{calendar.month.label()}</h3>
                <button type="button" class="calendar-nav" onclick={props.on_next.clone()}>{"›"}</button>
            </div>
            <div class="calendar-weekdays">
                <div class="weekday">{"Mon"}</div>
                <div class="weekday">{"Tue"}</div>
                <div class="weekday">{"Wed"}</div>
                <div class="weekday">{"Thu"}</div>
                <div class="weekday">{"Fri"}</div>
                <div class="weekday">{"Sat"}</div>
                <div class="weekday">{"Sun"}</div>
            </div>
            <div class="calendar-grid">
                {for cells}
            </div>
            <div class="calendar-legend">
                {for [DayStatus::Available, DayStatus::Partial, DayStatus::Full].into_iter().map(|status| html! {
                    <span class={classes!("legend-item", status.css_class())}>{status_label(status)}</span>
                })}
            </div>
        </div>
    }
}
