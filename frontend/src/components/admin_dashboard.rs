use shared::BookingDomain;
use web_sys::MouseEvent;
use yew::prelude::*;

use super::domain_panel::DomainPanel;
use super::notice::NoticeBanner;
use super::tutor_table::TutorTable;
use crate::hooks::use_notice::use_notice;
use crate::hooks::use_persisted_tab::use_persisted_tab;
use crate::services::storage::DASHBOARD_TAB_KEY;

const TABS: &[&str] = &["birthday", "daycare", "visit", "tutors"];

fn tab_domain(tab: &str) -> Option<BookingDomain> {
    match tab {
        "birthday" => Some(BookingDomain::Birthday),
        "daycare" => Some(BookingDomain::Daycare),
        "visit" => Some(BookingDomain::Visit),
        _ => None,
    }
}

fn tab_label(tab: &str) -> &'static str {
    match tab_domain(tab) {
        Some(domain) => domain.label(),
        None => "Families",
    }
}

#[function_component(AdminDashboard)]
pub fn admin_dashboard() -> Html {
    let notice = use_notice();
    let (active, select_tab) = use_persisted_tab(DASHBOARD_TAB_KEY, TABS);

    html! {
        <main class="dashboard admin-dashboard">
            <NoticeBanner notice={notice.clone()} />
            <nav class="tabs">
                {for TABS.iter().map(|tab| {
                    let onclick = {
                        let select_tab = select_tab.clone();
                        Callback::from(move |_: MouseEvent| select_tab.emit(tab.to_string()))
                    };
                    html! {
                        <button
                            type="button"
                            class={classes!("tab", (active == *tab).then_some("active"))}
                            {onclick}
                        >
                            {tab_label(tab)}
                        </button>
                    }
                })}
            </nav>

            {match tab_domain(&active) {
                // Keyed so hooks restart when switching domains
                Some(domain) => html! {
                    <DomainPanel key={active.clone()} {domain} notice={notice.clone()} />
                },
                None => html! { <TutorTable notice={notice.clone()} /> },
            }}
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_every_tab_has_a_label() {
        assert_eq!(tab_domain("daycare"), Some(BookingDomain::Daycare));
        assert_eq!(tab_domain("tutors"), None);
        let labels: Vec<_> = TABS.iter().map(|tab| tab_label(tab)).collect();
        assert_eq!(labels, vec!["Birthdays", "Daycare", "Visits", "Families"]);
    }
}
