use shared::sequence::RequestSequence;
use shared::TutorPage;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_debounce::use_debounce;
use crate::hooks::use_notice::NoticeHandle;
use crate::hooks::use_session::use_session;

#[derive(Clone, PartialEq)]
pub struct TutorsState {
    pub page: u32,
    pub search: String,
    pub result: Option<TutorPage>,
    pub loading: bool,
}

pub struct UseTutorsResult {
    pub state: TutorsState,
    pub actions: UseTutorsActions,
}

#[derive(Clone, PartialEq)]
pub struct UseTutorsActions {
    pub set_search: Callback<String>,
    pub set_page: Callback<u32>,
}

/// Paginated guardian listing; the search box is debounced before querying
#[hook]
pub fn use_tutors(notice: &NoticeHandle) -> UseTutorsResult {
    let session = use_session();
    let page = use_state(|| 1u32);
    let search = use_state(String::new);
    let result = use_state(|| Option::<TutorPage>::None);
    let loading = use_state(|| false);
    let sequence = use_mut_ref(RequestSequence::new);

    let debounced_search = use_debounce((*search).clone(), session.config.search_debounce_ms);
    let limit = session.config.admin_page_size;

    {
        let result = result.clone();
        let loading = loading.clone();
        let sequence = sequence.clone();
        let api_error = notice.api_error.clone();
        use_effect_with(
            (*page, debounced_search, session.api()),
            move |(page, search, api_client)| {
                let ticket = sequence.borrow_mut().issue();
                let page = *page;
                let search = search.clone();
                let api_client = api_client.clone();
                loading.set(true);

                spawn_local(async move {
                    let fetched = api_client.get_tutors(page, limit, &search).await;
                    if !sequence.borrow().is_current(ticket) {
                        return;
                    }
                    match fetched {
                        Ok(data) => result.set(Some(data)),
                        Err(e) => {
                            log::error!(target: "tutors", "Failed to fetch tutors: {}", e);
                            api_error.emit(e);
                        }
                    }
                    loading.set(false);
                });
                || ()
            },
        );
    }

    let set_search = {
        let search = search.clone();
        let page = page.clone();
        use_callback((), move |value: String, _| {
            search.set(value);
            page.set(1);
        })
    };

    let set_page = {
        let page = page.clone();
        use_callback((), move |value: u32, _| page.set(value.max(1)))
    };

    let state = TutorsState {
        page: *page,
        search: (*search).clone(),
        result: (*result).clone(),
        loading: *loading,
    };

    UseTutorsResult {
        state,
        actions: UseTutorsActions { set_search, set_page },
    }
}
