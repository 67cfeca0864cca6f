use shared::{Child, ChildId};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::hooks::use_notice::{Notice, NoticeHandle};
use crate::hooks::use_session::use_session;

#[derive(Clone, PartialEq)]
pub struct ChildrenState {
    pub children: Vec<Child>,
    pub loading: bool,
    /// Child whose deletion is in flight
    pub deleting: Option<ChildId>,
}

pub struct UseChildrenResult {
    pub state: ChildrenState,
    pub actions: UseChildrenActions,
}

#[derive(Clone, PartialEq)]
pub struct UseChildrenActions {
    pub refresh_children: Callback<()>,
    pub delete_child: Callback<ChildId>,
}

#[hook]
pub fn use_children(notice: &NoticeHandle) -> UseChildrenResult {
    let session = use_session();
    let children = use_state(Vec::<Child>::new);
    let loading = use_state(|| false);
    let deleting = use_state(|| Option::<ChildId>::None);

    let refresh_children = {
        let children = children.clone();
        let loading = loading.clone();
        let api_error = notice.api_error.clone();

        use_callback(session.api(), move |_, api_client| {
            let api_client = api_client.clone();
            let children = children.clone();
            let loading = loading.clone();
            let api_error = api_error.clone();

            spawn_local(async move {
                loading.set(true);
                match api_client.get_children().await {
                    Ok(data) => children.set(data),
                    Err(e) => {
                        log::error!(target: "children", "Failed to fetch children: {}", e);
                        api_error.emit(e);
                    }
                }
                loading.set(false);
            });
        })
    };

    let delete_child = {
        let deleting = deleting.clone();
        let refresh_children = refresh_children.clone();
        let show = notice.show.clone();
        let api_error = notice.api_error.clone();

        use_callback((session.api(), *deleting), move |id: ChildId, (api_client, in_flight)| {
            if in_flight.is_some() {
                return;
            }
            deleting.set(Some(id));

            let api_client = api_client.clone();
            let deleting = deleting.clone();
            let refresh_children = refresh_children.clone();
            let show = show.clone();
            let api_error = api_error.clone();

            spawn_local(async move {
                match api_client.delete_child(id).await {
                    Ok(()) => {
                        show.emit(Notice::success("Child removed"));
                        refresh_children.emit(());
                    }
                    Err(e) => api_error.emit(e),
                }
                deleting.set(None);
            });
        })
    };

    use_effect_with(refresh_children.clone(), |refresh_children| {
        refresh_children.emit(());
        || ()
    });

    let state = ChildrenState {
        children: (*children).clone(),
        loading: *loading,
        deleting: *deleting,
    };

    let actions = UseChildrenActions {
        refresh_children,
        delete_child,
    };

    UseChildrenResult { state, actions }
}
