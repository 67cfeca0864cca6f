use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use shared::messages::Locale;
use shared::session::{Session, SessionEffect, SessionEvent, SessionMachine, SessionState};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::config::AppConfig;
use crate::services::api::ApiClient;
use crate::services::date_utils::now_utc;
use crate::services::storage;

const TARGET: &str = "session";

/// Snapshot of the session handed out through context
#[derive(Clone, PartialEq)]
pub struct SessionHandle {
    pub config: Rc<AppConfig>,
    pub state: SessionState,
    /// Set when the backend answered 401 until the shell acknowledges it
    pub expired: bool,
    pub locale: Locale,
    dispatch: Callback<SessionEvent>,
    on_unauthorized: Callback<()>,
    acknowledge_expiry: Callback<()>,
    set_locale: Callback<Locale>,
}

impl SessionHandle {
    pub fn token(&self) -> Option<String> {
        self.state.session().map(|session| session.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.session().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.state.session().is_some_and(Session::is_admin)
    }

    /// True while the startup refresh has not answered yet
    pub fn is_restoring(&self) -> bool {
        matches!(self.state, SessionState::Refreshing { current: None })
    }

    /// Client carrying the current token; a 401 marks the session expired
    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.config.api_url.clone())
            .with_token(self.token())
            .with_unauthorized_handler(self.on_unauthorized.clone())
    }

    pub fn logged_in(&self, token: String) {
        self.dispatch.emit(SessionEvent::LoggedIn(token));
    }

    pub fn logout(&self) {
        let api = self.api();
        let dispatch = self.dispatch.clone();
        spawn_local(async move {
            if let Err(e) = api.logout().await {
                log::warn!(target: TARGET, "Logout request failed: {}", e);
            }
            dispatch.emit(SessionEvent::LoggedOut);
        });
    }

    pub fn acknowledge_expiry(&self) {
        self.acknowledge_expiry.emit(());
    }

    pub fn set_locale(&self, locale: Locale) {
        self.set_locale.emit(locale);
    }
}

/// Owns the state machine, the single refresh timer and the storage writes
#[derive(Clone)]
struct Coordinator {
    machine: Rc<RefCell<SessionMachine>>,
    timer: Rc<RefCell<Option<Timeout>>>,
    snapshot: UseStateHandle<SessionState>,
    expired: UseStateHandle<bool>,
    api: ApiClient,
}

impl Coordinator {
    fn dispatch(&self, event: SessionEvent) {
        if event == SessionEvent::Expired && self.machine.borrow().session().is_some() {
            log::info!(target: TARGET, "Backend rejected the token, session expired");
            self.expired.set(true);
        }

        let effects = self.machine.borrow_mut().handle(event, now_utc());
        for effect in effects {
            self.run(effect);
        }
        self.snapshot.set(self.machine.borrow().state().clone());
    }

    fn run(&self, effect: SessionEffect) {
        match effect {
            SessionEffect::Persist(token) => storage::save_token(&token),
            SessionEffect::Clear => storage::clear_token(),
            SessionEffect::CancelTimer => {
                self.timer.borrow_mut().take();
            }
            SessionEffect::Schedule(delay) => {
                let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
                log::debug!(target: TARGET, "Next token refresh in {} s", millis / 1000);
                let coordinator = self.clone();
                // Replacing the handle drops and cancels the previous timer
                *self.timer.borrow_mut() = Some(Timeout::new(millis, move || {
                    coordinator.dispatch(SessionEvent::RefreshStarted);
                }));
            }
            SessionEffect::RefreshNow => {
                let coordinator = self.clone();
                spawn_local(async move {
                    let event = match coordinator.api.refresh().await {
                        Ok(response) => SessionEvent::Refreshed(response.access_token),
                        Err(e) => {
                            log::warn!(target: TARGET, "Token refresh failed: {}", e);
                            SessionEvent::RefreshFailed
                        }
                    };
                    coordinator.dispatch(event);
                });
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub config: Rc<AppConfig>,
    pub children: Html,
}

#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let machine = use_mut_ref(|| SessionMachine::new(props.config.refresh));
    let timer = use_mut_ref(|| None::<Timeout>);
    let snapshot = use_state(|| SessionState::Unauthenticated);
    let expired = use_state(|| false);
    let locale = use_state(storage::load_locale);

    let coordinator = Coordinator {
        machine,
        timer: timer.clone(),
        snapshot: snapshot.clone(),
        expired: expired.clone(),
        api: ApiClient::new(props.config.api_url.clone()),
    };

    // Load the stored token and try a silent refresh once
    use_effect_with((), {
        let coordinator = coordinator.clone();
        move |_| {
            coordinator.dispatch(SessionEvent::Restored(storage::load_token()));
            move || {
                timer.borrow_mut().take();
            }
        }
    });

    // The coordinator only holds shared cells, so the first one stays valid
    let dispatch = use_callback((), move |event: SessionEvent, _| coordinator.dispatch(event));

    let on_unauthorized = use_callback(dispatch.clone(), |_: (), dispatch| {
        dispatch.emit(SessionEvent::Expired)
    });

    let acknowledge_expiry = {
        let expired = expired.clone();
        use_callback((), move |_: (), _| expired.set(false))
    };

    let set_locale = {
        let locale = locale.clone();
        use_callback((), move |next: Locale, _| {
            storage::save_locale(next);
            locale.set(next);
        })
    };

    let handle = SessionHandle {
        config: props.config.clone(),
        state: (*snapshot).clone(),
        expired: *expired,
        locale: *locale,
        dispatch,
        on_unauthorized,
        acknowledge_expiry,
        set_locale,
    };

    html! {
        <ContextProvider<SessionHandle> context={handle}>
            {props.children.clone()}
        </ContextProvider<SessionHandle>>
    }
}

#[hook]
pub fn use_session() -> SessionHandle {
    match use_context::<SessionHandle>() {
        Some(handle) => handle,
        None => {
            log::error!(target: TARGET, "use_session called outside SessionProvider");
            SessionHandle {
                config: Rc::new(AppConfig::default()),
                state: SessionState::Unauthenticated,
                expired: false,
                locale: Locale::default(),
                dispatch: Callback::noop(),
                on_unauthorized: Callback::noop(),
                acknowledge_expiry: Callback::noop(),
                set_locale: Callback::noop(),
            }
        }
    }
}
