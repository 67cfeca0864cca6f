use gloo::timers::callback::Timeout;
use shared::messages::session_expired;
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod services;

use components::admin_dashboard::AdminDashboard;
use components::auth_forms::AuthScreen;
use components::guardian_dashboard::GuardianDashboard;
use components::header::Header;
use config::AppConfig;
use hooks::use_session::{use_session, SessionProvider};
use services::logging::Logger;

const APP_TITLE: &str = "Daycare Portal";

/// Picks the screen for the current session state
#[function_component(Shell)]
fn shell() -> Html {
    let session = use_session();

    // Show the expiry message for a moment, then fall back to the login screen
    {
        let session = session.clone();
        use_effect_with(session.expired, move |expired| {
            let timer = expired.then(|| {
                let delay = session.config.expired_redirect_ms;
                Timeout::new(delay, move || session.acknowledge_expiry())
            });
            move || drop(timer)
        });
    }

    let body = if session.expired {
        html! {
            <div class="session-expired" role="alert">
                <p>{session_expired(session.locale)}</p>
            </div>
        }
    } else if session.is_restoring() {
        html! { <div class="loading">{"Loading..."}</div> }
    } else if !session.is_authenticated() {
        html! { <AuthScreen /> }
    } else if session.is_admin() {
        html! { <AdminDashboard /> }
    } else {
        html! { <GuardianDashboard /> }
    };

    html! {
        <div class="app">
            <Header title={APP_TITLE} />
            <div class="container">
                {body}
            </div>
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    let config = use_memo((), |_| {
        let config = AppConfig::from_build_env();
        Logger::init(config.log_level);
        log::info!(target: "app", "Starting against {}", config.api_url);
        config
    });

    html! {
        <SessionProvider {config}>
            <Shell />
        </SessionProvider>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
