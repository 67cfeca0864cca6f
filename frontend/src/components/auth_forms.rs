use shared::messages::user_facing;
use shared::{validate_email, ForgotPasswordRequest, LoginRequest, ResetPasswordForm};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, MouseEvent, UrlSearchParams};
use yew::prelude::*;

use crate::hooks::use_session::use_session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Login,
    ForgotPassword,
    ResetPassword,
}

/// `?token=...` from a password reset link
fn reset_token_from(search: &str) -> Option<String> {
    UrlSearchParams::new_with_str(search)
        .ok()?
        .get("token")
        .filter(|token| !token.trim().is_empty())
}

fn reset_token_from_location() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    reset_token_from(&search)
}

fn input_setter(handle: &UseStateHandle<String>) -> Callback<InputEvent> {
    let handle = handle.clone();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        handle.set(input.value());
    })
}

fn render_errors(errors: &[String]) -> Html {
    if errors.is_empty() {
        return html! {};
    }
    html! {
        <ul class="form-message error">
            {for errors.iter().map(|error| html! { <li>{error}</li> })}
        </ul>
    }
}

/// Entry screen: login, forgot password or reset password
#[function_component(AuthScreen)]
pub fn auth_screen() -> Html {
    let reset_token = use_memo((), |_| reset_token_from_location());
    let view = use_state(|| {
        if reset_token.is_some() {
            AuthView::ResetPassword
        } else {
            AuthView::Login
        }
    });

    let switch_to = |next: AuthView| {
        let view = view.clone();
        Callback::from(move |_: ()| view.set(next))
    };

    html! {
        <div class="auth-screen">
            {match *view {
                AuthView::Login => html! {
                    <LoginForm on_forgot={switch_to(AuthView::ForgotPassword)} />
                },
                AuthView::ForgotPassword => html! {
                    <ForgotPasswordForm on_back={switch_to(AuthView::Login)} />
                },
                AuthView::ResetPassword => html! {
                    <ResetPasswordFormView
                        token={(*reset_token).clone().unwrap_or_default()}
                        on_done={switch_to(AuthView::Login)}
                    />
                },
            }}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LoginFormProps {
    pub on_forgot: Callback<()>,
}

#[function_component(LoginForm)]
pub fn login_form(props: &LoginFormProps) -> Html {
    let session = use_session();
    let email = use_state(String::new);
    let password = use_state(String::new);
    let submitting = use_state(|| false);
    let errors = use_state(Vec::<String>::new);

    let on_submit = {
        let email = email.clone();
        let password = password.clone();
        let submitting = submitting.clone();
        let errors = errors.clone();
        let session = session.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let request = LoginRequest {
                email: email.trim().to_string(),
                password: (*password).clone(),
            };
            let problems = request.validate();
            if !problems.is_empty() {
                errors.set(problems.iter().map(ToString::to_string).collect());
                return;
            }
            errors.set(Vec::new());
            submitting.set(true);

            let submitting = submitting.clone();
            let errors = errors.clone();
            let session = session.clone();
            spawn_local(async move {
                match session.api().login(&request).await {
                    Ok(response) => {
                        log::info!(target: "auth", "Logged in as {}", request.email);
                        session.logged_in(response.access_token);
                    }
                    Err(e) => errors.set(vec![e.user_message(session.locale)]),
                }
                submitting.set(false);
            });
        })
    };

    let on_forgot = {
        let on_forgot = props.on_forgot.clone();
        Callback::from(move |_: MouseEvent| on_forgot.emit(()))
    };

    html! {
        <form class="auth-form" onsubmit={on_submit}>
            <h2>{"Log in"}</h2>
            {render_errors(&errors)}
            <div class="form-group">
                <label for="login-email">{"Email"}</label>
                <input
                    id="login-email"
                    type="email"
                    autocomplete="username"
                    value={(*email).clone()}
                    oninput={input_setter(&email)}
                    disabled={*submitting}
                />
            </div>
            <div class="form-group">
                <label for="login-password">{"Password"}</label>
                <input
                    id="login-password"
                    type="password"
                    autocomplete="current-password"
                    value={(*password).clone()}
                    oninput={input_setter(&password)}
                    disabled={*submitting}
                />
            </div>
            <button type="submit" class="btn btn-primary" disabled={*submitting}>
                {if *submitting { "Logging in..." } else { "Log in" }}
            </button>
            <button type="button" class="btn btn-link" onclick={on_forgot}>
                {"Forgot your password?"}
            </button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct ForgotPasswordFormProps {
    pub on_back: Callback<()>,
}

#[function_component(ForgotPasswordForm)]
pub fn forgot_password_form(props: &ForgotPasswordFormProps) -> Html {
    let session = use_session();
    let email = use_state(String::new);
    let submitting = use_state(|| false);
    let errors = use_state(Vec::<String>::new);
    let sent = use_state(|| Option::<String>::None);

    let on_submit = {
        let email = email.clone();
        let submitting = submitting.clone();
        let errors = errors.clone();
        let sent = sent.clone();
        let api_client = session.api();
        let locale = session.locale;

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            if let Err(problem) = validate_email(&email) {
                errors.set(vec![problem.to_string()]);
                return;
            }
            errors.set(Vec::new());
            submitting.set(true);

            let request = ForgotPasswordRequest { email: email.trim().to_string() };
            let submitting = submitting.clone();
            let errors = errors.clone();
            let sent = sent.clone();
            let api_client = api_client.clone();
            spawn_local(async move {
                match api_client.forgot_password(&request).await {
                    Ok(response) => sent.set(Some(user_facing(Some(&response.message), locale))),
                    Err(e) => errors.set(vec![e.user_message(locale)]),
                }
                submitting.set(false);
            });
        })
    };

    let on_back = {
        let on_back = props.on_back.clone();
        Callback::from(move |_: MouseEvent| on_back.emit(()))
    };

    html! {
        <form class="auth-form" onsubmit={on_submit}>
            <h2>{"Reset your password"}</h2>
            {render_errors(&errors)}
            {match &*sent {
                Some(message) => html! { <div class="form-message success">{message}</div> },
                None => html! {
                    <>
                        <div class="form-group">
                            <label for="forgot-email">{"Email"}</label>
                            <input
                                id="forgot-email"
                                type="email"
                                value={(*email).clone()}
                                oninput={input_setter(&email)}
                                disabled={*submitting}
                            />
                        </div>
                        <button type="submit" class="btn btn-primary" disabled={*submitting}>
                            {if *submitting { "Sending..." } else { "Send reset link" }}
                        </button>
                    </>
                },
            }}
            <button type="button" class="btn btn-link" onclick={on_back}>{"Back to login"}</button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResetPasswordFormProps {
    pub token: AttrValue,
    pub on_done: Callback<()>,
}

#[function_component(ResetPasswordFormView)]
pub fn reset_password_form(props: &ResetPasswordFormProps) -> Html {
    let session = use_session();
    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let submitting = use_state(|| false);
    let errors = use_state(Vec::<String>::new);
    let done = use_state(|| Option::<String>::None);

    let on_submit = {
        let password = password.clone();
        let confirmation = confirmation.clone();
        let submitting = submitting.clone();
        let errors = errors.clone();
        let done = done.clone();
        let token = props.token.clone();
        let api_client = session.api();
        let locale = session.locale;

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let form = ResetPasswordForm {
                token: token.to_string(),
                password: (*password).clone(),
                confirmation: (*confirmation).clone(),
            };
            let problems = form.validate();
            if !problems.is_empty() {
                errors.set(problems.iter().map(ToString::to_string).collect());
                return;
            }
            errors.set(Vec::new());
            submitting.set(true);

            let request = form.to_request();
            let submitting = submitting.clone();
            let errors = errors.clone();
            let done = done.clone();
            let api_client = api_client.clone();
            spawn_local(async move {
                match api_client.reset_password(&request).await {
                    Ok(response) => done.set(Some(user_facing(Some(&response.message), locale))),
                    Err(e) => errors.set(vec![e.user_message(locale)]),
                }
                submitting.set(false);
            });
        })
    };

    let on_done = {
        let on_done = props.on_done.clone();
        Callback::from(move |_: MouseEvent| on_done.emit(()))
    };

    html! {
        <form class="auth-form" onsubmit={on_submit}>
            <h2>{"Choose a new password"}</h2>
            {render_errors(&errors)}
            {match &*done {
                Some(message) => html! {
                    <>
                        <div class="form-message success">{message}</div>
                        <button type="button" class="btn btn-primary" onclick={on_done}>{"Go to login"}</button>
                    </>
                },
                None => html! {
                    <>
                        <div class="form-group">
                            <label for="reset-password">{"New password"}</label>
                            <input
                                id="reset-password"
                                type="password"
                                autocomplete="new-password"
                                value={(*password).clone()}
                                oninput={input_setter(&password)}
                                disabled={*submitting}
                            />
                        </div>
                        <div class="form-group">
                            <label for="reset-confirmation">{"Repeat password"}</label>
                            <input
                                id="reset-confirmation"
                                type="password"
                                autocomplete="new-password"
                                value={(*confirmation).clone()}
                                oninput={input_setter(&confirmation)}
                                disabled={*submitting}
                            />
                        </div>
                        <button type="submit" class="btn btn-primary" disabled={*submitting}>
                            {if *submitting { "Saving..." } else { "Save password" }}
                        </button>
                    </>
                },
            }}
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_reset_token_from_query() {
        assert_eq!(reset_token_from("?token=abc123"), Some("abc123".to_string()));
        assert_eq!(reset_token_from("?lang=es&token=x%2By"), Some("x+y".to_string()));
        assert_eq!(reset_token_from("?token="), None);
        assert_eq!(reset_token_from(""), None);
    }
}
