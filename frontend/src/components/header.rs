use shared::messages::Locale;
use web_sys::{HtmlSelectElement, MouseEvent};
use yew::prelude::*;

use crate::hooks::use_session::use_session;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub title: AttrValue,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let session = use_session();

    let on_locale_change = {
        let session = session.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(locale) = Locale::from_code(&select.value()) {
                session.set_locale(locale);
            }
        })
    };

    let on_logout = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| session.logout())
    };

    let role = if session.is_admin() { "Staff" } else { "Family" };

    html! {
        <header class="header">
            <div class="container">
                <h1>{props.title.clone()}</h1>
                <div class="header-right">
                    {if session.is_authenticated() {
                        html! { <span class="role-badge">{role}</span> }
                    } else {
                        html! {}
                    }}
                    <select class="locale-select" onchange={on_locale_change}>
                        {for Locale::ALL.iter().map(|locale| html! {
                            <option value={locale.code()} selected={*locale == session.locale}>
                                {locale.label()}
                            </option>
                        })}
                    </select>
                    {if session.is_authenticated() {
                        html! {
                            <button type="button" class="btn btn-secondary" onclick={on_logout}>
                                {"Log out"}
                            </button>
                        }
                    } else {
                        html! {}
                    }}
                </div>
            </div>
        </header>
    }
}
