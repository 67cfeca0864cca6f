use web_sys::MouseEvent;
use yew::prelude::*;

use crate::hooks::use_notice::NoticeHandle;

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
    pub notice: NoticeHandle,
}

#[function_component(NoticeBanner)]
pub fn notice_banner(props: &NoticeBannerProps) -> Html {
    let Some(notice) = props.notice.current.as_ref() else {
        return html! {};
    };

    let on_dismiss = {
        let clear = props.notice.clear.clone();
        Callback::from(move |_: MouseEvent| clear.emit(()))
    };

    html! {
        <div class={notice.kind.css_class()} role="alert">
            <span class="notice-text">{&notice.text}</span>
            <button type="button" class="notice-dismiss" onclick={on_dismiss}>{"×"}</button>
        </div>
    }
}
