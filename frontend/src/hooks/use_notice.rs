use gloo::timers::callback::Timeout;
use yew::prelude::*;

use crate::hooks::use_session::use_session;
use crate::services::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeKind::Success => "notice success",
            NoticeKind::Error => "notice error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Blocking notices stay until dismissed
    pub sticky: bool,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
            sticky: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            sticky: false,
        }
    }

    pub fn blocking(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            sticky: true,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct NoticeHandle {
    pub current: Option<Notice>,
    pub show: Callback<Notice>,
    pub clear: Callback<()>,
    /// Shows an API failure in the user's language. 401s are left to the session shell.
    pub api_error: Callback<ApiError>,
}

#[hook]
pub fn use_notice() -> NoticeHandle {
    let session = use_session();
    let current = use_state(|| Option::<Notice>::None);
    let timer = use_mut_ref(|| None::<Timeout>);
    let notice_ms = session.config.notice_ms;

    let show = {
        let current = current.clone();
        let timer = timer.clone();
        use_callback(notice_ms, move |notice: Notice, notice_ms| {
            let sticky = notice.sticky;
            current.set(Some(notice));
            let mut timer = timer.borrow_mut();
            if sticky {
                timer.take();
            } else {
                let current = current.clone();
                *timer = Some(Timeout::new(*notice_ms, move || current.set(None)));
            }
        })
    };

    let clear = {
        let current = current.clone();
        let timer = timer.clone();
        use_callback((), move |_, _| {
            timer.borrow_mut().take();
            current.set(None);
        })
    };

    let api_error = {
        let show = show.clone();
        use_callback(session.locale, move |error: ApiError, locale| {
            if !error.is_unauthorized() {
                show.emit(Notice::error(error.user_message(*locale)));
            }
        })
    };

    NoticeHandle {
        current: (*current).clone(),
        show,
        clear,
        api_error,
    }
}
