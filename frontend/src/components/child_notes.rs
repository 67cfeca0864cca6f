use shared::sequence::RequestSequence;
use shared::{format_date, Child, ChildNote, ChildNoteRequest};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::hooks::use_notice::{Notice, NoticeHandle};
use crate::hooks::use_session::use_session;

#[derive(Properties, PartialEq)]
pub struct ChildNotesProps {
    pub child: Child,
    /// Staff may write notes, guardians only read them
    #[prop_or_default]
    pub staff: bool,
    pub notice: NoticeHandle,
}

/// One image reference per line or comma
fn split_images(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

#[function_component(ChildNotes)]
pub fn child_notes(props: &ChildNotesProps) -> Html {
    let session = use_session();
    let notes = use_state(Vec::<ChildNote>::new);
    let loading = use_state(|| false);
    let content = use_state(String::new);
    let images = use_state(String::new);
    let sending = use_state(|| false);
    let errors = use_state(Vec::<String>::new);
    let sequence = use_mut_ref(RequestSequence::new);

    {
        let notes = notes.clone();
        let loading = loading.clone();
        let sequence = sequence.clone();
        let api_error = props.notice.api_error.clone();
        use_effect_with((props.child.id, session.api()), move |(child_id, api_client)| {
            let ticket = sequence.borrow_mut().issue();
            let child_id = *child_id;
            let api_client = api_client.clone();
            loading.set(true);
            spawn_local(async move {
                let result = api_client.get_child_notes(child_id).await;
                if !sequence.borrow().is_current(ticket) {
                    return;
                }
                match result {
                    Ok(mut data) => {
                        data.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                        notes.set(data);
                    }
                    Err(e) => {
                        log::error!(
                            target: "notes",
                            "Failed to fetch notes for child #{}: {}",
                            child_id,
                            e
                        );
                        api_error.emit(e);
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    let on_content_input = {
        let content = content.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            content.set(area.value());
        })
    };

    let on_images_input = {
        let images = images.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            images.set(input.value());
        })
    };

    let on_submit = {
        let notes = notes.clone();
        let content = content.clone();
        let images = images.clone();
        let sending = sending.clone();
        let errors = errors.clone();
        let api_client = session.api();
        let child_id = props.child.id;
        let show = props.notice.show.clone();
        let api_error = props.notice.api_error.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *sending {
                return;
            }
            let request = ChildNoteRequest {
                child_id,
                content: content.trim().to_string(),
                images: split_images(&images),
            };
            let problems = request.validate();
            if !problems.is_empty() {
                errors.set(problems.iter().map(ToString::to_string).collect());
                return;
            }
            errors.set(Vec::new());
            sending.set(true);

            let notes = notes.clone();
            let content = content.clone();
            let images = images.clone();
            let sending = sending.clone();
            let api_client = api_client.clone();
            let show = show.clone();
            let api_error = api_error.clone();

            spawn_local(async move {
                match api_client.create_child_note(&request).await {
                    Ok(note) => {
                        let mut next = (*notes).clone();
                        next.insert(0, note);
                        notes.set(next);
                        content.set(String::new());
                        images.set(String::new());
                        show.emit(Notice::success("Note added"));
                    }
                    Err(e) => api_error.emit(e),
                }
                sending.set(false);
            });
        })
    };

    html! {
        <section class="child-notes">
            <h4>{format!("Notes for {}", props.child.full_name())}</h4>

            {if props.staff {
                html! {
                    <form class="note-form" onsubmit={on_submit}>
                        <textarea
                            placeholder="Write a note for the family"
                            value={(*content).clone()}
                            oninput={on_content_input}
                            disabled={*sending}
                        />
                        <input
                            type="text"
                            placeholder="Image links, separated by commas"
                            value={(*images).clone()}
                            oninput={on_images_input}
                            disabled={*sending}
                        />
                        {for errors.iter().map(|error| html! {
                            <div class="form-message error">{error}</div>
                        })}
                        <button type="submit" class="btn btn-primary" disabled={*sending}>
                            {if *sending { "Sending..." } else { "Add note" }}
                        </button>
                    </form>
                }
            } else {
                html! {}
            }}

            {if *loading && notes.is_empty() {
                html! { <div class="loading">{"Loading notes..."}</div> }
            } else if notes.is_empty() {
                html! { <p class="empty-state">{"No notes yet"}</p> }
            } else {
                html! {
                    <ul class="note-list">
                        {for notes.iter().map(|note| html! {
                            <li class="note" key={note.id}>
                                <div class="note-meta">
                                    {format_date(note.created_at.date_naive())}
                                    {note
                                        .author
                                        .as_ref()
                                        .map(|author| format!(" · {}", author))
                                        .unwrap_or_default()}
                                </div>
                                <p>{&note.content}</p>
                                {for note.images.iter().map(|src| html! {
                                    <img class="note-image" src={src.clone()} alt="" />
                                })}
                            </li>
                        })}
                    </ul>
                }
            }}
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_split_images() {
        assert_eq!(
            split_images("https://a.test/1.png, https://a.test/2.png\n\n ,"),
            vec!["https://a.test/1.png".to_string(), "https://a.test/2.png".to_string()]
        );
        assert!(split_images("   ").is_empty());
    }
}
