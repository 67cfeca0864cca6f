use shared::{iso_date, Child, ChildRequest, EmergencyContact, MAX_EMERGENCY_CONTACTS};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement, MouseEvent};
use yew::prelude::*;

use crate::hooks::use_session::use_session;
use crate::services::date_utils::{parse_input_date, today};

#[derive(Properties, PartialEq)]
pub struct ChildFormModalProps {
    pub is_open: bool,
    /// Child being edited; `None` registers a new one
    #[prop_or_default]
    pub editing: Option<Child>,
    pub on_saved: Callback<Child>,
    pub on_close: Callback<()>,
}

#[derive(Clone, Default, PartialEq)]
struct ChildFields {
    name: String,
    surname: String,
    date_of_birth: String,
    allergies: String,
    medical_notes: String,
    contacts: Vec<EmergencyContact>,
}

impl ChildFields {
    fn from_child(child: Option<&Child>) -> Self {
        match child {
            Some(child) => Self {
                name: child.name.clone(),
                surname: child.surname.clone(),
                date_of_birth: iso_date(child.date_of_birth),
                allergies: child.allergies.clone().unwrap_or_default(),
                medical_notes: child.medical_notes.clone().unwrap_or_default(),
                contacts: child.emergency_contacts.clone(),
            },
            None => Self::default(),
        }
    }

    /// Builds the request body, or the messages to show instead
    fn to_request(&self) -> Result<ChildRequest, Vec<String>> {
        let Some(date_of_birth) = parse_input_date(&self.date_of_birth) else {
            return Err(vec!["Please enter the date of birth".to_string()]);
        };
        let request = ChildRequest {
            name: self.name.clone(),
            surname: self.surname.clone(),
            date_of_birth,
            allergies: Some(self.allergies.clone()),
            medical_notes: Some(self.medical_notes.clone()),
            emergency_contacts: self.contacts.clone(),
        }
        .normalized();

        let errors = request.validate(today());
        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors.iter().map(ToString::to_string).collect())
        }
    }
}

#[derive(Clone, Copy)]
enum ContactField {
    Name,
    Phone,
}

#[function_component(ChildFormModal)]
pub fn child_form_modal(props: &ChildFormModalProps) -> Html {
    let session = use_session();
    let fields = use_state(ChildFields::default);
    let is_submitting = use_state(|| false);
    let errors = use_state(Vec::<String>::new);

    // Reset state when modal opens
    use_effect_with((props.is_open, props.editing.clone()), {
        let fields = fields.clone();
        let is_submitting = is_submitting.clone();
        let errors = errors.clone();
        move |(is_open, editing)| {
            if *is_open {
                fields.set(ChildFields::from_child(editing.as_ref()));
                is_submitting.set(false);
                errors.set(Vec::new());
            }
            || ()
        }
    });

    let text_setter = |apply: fn(&mut ChildFields, String)| {
        let fields = fields.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*fields).clone();
            apply(&mut next, input.value());
            fields.set(next);
        })
    };

    let area_setter = |apply: fn(&mut ChildFields, String)| {
        let fields = fields.clone();
        Callback::from(move |e: Event| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            let mut next = (*fields).clone();
            apply(&mut next, area.value());
            fields.set(next);
        })
    };

    let on_name_change = text_setter(|f, v| f.name = v);
    let on_surname_change = text_setter(|f, v| f.surname = v);
    let on_birth_change = text_setter(|f, v| f.date_of_birth = v);
    let on_allergies_change = area_setter(|f, v| f.allergies = v);
    let on_medical_change = area_setter(|f, v| f.medical_notes = v);

    let on_contact_change = {
        let fields = fields.clone();
        Callback::from(move |(index, field, value): (usize, ContactField, String)| {
            let mut next = (*fields).clone();
            if let Some(contact) = next.contacts.get_mut(index) {
                match field {
                    ContactField::Name => contact.name = value,
                    ContactField::Phone => contact.phone = value,
                }
            }
            fields.set(next);
        })
    };

    let on_add_contact = {
        let fields = fields.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*fields).clone();
            if next.contacts.len() < MAX_EMERGENCY_CONTACTS {
                next.contacts.push(EmergencyContact { name: String::new(), phone: String::new() });
                fields.set(next);
            }
        })
    };

    let on_remove_contact = {
        let fields = fields.clone();
        Callback::from(move |index: usize| {
            let mut next = (*fields).clone();
            if index < next.contacts.len() {
                next.contacts.remove(index);
                fields.set(next);
            }
        })
    };

    let on_submit = {
        let fields = fields.clone();
        let is_submitting = is_submitting.clone();
        let errors = errors.clone();
        let on_saved = props.on_saved.clone();
        let editing = props.editing.as_ref().map(|child| child.id);
        let api_client = session.api();
        let locale = session.locale;

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *is_submitting {
                return;
            }

            let request = match fields.to_request() {
                Ok(request) => request,
                Err(problems) => {
                    errors.set(problems);
                    return;
                }
            };

            is_submitting.set(true);
            errors.set(Vec::new());

            let is_submitting = is_submitting.clone();
            let errors = errors.clone();
            let on_saved = on_saved.clone();
            let api_client = api_client.clone();

            spawn_local(async move {
                let result = match editing {
                    Some(id) => api_client.update_child(id, &request).await,
                    None => api_client.create_child(&request).await,
                };
                is_submitting.set(false);
                match result {
                    Ok(child) => {
                        log::info!(target: "children", "Saved child #{}", child.id);
                        on_saved.emit(child);
                    }
                    Err(e) => errors.set(vec![e.user_message(locale)]),
                }
            });
        })
    };

    let on_backdrop_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_close.emit(());
        })
    };

    let on_modal_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });

    let on_cancel = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            on_close.emit(());
        })
    };

    if !props.is_open {
        return html! {};
    }

    let title = if props.editing.is_some() { "Edit child" } else { "Add child" };
    let busy = *is_submitting;

    html! {
        <div class="modal-backdrop" onclick={on_backdrop_click}>
            <div class="modal child-form-modal" onclick={on_modal_click}>
                <h3 class="modal-title">{title}</h3>

                {if errors.is_empty() {
                    html! {}
                } else {
                    html! {
                        <ul class="form-message error">
                            {for errors.iter().map(|error| html! { <li>{error}</li> })}
                        </ul>
                    }
                }}

                <form class="child-form" onsubmit={on_submit}>
                    <div class="form-row">
                        <div class="form-group">
                            <label for="child-name">{"Name"}</label>
                            <input
                                id="child-name"
                                type="text"
                                value={fields.name.clone()}
                                onchange={on_name_change}
                                disabled={busy}
                                autofocus=true
                            />
                        </div>
                        <div class="form-group">
                            <label for="child-surname">{"Surname"}</label>
                            <input
                                id="child-surname"
                                type="text"
                                value={fields.surname.clone()}
                                onchange={on_surname_change}
                                disabled={busy}
                            />
                        </div>
                    </div>

                    <div class="form-group">
                        <label for="child-birth">{"Date of birth"}</label>
                        <input
                            id="child-birth"
                            type="date"
                            max={iso_date(today())}
                            value={fields.date_of_birth.clone()}
                            onchange={on_birth_change}
                            disabled={busy}
                        />
                    </div>

                    <div class="form-group">
                        <label for="child-allergies">{"Allergies"}</label>
                        <textarea
                            id="child-allergies"
                            value={fields.allergies.clone()}
                            onchange={on_allergies_change}
                            disabled={busy}
                        />
                    </div>

                    <div class="form-group">
                        <label for="child-medical">{"Medical notes"}</label>
                        <textarea
                            id="child-medical"
                            value={fields.medical_notes.clone()}
                            onchange={on_medical_change}
                            disabled={busy}
                        />
                    </div>

                    <fieldset class="emergency-contacts" disabled={busy}>
                        <legend>{"Emergency contacts"}</legend>
                        {for fields.contacts.iter().enumerate().map(|(index, contact)| {
                            let contact_input = |field: ContactField| {
                                let on_contact_change = on_contact_change.clone();
                                Callback::from(move |e: Event| {
                                    let input: HtmlInputElement = e.target_unchecked_into();
                                    on_contact_change.emit((index, field, input.value()));
                                })
                            };
                            let on_remove = {
                                let on_remove_contact = on_remove_contact.clone();
                                Callback::from(move |_: MouseEvent| on_remove_contact.emit(index))
                            };
                            html! {
                                <div class="contact-row" key={index}>
                                    <input
                                        type="text"
                                        placeholder="Name"
                                        value={contact.name.clone()}
                                        onchange={contact_input(ContactField::Name)}
                                    />
                                    <input
                                        type="tel"
                                        placeholder="Phone"
                                        value={contact.phone.clone()}
                                        onchange={contact_input(ContactField::Phone)}
                                    />
                                    <button type="button" class="btn btn-small btn-secondary" onclick={on_remove}>
                                        {"Remove"}
                                    </button>
                                </div>
                            }
                        })}
                        {if fields.contacts.len() < MAX_EMERGENCY_CONTACTS {
                            html! {
                                <button type="button" class="btn btn-small" onclick={on_add_contact}>
                                    {"Add contact"}
                                </button>
                            }
                        } else {
                            html! {}
                        }}
                    </fieldset>

                    <div class="form-buttons">
                        <button type="submit" class="btn btn-primary" disabled={busy}>
                            {if busy { "Saving..." } else { "Save" }}
                        </button>
                        <button type="button" class="btn btn-secondary" onclick={on_cancel} disabled={busy}>
                            {"Cancel"}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fields() -> ChildFields {
        ChildFields {
            name: " Ana ".into(),
            surname: "García".into(),
            date_of_birth: "2019-04-02".into(),
            allergies: "  ".into(),
            medical_notes: String::new(),
            contacts: vec![
                EmergencyContact { name: "Abuela".into(), phone: "600111222".into() },
                EmergencyContact { name: String::new(), phone: String::new() },
            ],
        }
    }

    #[wasm_bindgen_test]
    fn test_fields_normalize_into_request() {
        let request = fields().to_request().unwrap();
        assert_eq!(request.name, "Ana");
        assert_eq!(request.allergies, None);
        assert_eq!(request.medical_notes, None);
        assert_eq!(request.emergency_contacts.len(), 1);
    }

    #[wasm_bindgen_test]
    fn test_missing_birth_date_is_reported() {
        let mut fields = fields();
        fields.date_of_birth.clear();
        let errors = fields.to_request().unwrap_err();
        assert_eq!(errors, vec!["Please enter the date of birth".to_string()]);
    }

    #[wasm_bindgen_test]
    fn test_incomplete_contact_is_reported() {
        let mut fields = fields();
        fields.contacts[1].phone = "600".into();
        let errors = fields.to_request().unwrap_err();
        assert_eq!(
            errors,
            vec!["Emergency contact 2 needs both a name and a phone number".to_string()]
        );
    }
}
