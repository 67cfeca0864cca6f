pub mod admin_dashboard;
pub mod auth_forms;
pub mod booking_form;
pub mod booking_list;
pub mod calendar;
pub mod child_form_modal;
pub mod child_notes;
pub mod domain_panel;
pub mod guardian_dashboard;
pub mod header;
pub mod notice;
pub mod slot_admin;
pub mod tutor_table;
