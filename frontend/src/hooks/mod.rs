pub mod use_booking_form;
pub mod use_bookings;
pub mod use_children;
pub mod use_debounce;
pub mod use_notice;
pub mod use_persisted_tab;
pub mod use_session;
pub mod use_slot_calendar;
pub mod use_tutors;
