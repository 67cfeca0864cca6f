use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod availability;
pub mod conflict;
pub mod grouping;
pub mod messages;
pub mod optimistic;
pub mod sequence;
pub mod session;

pub type BookingId = i64;
pub type SlotId = i64;
pub type ChildId = i64;
pub type UserId = i64;

/// The three bookable services offered by the center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingDomain {
    /// Birthday party slots
    Birthday,
    /// Daycare sessions, a booking may span several slots
    Daycare,
    /// Facility visits (called "meetings" by the backend)
    Visit,
}

impl BookingDomain {
    pub const ALL: [BookingDomain; 3] = [
        BookingDomain::Birthday,
        BookingDomain::Daycare,
        BookingDomain::Visit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BookingDomain::Birthday => "Birthdays",
            BookingDomain::Daycare => "Daycare",
            BookingDomain::Visit => "Visits",
        }
    }

    /// Statuses a booking of this domain can take
    pub fn statuses(&self) -> &'static [BookingStatus] {
        match self {
            BookingDomain::Birthday => &[
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
            ],
            BookingDomain::Daycare | BookingDomain::Visit => &[
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                BookingStatus::Closed,
            ],
        }
    }

    pub fn supports(&self, status: BookingStatus) -> bool {
        self.statuses().contains(&status)
    }

    pub fn bookings_path(&self) -> &'static str {
        match self {
            BookingDomain::Birthday => "/api/birthday-bookings",
            BookingDomain::Daycare => "/api/daycare-bookings",
            BookingDomain::Visit => "/api/meetingBookings",
        }
    }

    pub fn slots_path(&self) -> &'static str {
        match self {
            BookingDomain::Birthday => "/api/birthday-slots",
            BookingDomain::Daycare => "/api/daycare-slots",
            BookingDomain::Visit => "/api/meetingSlots",
        }
    }

    pub fn booking_path(&self, id: BookingId) -> String {
        format!("{}/{}", self.bookings_path(), id)
    }

    pub fn status_path(&self, id: BookingId) -> String {
        format!("{}/status/{}", self.bookings_path(), id)
    }

    pub fn slot_path(&self, id: SlotId) -> String {
        format!("{}/{}", self.slots_path(), id)
    }

    /// Path listing the slots of a single day
    pub fn slots_by_day_path(&self, day: NaiveDate) -> String {
        match self {
            BookingDomain::Daycare => {
                format!("{}/available?date={}", self.slots_path(), iso_date(day))
            }
            BookingDomain::Birthday | BookingDomain::Visit => {
                format!("{}/getSlotsByDay/{}", self.slots_path(), iso_date(day))
            }
        }
    }

    pub fn slots_in_range_path(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}?startDate={}&endDate={}",
            self.slots_path(),
            iso_date(start),
            iso_date(end)
        )
    }

    /// Bookings between two days, both inclusive
    pub fn bookings_in_range_path(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}?startDate={}&endDate={}",
            self.bookings_path(),
            iso_date(start),
            iso_date(end)
        )
    }

    pub fn requires_children(&self) -> bool {
        matches!(self, BookingDomain::Birthday | BookingDomain::Daycare)
    }

    pub fn allows_multiple_slots(&self) -> bool {
        matches!(self, BookingDomain::Daycare)
    }

    /// Local storage key remembering the admin sub-tab for this domain
    pub fn tab_storage_key(&self) -> &'static str {
        match self {
            BookingDomain::Birthday => "adminBirthdayActiveTab",
            BookingDomain::Daycare => "adminDaycareActiveTab",
            BookingDomain::Visit => "adminVisitActiveTab",
        }
    }
}

impl fmt::Display for BookingDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Open,
    Closed,
}

/// A bookable time interval with finite capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: SlotId,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub capacity: u32,
    pub available_spots: u32,
    pub status: SlotStatus,
}

impl Slot {
    /// Free spots, never more than the capacity
    pub fn free_spots(&self) -> u32 {
        self.available_spots.min(self.capacity)
    }

    pub fn is_open(&self) -> bool {
        self.status == SlotStatus::Open
    }

    /// A slot without free spots is full whatever its status says
    pub fn is_full(&self) -> bool {
        self.free_spots() == 0
    }

    pub fn is_bookable(&self) -> bool {
        self.is_open() && !self.is_full()
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// "HH:MM - HH:MM"
    pub fn time_range_label(&self) -> String {
        format!("{} - {}", format_time(self.start_time), format_time(self.end_time))
    }
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Closed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "CLOSED" => Some(BookingStatus::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Closed => "Closed",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Closed)
    }

    /// Cancelled bookings keep their slots but release the capacity
    pub fn holds_capacity(&self) -> bool {
        *self != BookingStatus::Cancelled
    }

    /// PENDING → CONFIRMED → CLOSED, and CANCELLED from PENDING or CONFIRMED
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Closed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The guardian account that placed a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    pub id: ChildId,
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

impl ChildRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

/// A reservation attaching a requester (and optionally children) to slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub status: BookingStatus,
    #[serde(default)]
    pub slots: Vec<Slot>,
    pub user: Requester,
    #[serde(default)]
    pub children: Vec<ChildRef>,
    #[serde(default)]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Earliest slot by date and start time
    pub fn first_slot(&self) -> Option<&Slot> {
        self.slots.iter().min_by_key(|slot| slot.starts_at())
    }
}

/// Read access shared by every booking-like record the calendar logic handles
pub trait BookingRecord {
    fn record_id(&self) -> BookingId;

    fn status(&self) -> BookingStatus;

    /// Point in time the record is listed under
    fn scheduled_at(&self) -> NaiveDateTime;

    fn occupies(&self, day: NaiveDate) -> bool;

    /// Display strings free-text search looks into
    fn search_fields(&self) -> Vec<String>;
}

impl BookingRecord for Booking {
    fn record_id(&self) -> BookingId {
        self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn scheduled_at(&self) -> NaiveDateTime {
        self.first_slot()
            .map(Slot::starts_at)
            .unwrap_or_else(|| self.created_at.naive_utc())
    }

    fn occupies(&self, day: NaiveDate) -> bool {
        self.slots.iter().any(|slot| slot.date == day)
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.id.to_string(), self.user.email.clone()];
        if let Some(phone) = &self.user.phone {
            fields.push(phone.clone());
        }
        for slot in &self.slots {
            fields.push(format_date(slot.date));
            fields.push(format_time(slot.start_time));
            fields.push(slot.time_range_label());
        }
        fields.push(self.status.as_str().to_string());
        fields
    }
}

impl<R: BookingRecord + ?Sized> BookingRecord for &R {
    fn record_id(&self) -> BookingId {
        (**self).record_id()
    }

    fn status(&self) -> BookingStatus {
        (**self).status()
    }

    fn scheduled_at(&self) -> NaiveDateTime {
        (**self).scheduled_at()
    }

    fn occupies(&self, day: NaiveDate) -> bool {
        (**self).occupies(day)
    }

    fn search_fields(&self) -> Vec<String> {
        (**self).search_fields()
    }
}

/// Request body for creating or editing a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub slot_ids: Vec<SlotId>,
    #[serde(default)]
    pub child_ids: Vec<ChildId>,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
}

/// Form state behind the booking dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub day: Option<NaiveDate>,
    pub slot_ids: Vec<SlotId>,
    pub child_ids: Vec<ChildId>,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingValidationError {
    #[error("Please select a day")]
    MissingDay,
    #[error("Please select a time slot")]
    MissingSlot,
    #[error("Only one time slot can be booked at a time")]
    TooManySlots,
    #[error("Slot {0} is not on the selected day")]
    SlotNotOnDay(SlotId),
    #[error("Slot {0} is no longer available")]
    SlotUnavailable(SlotId),
    #[error("Please select at least one child")]
    MissingChildren,
}

impl BookingDraft {
    pub fn toggle_slot(&mut self, slot_id: SlotId, multiple: bool) {
        if let Some(position) = self.slot_ids.iter().position(|id| *id == slot_id) {
            self.slot_ids.remove(position);
        } else if multiple {
            self.slot_ids.push(slot_id);
        } else {
            self.slot_ids = vec![slot_id];
        }
    }

    pub fn toggle_child(&mut self, child_id: ChildId) {
        if let Some(position) = self.child_ids.iter().position(|id| *id == child_id) {
            self.child_ids.remove(position);
        } else {
            self.child_ids.push(child_id);
        }
    }

    /// Checks run before any request is issued.
    ///
    /// `day_slots` are the slots currently listed for the selected day; a
    /// slot already held by the edited booking stays valid even when full.
    pub fn validate(
        &self,
        domain: BookingDomain,
        day_slots: &[Slot],
        editing: Option<&Booking>,
    ) -> Vec<BookingValidationError> {
        let mut errors = Vec::new();

        let Some(day) = self.day else {
            errors.push(BookingValidationError::MissingDay);
            return errors;
        };

        if self.slot_ids.is_empty() {
            errors.push(BookingValidationError::MissingSlot);
        } else if self.slot_ids.len() > 1 && !domain.allows_multiple_slots() {
            errors.push(BookingValidationError::TooManySlots);
        }

        for slot_id in &self.slot_ids {
            let already_held = editing
                .map(|booking| booking.slots.iter().any(|slot| slot.id == *slot_id))
                .unwrap_or(false);
            match day_slots.iter().find(|slot| slot.id == *slot_id) {
                Some(slot) if slot.date != day => {
                    errors.push(BookingValidationError::SlotNotOnDay(*slot_id))
                }
                Some(slot) if !slot.is_bookable() && !already_held => {
                    errors.push(BookingValidationError::SlotUnavailable(*slot_id))
                }
                Some(_) => {}
                None if already_held => {}
                None => errors.push(BookingValidationError::SlotUnavailable(*slot_id)),
            }
        }

        if domain.requires_children() && self.child_ids.is_empty() {
            errors.push(BookingValidationError::MissingChildren);
        }

        errors
    }

    pub fn to_request(&self) -> BookingRequest {
        let comments = self.comments.trim();
        BookingRequest {
            slot_ids: self.slot_ids.clone(),
            child_ids: self.child_ids.clone(),
            comments: (!comments.is_empty()).then(|| comments.to_string()),
        }
    }

    /// Prefills the form from an existing booking
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            day: booking.first_slot().map(|slot| slot.date),
            slot_ids: booking.slots.iter().map(|slot| slot.id).collect(),
            child_ids: booking.children.iter().map(|child| child.id).collect(),
            comments: booking.comments.clone().unwrap_or_default(),
        }
    }
}

/// Create or update payload for a slot (staff only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub capacity: u32,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotValidationError {
    #[error("The slot must end after it starts")]
    EndBeforeStart,
    #[error("Capacity must be at least 1")]
    ZeroCapacity,
}

impl SlotRequest {
    pub fn validate(&self) -> Vec<SlotValidationError> {
        let mut errors = Vec::new();
        if self.end_time <= self.start_time {
            errors.push(SlotValidationError::EndBeforeStart);
        }
        if self.capacity == 0 {
            errors.push(SlotValidationError::ZeroCapacity);
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// A child registered by a guardian
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_notes: Option<String>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
}

impl Child {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Age in whole years on `today`
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }
}

pub const MAX_EMERGENCY_CONTACTS: usize = 2;

/// Body of `/api/addChild` and `/api/updateChild/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRequest {
    pub name: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    pub allergies: Option<String>,
    pub medical_notes: Option<String>,
    pub emergency_contacts: Vec<EmergencyContact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChildValidationError {
    #[error("Please enter the child's name")]
    EmptyName,
    #[error("Please enter the child's surname")]
    EmptySurname,
    #[error("The date of birth cannot be in the future")]
    BirthDateInFuture,
    #[error("At most 2 emergency contacts are allowed, got {0}")]
    TooManyEmergencyContacts(usize),
    #[error("Emergency contact {0} needs both a name and a phone number")]
    IncompleteEmergencyContact(usize),
}

impl ChildRequest {
    pub fn validate(&self, today: NaiveDate) -> Vec<ChildValidationError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ChildValidationError::EmptyName);
        }
        if self.surname.trim().is_empty() {
            errors.push(ChildValidationError::EmptySurname);
        }
        if self.date_of_birth > today {
            errors.push(ChildValidationError::BirthDateInFuture);
        }
        if self.emergency_contacts.len() > MAX_EMERGENCY_CONTACTS {
            errors.push(ChildValidationError::TooManyEmergencyContacts(
                self.emergency_contacts.len(),
            ));
        }
        for (index, contact) in self.emergency_contacts.iter().enumerate() {
            if contact.name.trim().is_empty() || contact.phone.trim().is_empty() {
                errors.push(ChildValidationError::IncompleteEmergencyContact(index + 1));
            }
        }
        errors
    }

    /// Trims text fields and drops blank optional ones and empty contacts
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.surname = self.surname.trim().to_string();
        self.allergies = self.allergies.and_then(non_blank);
        self.medical_notes = self.medical_notes.and_then(non_blank);
        self.emergency_contacts
            .retain(|contact| !(contact.name.trim().is_empty() && contact.phone.trim().is_empty()));
        self
    }
}

impl From<&Child> for ChildRequest {
    fn from(child: &Child) -> Self {
        Self {
            name: child.name.clone(),
            surname: child.surname.clone(),
            date_of_birth: child.date_of_birth,
            allergies: child.allergies.clone(),
            medical_notes: child.medical_notes.clone(),
            emergency_contacts: child.emergency_contacts.clone(),
        }
    }
}

/// Staff-authored message attached to a child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildNote {
    pub id: i64,
    pub child_id: ChildId,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildNoteRequest {
    pub child_id: ChildId,
    pub content: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteValidationError {
    #[error("The note cannot be empty")]
    EmptyContent,
    #[error("Image reference {0} is not a URL")]
    InvalidImage(usize),
}

impl ChildNoteRequest {
    pub fn validate(&self) -> Vec<NoteValidationError> {
        let mut errors = Vec::new();
        if self.content.trim().is_empty() {
            errors.push(NoteValidationError::EmptyContent);
        }
        for (index, image) in self.images.iter().enumerate() {
            let image = image.trim();
            if !(image.starts_with("http://")
                || image.starts_with("https://")
                || image.starts_with('/'))
            {
                errors.push(NoteValidationError::InvalidImage(index + 1));
            }
        }
        errors
    }
}

/// Guardian row of the admin tutor listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorPage {
    pub tutors: Vec<Tutor>,
    pub total: u32,
    pub page: u32,
    pub limit: u32,
}

impl TutorPage {
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        self.total.div_ceil(self.limit).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(alias = "token")]
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter your password")]
    EmptyPassword,
    #[error("The password needs at least 8 characters, got {0}")]
    PasswordTooShort(usize),
    #[error("The passwords do not match")]
    PasswordMismatch,
    #[error("The reset link is missing its token")]
    MissingResetToken,
}

pub fn validate_email(email: &str) -> Result<(), CredentialValidationError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CredentialValidationError::InvalidEmail)
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Vec<CredentialValidationError> {
        let mut errors = Vec::new();
        if let Err(error) = validate_email(&self.email) {
            errors.push(error);
        }
        if self.password.is_empty() {
            errors.push(CredentialValidationError::EmptyPassword);
        }
        errors
    }
}

/// Reset form before it is turned into a [`ResetPasswordRequest`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub confirmation: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Vec<CredentialValidationError> {
        let mut errors = Vec::new();
        if self.token.trim().is_empty() {
            errors.push(CredentialValidationError::MissingResetToken);
        }
        let length = self.password.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            errors.push(CredentialValidationError::PasswordTooShort(length));
        }
        if self.password != self.confirmation {
            errors.push(CredentialValidationError::PasswordMismatch);
        }
        errors
    }

    pub fn to_request(&self) -> ResetPasswordRequest {
        ResetPasswordRequest {
            token: self.token.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error payload returned by the backend on rejected requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

/// `yyyy-MM-dd`, as the backend expects in paths and queries
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `dd/MM/yyyy`, as shown in lists and matched by search
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// e.g. "Saturday, June 1, 2024"
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {}, {}",
        date.format("%A"),
        month_name(date.month()),
        date.day(),
        date.year()
    )
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Invalid Month",
    }
}

/// Accepts `HH:MM` and `HH:MM:SS`
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Serde adapter for slot clock times
mod clock_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).ok_or_else(|| de::Error::custom(format!("invalid time: {raw}")))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub fn slot(id: SlotId, day: NaiveDate, start: &str, capacity: u32, available: u32) -> Slot {
        let start_time = parse_time(start).unwrap();
        Slot {
            id,
            date: day,
            start_time,
            end_time: start_time + chrono::Duration::hours(1),
            capacity,
            available_spots: available,
            status: SlotStatus::Open,
        }
    }

    pub fn booking(id: BookingId, status: BookingStatus, slots: Vec<Slot>) -> Booking {
        Booking {
            id,
            status,
            slots,
            user: Requester {
                id: 7,
                name: "Laura Gómez".to_string(),
                email: "laura@example.com".to_string(),
                phone: Some("600123456".to_string()),
            },
            children: vec![],
            comments: None,
            created_at: "2024-05-20T09:30:00Z".parse().unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_slot_deserializes_backend_payload() {
        let json = r#"{
            "id": 3,
            "date": "2024-06-01",
            "startTime": "10:00:00",
            "endTime": "11:30",
            "capacity": 5,
            "availableSpots": 2,
            "status": "OPEN"
        }"#;
        let slot: Slot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.date, date(2024, 6, 1));
        assert_eq!(format_time(slot.start_time), "10:00");
        assert_eq!(slot.time_range_label(), "10:00 - 11:30");
        assert_eq!(slot.status, SlotStatus::Open);
        assert!(slot.is_bookable());
    }

    #[test]
    fn test_slot_free_spots_never_exceed_capacity() {
        let mut slot = slot(1, date(2024, 6, 1), "10:00", 3, 9);
        assert_eq!(slot.free_spots(), 3);
        slot.available_spots = 0;
        assert!(slot.is_full());
        slot.status = SlotStatus::Closed;
        slot.available_spots = 2;
        assert!(!slot.is_bookable());
    }

    #[test]
    fn test_booking_status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Closed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Closed));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Closed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(Closed.is_terminal() && Cancelled.is_terminal());
    }

    #[test]
    fn test_booking_status_wire_format() {
        assert_eq!(serde_json::to_string(&BookingStatus::Cancelled).unwrap(), "\"CANCELLED\"");
        assert_eq!(BookingStatus::parse(" confirmed "), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("done"), None);
    }

    #[test]
    fn test_domain_paths() {
        let day = date(2024, 6, 1);
        assert_eq!(BookingDomain::Visit.status_path(12), "/api/meetingBookings/status/12");
        assert_eq!(
            BookingDomain::Visit.slots_by_day_path(day),
            "/api/meetingSlots/getSlotsByDay/2024-06-01"
        );
        assert_eq!(
            BookingDomain::Daycare.slots_by_day_path(day),
            "/api/daycare-slots/available?date=2024-06-01"
        );
        assert_eq!(BookingDomain::Daycare.booking_path(4), "/api/daycare-bookings/4");
        assert_eq!(
            BookingDomain::Visit.bookings_in_range_path(day, day),
            "/api/meetingBookings?startDate=2024-06-01&endDate=2024-06-01"
        );
        assert_eq!(
            BookingDomain::Birthday.slots_in_range_path(day, date(2024, 6, 30)),
            "/api/birthday-slots?startDate=2024-06-01&endDate=2024-06-30"
        );
        assert!(!BookingDomain::Birthday.supports(BookingStatus::Closed));
        assert!(BookingDomain::Visit.supports(BookingStatus::Closed));
    }

    #[test]
    fn test_booking_scheduled_at_uses_earliest_slot() {
        let day = date(2024, 6, 3);
        let booking = booking(
            1,
            BookingStatus::Pending,
            vec![slot(2, day, "15:00", 4, 4), slot(1, day, "09:00", 4, 4)],
        );
        assert_eq!(booking.scheduled_at(), day.and_hms_opt(9, 0, 0).unwrap());

        let without_slots = super::test_support::booking(2, BookingStatus::Pending, vec![]);
        assert_eq!(without_slots.scheduled_at().date(), date(2024, 5, 20));
    }

    #[test]
    fn test_booking_draft_validation() {
        let day = date(2024, 6, 1);
        let slots = vec![slot(1, day, "10:00", 5, 5), slot(2, day, "12:00", 5, 0)];

        let empty = BookingDraft::default();
        assert_eq!(
            empty.validate(BookingDomain::Visit, &slots, None),
            vec![BookingValidationError::MissingDay]
        );

        let mut draft = BookingDraft { day: Some(day), ..BookingDraft::default() };
        assert_eq!(
            draft.validate(BookingDomain::Birthday, &slots, None),
            vec![BookingValidationError::MissingSlot, BookingValidationError::MissingChildren]
        );

        draft.toggle_slot(2, false);
        assert_eq!(
            draft.validate(BookingDomain::Visit, &slots, None),
            vec![BookingValidationError::SlotUnavailable(2)]
        );

        draft.toggle_slot(1, false);
        assert_eq!(draft.slot_ids, vec![1]);
        assert!(draft.validate(BookingDomain::Visit, &slots, None).is_empty());

        draft.toggle_slot(2, true);
        assert!(draft
            .validate(BookingDomain::Visit, &slots, None)
            .contains(&BookingValidationError::TooManySlots));
    }

    #[test]
    fn test_booking_draft_edit_keeps_held_full_slot() {
        let day = date(2024, 6, 1);
        let full = slot(2, day, "12:00", 5, 0);
        let existing = booking(9, BookingStatus::Confirmed, vec![full.clone()]);
        let draft = BookingDraft::from_booking(&existing);
        assert_eq!(draft.day, Some(day));
        assert!(draft.validate(BookingDomain::Visit, &[full], Some(&existing)).is_empty());
    }

    #[test]
    fn test_booking_draft_request_drops_blank_comments() {
        let draft = BookingDraft {
            day: Some(date(2024, 6, 1)),
            slot_ids: vec![1],
            child_ids: vec![4],
            comments: "   ".to_string(),
        };
        let request = draft.to_request();
        assert_eq!(request.comments, None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["slotIds"][0], 1);
        assert_eq!(json["childIds"][0], 4);
    }

    #[test]
    fn test_child_request_validation() {
        let today = date(2024, 6, 1);
        let contact = |name: &str, phone: &str| EmergencyContact {
            name: name.to_string(),
            phone: phone.to_string(),
        };
        let mut request = ChildRequest {
            name: "Martina".to_string(),
            surname: "Ruiz".to_string(),
            date_of_birth: date(2019, 3, 14),
            allergies: Some("  ".to_string()),
            medical_notes: None,
            emergency_contacts: vec![contact("Ana", "611222333")],
        };
        assert!(request.validate(today).is_empty());

        request.emergency_contacts.push(contact("Luis", ""));
        request.emergency_contacts.push(contact("Eva", "622"));
        request.date_of_birth = date(2025, 1, 1);
        request.name = " ".to_string();
        assert_eq!(
            request.validate(today),
            vec![
                ChildValidationError::EmptyName,
                ChildValidationError::BirthDateInFuture,
                ChildValidationError::TooManyEmergencyContacts(3),
                ChildValidationError::IncompleteEmergencyContact(2),
            ]
        );

        let normalized = ChildRequest {
            emergency_contacts: vec![contact("", ""), contact("Ana", "611")],
            ..request
        }
        .normalized();
        assert_eq!(normalized.allergies, None);
        assert_eq!(normalized.emergency_contacts.len(), 1);
    }

    #[test]
    fn test_child_age() {
        let child = Child {
            id: 1,
            name: "Leo".to_string(),
            surname: "Martín".to_string(),
            date_of_birth: date(2018, 6, 2),
            allergies: None,
            medical_notes: None,
            emergency_contacts: vec![],
        };
        assert_eq!(child.age_on(date(2024, 6, 1)), 5);
        assert_eq!(child.age_on(date(2024, 6, 2)), 6);
    }

    #[test]
    fn test_note_validation() {
        let note = ChildNoteRequest {
            child_id: 1,
            content: "Ate all the lunch".to_string(),
            images: vec!["https://cdn.example.com/a.jpg".to_string(), "photo.jpg".to_string()],
        };
        assert_eq!(note.validate(), vec![NoteValidationError::InvalidImage(2)]);
    }

    #[test]
    fn test_tutor_page_navigation() {
        let page = TutorPage { tutors: vec![], total: 21, page: 2, limit: 10 };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        let empty = TutorPage { tutors: vec![], total: 0, page: 1, limit: 10 };
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_credential_validation() {
        assert!(validate_email("guardian@example.com").is_ok());
        assert!(validate_email("guardian@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a b@example.com").is_err());

        let login = LoginRequest { email: "x@y.es".to_string(), password: String::new() };
        assert_eq!(login.validate(), vec![CredentialValidationError::EmptyPassword]);

        let form = ResetPasswordForm {
            token: "abc".to_string(),
            password: "short".to_string(),
            confirmation: "shorter".to_string(),
        };
        assert_eq!(
            form.validate(),
            vec![
                CredentialValidationError::PasswordTooShort(5),
                CredentialValidationError::PasswordMismatch,
            ]
        );
    }

    #[test]
    fn test_token_response_accepts_both_field_names() {
        let a: TokenResponse = serde_json::from_str(r#"{"accessToken":"t1"}"#).unwrap();
        let b: TokenResponse = serde_json::from_str(r#"{"token":"t2"}"#).unwrap();
        assert_eq!(a.access_token, "t1");
        assert_eq!(b.access_token, "t2");
    }

    #[test]
    fn test_api_error_body_text() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"error":"Slot is full"}"#).unwrap();
        assert_eq!(body.text(), Some("Slot is full"));
        assert_eq!(ApiErrorBody::default().text(), None);
    }

    #[test]
    fn test_date_formatting() {
        let day = date(2024, 6, 1);
        assert_eq!(iso_date(day), "2024-06-01");
        assert_eq!(format_date(day), "01/06/2024");
        assert_eq!(format_long_date(day), "Saturday, June 1, 2024");
        assert_eq!(parse_time("09:05:30"), NaiveTime::from_hms_opt(9, 5, 30));
        assert_eq!(parse_time("25:00"), None);
    }
}
