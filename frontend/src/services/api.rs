use chrono::NaiveDate;
use gloo::net::http::{Method, Request, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::messages::{self, Locale};
use shared::{
    ApiErrorBody, Booking, BookingDomain, BookingId, BookingRequest, BookingStatus, Child,
    ChildId, ChildNote, ChildNoteRequest, ChildRequest, ForgotPasswordRequest, LoginRequest,
    MessageResponse, ResetPasswordRequest, Slot, SlotId, SlotRequest, StatusChangeRequest,
    TokenResponse, TutorPage,
};
use thiserror::Error;
use web_sys::RequestCredentials;
use yew::Callback;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Session expired")]
    Unauthorized,
    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Failed to parse response: {0}")]
    Decode(String),
    #[error("Failed to serialize request: {0}")]
    Encode(String),
}

impl ApiError {
    /// Text for the notice banner
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            ApiError::Network(_) => messages::network_error(locale).to_string(),
            ApiError::Unauthorized => messages::session_expired(locale).to_string(),
            ApiError::Rejected { message, .. } => messages::user_facing(message.as_deref(), locale),
            ApiError::Decode(_) | ApiError::Encode(_) => {
                messages::generic_error(locale).to_string()
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Maps a non-2xx answer to an error. A 401 only means an expired session
/// when a token was sent; otherwise it is a plain rejection such as bad
/// credentials on login.
fn failure(status: u16, sent_token: bool, body: &str) -> ApiError {
    if status == 401 && sent_token {
        return ApiError::Unauthorized;
    }

    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.text().map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        });
    ApiError::Rejected { status, message }
}

/// API client for communicating with the backend server
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    on_unauthorized: Option<Callback<()>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            on_unauthorized: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Called whenever the backend answers 401
    pub fn with_unauthorized_handler(mut self, handler: Callback<()>) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = RequestBuilder::new(&self.url(path))
            .method(method)
            .credentials(RequestCredentials::Include);
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    fn with_body<B: Serialize>(builder: RequestBuilder, body: &B) -> Result<Request, ApiError> {
        builder.json(body).map_err(|e| ApiError::Encode(e.to_string()))
    }

    fn without_body(builder: RequestBuilder) -> Result<Request, ApiError> {
        builder.build().map_err(|e| ApiError::Encode(e.to_string()))
    }

    async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.ok() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = failure(status, self.token.is_some(), &body);
        match &error {
            ApiError::Unauthorized => {
                if let Some(handler) = &self.on_unauthorized {
                    handler.emit(());
                }
            }
            _ => log::warn!(target: "api", "{} {} rejected: {}", status, response.url(), error),
        }
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_empty(&self, request: Request) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch(Self::without_body(self.request(Method::GET, path))?).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.fetch(Self::with_body(self.request(method, path), body)?).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.fetch_empty(Self::without_body(self.request(Method::DELETE, path))?)
            .await
    }

    // Authentication

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.send_json(Method::POST, "/api/auth/login", request).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.fetch_empty(Self::without_body(self.request(Method::POST, "/api/auth/logout"))?)
            .await
    }

    /// Exchanges the refresh cookie for a new access token
    pub async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        self.fetch(Self::without_body(self.request(Method::POST, "/api/auth/refresh"))?)
            .await
    }

    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.send_json(Method::POST, "/api/auth/forgot-password", request).await
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.send_json(Method::POST, "/api/auth/reset-password", request).await
    }

    // Slots

    pub async fn get_slots(
        &self,
        domain: BookingDomain,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Slot>, ApiError> {
        self.get(&domain.slots_in_range_path(start, end)).await
    }

    pub async fn get_slots_for_day(
        &self,
        domain: BookingDomain,
        day: NaiveDate,
    ) -> Result<Vec<Slot>, ApiError> {
        self.get(&domain.slots_by_day_path(day)).await
    }

    pub async fn create_slot(
        &self,
        domain: BookingDomain,
        request: &SlotRequest,
    ) -> Result<Slot, ApiError> {
        self.send_json(Method::POST, domain.slots_path(), request).await
    }

    pub async fn update_slot(
        &self,
        domain: BookingDomain,
        id: SlotId,
        request: &SlotRequest,
    ) -> Result<Slot, ApiError> {
        self.send_json(Method::PUT, &domain.slot_path(id), request).await
    }

    pub async fn delete_slot(&self, domain: BookingDomain, id: SlotId) -> Result<(), ApiError> {
        self.delete(&domain.slot_path(id)).await
    }

    // Bookings

    pub async fn get_bookings(&self, domain: BookingDomain) -> Result<Vec<Booking>, ApiError> {
        self.get(domain.bookings_path()).await
    }

    /// Bookings visible to the caller on `day`; a guardian only sees their own
    pub async fn get_bookings_on_day(
        &self,
        domain: BookingDomain,
        day: NaiveDate,
    ) -> Result<Vec<Booking>, ApiError> {
        self.get(&domain.bookings_in_range_path(day, day)).await
    }

    pub async fn create_booking(
        &self,
        domain: BookingDomain,
        request: &BookingRequest,
    ) -> Result<Booking, ApiError> {
        self.send_json(Method::POST, domain.bookings_path(), request).await
    }

    pub async fn update_booking(
        &self,
        domain: BookingDomain,
        id: BookingId,
        request: &BookingRequest,
    ) -> Result<Booking, ApiError> {
        self.send_json(Method::PUT, &domain.booking_path(id), request).await
    }

    pub async fn change_booking_status(
        &self,
        domain: BookingDomain,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<(), ApiError> {
        let request = Self::with_body(
            self.request(Method::PUT, &domain.status_path(id)),
            &StatusChangeRequest { status },
        )?;
        self.fetch_empty(request).await
    }

    pub async fn delete_booking(
        &self,
        domain: BookingDomain,
        id: BookingId,
    ) -> Result<(), ApiError> {
        self.delete(&domain.booking_path(id)).await
    }

    // Children

    pub async fn get_children(&self) -> Result<Vec<Child>, ApiError> {
        self.get("/api/children").await
    }

    pub async fn create_child(&self, request: &ChildRequest) -> Result<Child, ApiError> {
        self.send_json(Method::POST, "/api/addChild", request).await
    }

    pub async fn update_child(
        &self,
        id: ChildId,
        request: &ChildRequest,
    ) -> Result<Child, ApiError> {
        self.send_json(Method::PUT, &format!("/api/updateChild/{}", id), request)
            .await
    }

    pub async fn delete_child(&self, id: ChildId) -> Result<(), ApiError> {
        self.delete(&format!("/api/deleteChild/{}", id)).await
    }

    pub async fn get_child_notes(&self, child_id: ChildId) -> Result<Vec<ChildNote>, ApiError> {
        self.get(&format!("/api/childNote/{}", child_id)).await
    }

    pub async fn create_child_note(
        &self,
        request: &ChildNoteRequest,
    ) -> Result<ChildNote, ApiError> {
        self.send_json(Method::POST, "/api/childNote", request).await
    }

    // Tutors

    pub async fn get_tutors(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<TutorPage, ApiError> {
        let path = format!(
            "/api/admin/tutors?page={}&limit={}&search={}",
            page,
            limit,
            String::from(js_sys::encode_uri_component(search.trim()))
        );
        self.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_rejected_message_is_translated() {
        let error = ApiError::Rejected {
            status: 409,
            message: Some("Slot is full".to_string()),
        };
        assert_eq!(error.user_message(Locale::En), "That time slot is already full.");
        assert_eq!(error.user_message(Locale::Es), "Ese horario ya está completo.");
    }

    #[wasm_bindgen_test]
    fn test_unknown_and_missing_messages() {
        let raw = ApiError::Rejected {
            status: 400,
            message: Some("Weird backend text".to_string()),
        };
        assert_eq!(raw.user_message(Locale::En), "Weird backend text");

        let empty = ApiError::Rejected { status: 500, message: None };
        assert_eq!(empty.user_message(Locale::En), messages::generic_error(Locale::En));
        assert_eq!(empty.to_string(), "Server error 500: no message");
    }

    #[wasm_bindgen_test]
    fn test_transport_errors_use_fixed_texts() {
        assert_eq!(
            ApiError::Network("offline".into()).user_message(Locale::Es),
            messages::network_error(Locale::Es)
        );
        assert_eq!(
            ApiError::Decode("eof".into()).user_message(Locale::En),
            messages::generic_error(Locale::En)
        );
        assert!(ApiError::Unauthorized.is_unauthorized());
    }

    #[wasm_bindgen_test]
    fn test_login_401_keeps_backend_message() {
        let error = failure(401, false, r#"{"message":"Invalid credentials"}"#);
        assert_eq!(
            error,
            ApiError::Rejected {
                status: 401,
                message: Some("Invalid credentials".to_string()),
            }
        );
        assert!(!error.is_unauthorized());
        assert_eq!(error.user_message(Locale::En), "Wrong email or password.");
    }

    #[wasm_bindgen_test]
    fn test_401_with_token_expires_session() {
        assert_eq!(
            failure(401, true, r#"{"message":"Token expired"}"#),
            ApiError::Unauthorized
        );
        assert_eq!(
            failure(403, true, "Forbidden"),
            ApiError::Rejected {
                status: 403,
                message: Some("Forbidden".to_string()),
            }
        );
        assert_eq!(
            failure(500, false, "{}"),
            ApiError::Rejected { status: 500, message: None }
        );
    }

    #[wasm_bindgen_test]
    fn test_urls_join_base_and_path() {
        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(
            client.url(&BookingDomain::Visit.status_path(4)),
            "http://localhost:8080/api/meetingBookings/status/4"
        );
    }
}
