//! Access token lifecycle as an explicit state machine.
//!
//! ```text
//! Unauthenticated ──LoggedIn──▶ Authenticated ──RefreshStarted──▶ Refreshing
//!        ▲                          ▲                                │
//!        │                          └────────Refreshed───────────────┤
//!        └───────LoggedOut / Expired / RefreshFailed (expired)───────┘
//! ```
//!
//! The machine performs no I/O. Every transition returns the effects the
//! caller must carry out (persist the token, arm the single refresh timer,
//! call the refresh endpoint).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is not a three part JWT")]
    Malformed,
    #[error("Token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("Token payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Guardian,
}

impl Role {
    fn from_claim(raw: &str) -> Option<Self> {
        match raw.trim().trim_start_matches("ROLE_").to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "USER" | "GUARDIAN" | "TUTOR" | "PARENT" => Some(Role::Guardian),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum RoleClaim {
    One(String),
    Many(Vec<String>),
    #[default]
    Missing,
}

/// Claims read from the JWT payload. The signature is never checked here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    /// Seconds since the epoch
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    role: RoleClaim,
    #[serde(default)]
    roles: RoleClaim,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Admin wins when several roles are present
    pub fn role(&self) -> Option<Role> {
        let mut roles = Vec::new();
        for claim in [&self.role, &self.roles] {
            match claim {
                RoleClaim::One(raw) => roles.extend(Role::from_claim(raw)),
                RoleClaim::Many(raws) => {
                    roles.extend(raws.iter().filter_map(|r| Role::from_claim(r)))
                }
                RoleClaim::Missing => {}
            }
        }
        if roles.contains(&Role::Admin) {
            Some(Role::Admin)
        } else {
            roles.first().copied()
        }
    }
}

pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(TokenError::Malformed),
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// When the proactive refresh fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// How long before expiry to refresh
    pub lead: Duration,
    /// Lower bound for the delay
    pub minimum: Duration,
    /// Delay used when the expiry is unknown
    pub fallback: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            lead: Duration::from_secs(10 * 60),
            minimum: Duration::from_secs(5 * 60),
            fallback: Duration::from_secs(60 * 60),
        }
    }
}

impl RefreshPolicy {
    /// `max(expiry - now - lead, minimum)`, or `fallback` without an expiry
    pub fn delay_until_refresh(
        &self,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Duration {
        let Some(expires_at) = expires_at else {
            return self.fallback;
        };
        let remaining = (expires_at - now).to_std().unwrap_or(Duration::ZERO);
        remaining.saturating_sub(self.lead).max(self.minimum)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub role: Option<Role>,
}

impl Session {
    /// Undecodable tokens are kept as opaque bearer strings
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                log::debug!("Could not decode token claims: {}", e);
                TokenClaims::default()
            }
        };
        Self {
            expires_at: claims.expires_at(),
            role: claims.role(),
            token,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
    /// A refresh call is in flight; `current` stays usable meanwhile
    Refreshing { current: Option<Session> },
}

impl SessionState {
    /// The usable session, kept through a refresh
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Refreshing { current } => current.as_ref(),
            SessionState::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Startup, with whatever token local storage held
    Restored(Option<String>),
    /// The refresh timer fired
    RefreshStarted,
    Refreshed(String),
    RefreshFailed,
    LoggedIn(String),
    LoggedOut,
    /// The backend answered 401
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    Persist(String),
    Clear,
    /// Replace the refresh timer with one firing after the delay
    Schedule(Duration),
    CancelTimer,
    /// Call the refresh endpoint and report back with `Refreshed` or `RefreshFailed`
    RefreshNow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMachine {
    state: SessionState,
    policy: RefreshPolicy,
}

impl SessionMachine {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            policy,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|session| session.token.as_str())
    }

    /// Applies `event` and returns the effects to run, in order
    pub fn handle(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Vec<SessionEffect> {
        let state = std::mem::replace(&mut self.state, SessionState::Unauthenticated);
        let (next, effects) = self.transition(state, event, now);
        self.state = next;
        effects
    }

    fn transition(
        &self,
        state: SessionState,
        event: SessionEvent,
        now: DateTime<Utc>,
    ) -> (SessionState, Vec<SessionEffect>) {
        match (state, event) {
            (_, SessionEvent::Restored(token)) => {
                let current = token
                    .filter(|token| !token.trim().is_empty())
                    .map(Session::from_token)
                    .filter(|session| !session.is_expired(now));
                (
                    SessionState::Refreshing { current },
                    vec![SessionEffect::CancelTimer, SessionEffect::RefreshNow],
                )
            }
            (_, SessionEvent::LoggedIn(token))
            | (SessionState::Refreshing { .. }, SessionEvent::Refreshed(token)) => {
                self.authenticate(token, now)
            }
            (SessionState::Authenticated(session), SessionEvent::RefreshStarted) => (
                SessionState::Refreshing {
                    current: Some(session),
                },
                vec![SessionEffect::RefreshNow],
            ),
            (SessionState::Refreshing { current }, SessionEvent::RefreshFailed) => match current {
                Some(session) if !session.is_expired(now) => {
                    let delay = self.policy.delay_until_refresh(session.expires_at, now);
                    (
                        SessionState::Authenticated(session),
                        vec![SessionEffect::Schedule(delay)],
                    )
                }
                _ => (
                    SessionState::Unauthenticated,
                    vec![SessionEffect::CancelTimer, SessionEffect::Clear],
                ),
            },
            (_, SessionEvent::LoggedOut) | (_, SessionEvent::Expired) => (
                SessionState::Unauthenticated,
                vec![SessionEffect::CancelTimer, SessionEffect::Clear],
            ),
            (state, event) => {
                log::debug!("Ignoring {:?} while {:?}", event, state);
                (state, Vec::new())
            }
        }
    }

    fn authenticate(
        &self,
        token: String,
        now: DateTime<Utc>,
    ) -> (SessionState, Vec<SessionEffect>) {
        let session = Session::from_token(token);
        let delay = self.policy.delay_until_refresh(session.expires_at, now);
        let persist = SessionEffect::Persist(session.token.clone());
        (
            SessionState::Authenticated(session),
            vec![persist, SessionEffect::Schedule(delay)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    const NOW: i64 = 1_717_228_800;

    #[test]
    fn test_decode_claims() {
        let token = jwt(r#"{"sub":"laura@example.com","exp":1717232400,"role":"ROLE_ADMIN"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.expires_at(), Some(at(1_717_232_400)));
        assert_eq!(claims.role(), Some(Role::Admin));
        assert_eq!(claims.sub.as_deref(), Some("laura@example.com"));

        let token = jwt(r#"{"exp":1717232400,"roles":["USER","ADMIN"]}"#);
        assert_eq!(decode_claims(&token).unwrap().role(), Some(Role::Admin));

        let token = jwt(r#"{"roles":["USER"]}"#);
        assert_eq!(decode_claims(&token).unwrap().role(), Some(Role::Guardian));
        assert_eq!(decode_claims(&token).unwrap().expires_at(), None);

        assert!(matches!(decode_claims("not-a-jwt"), Err(TokenError::Malformed)));
        assert!(matches!(decode_claims("a.%%%.c"), Err(TokenError::Encoding(_))));
        assert!(decode_claims(&jwt("not json")).is_err());
    }

    #[test]
    fn test_refresh_delay() {
        let policy = RefreshPolicy::default();
        let now = at(NOW);

        // One hour left: refresh after 50 minutes
        let delay = policy.delay_until_refresh(Some(at(NOW + 3600)), now);
        assert_eq!(delay, Duration::from_secs(50 * 60));

        // Twelve minutes left: the floor applies
        let delay = policy.delay_until_refresh(Some(at(NOW + 12 * 60)), now);
        assert_eq!(delay, Duration::from_secs(5 * 60));

        // Already expired
        let delay = policy.delay_until_refresh(Some(at(NOW - 60)), now);
        assert_eq!(delay, Duration::from_secs(5 * 60));

        assert_eq!(policy.delay_until_refresh(None, now), Duration::from_secs(3600));
    }

    #[test]
    fn test_startup_then_refresh_success() {
        let mut machine = SessionMachine::new(RefreshPolicy::default());
        let now = at(NOW);
        let stored = jwt(&format!(r#"{{"exp":{}}}"#, NOW + 600));

        let effects = machine.handle(SessionEvent::Restored(Some(stored.clone())), now);
        assert_eq!(effects, vec![SessionEffect::CancelTimer, SessionEffect::RefreshNow]);
        assert!(matches!(machine.state(), SessionState::Refreshing { .. }));
        assert_eq!(machine.token(), Some(stored.as_str()));

        let fresh = jwt(&format!(r#"{{"exp":{}}}"#, NOW + 3600));
        let effects = machine.handle(SessionEvent::Refreshed(fresh.clone()), now);
        assert_eq!(
            effects,
            vec![
                SessionEffect::Persist(fresh.clone()),
                SessionEffect::Schedule(Duration::from_secs(50 * 60)),
            ]
        );
        assert_eq!(machine.token(), Some(fresh.as_str()));
    }

    #[test]
    fn test_expired_stored_token_is_not_used() {
        let mut machine = SessionMachine::new(RefreshPolicy::default());
        let stale = jwt(&format!(r#"{{"exp":{}}}"#, NOW - 10));
        machine.handle(SessionEvent::Restored(Some(stale)), at(NOW));
        assert_eq!(machine.token(), None);

        let effects = machine.handle(SessionEvent::RefreshFailed, at(NOW));
        assert_eq!(effects, vec![SessionEffect::CancelTimer, SessionEffect::Clear]);
        assert_eq!(machine.state(), &SessionState::Unauthenticated);
    }

    #[test]
    fn test_failed_refresh_keeps_valid_session() {
        let mut machine = SessionMachine::new(RefreshPolicy::default());
        let token = jwt(&format!(r#"{{"exp":{}}}"#, NOW + 3600));
        machine.handle(SessionEvent::LoggedIn(token.clone()), at(NOW));

        let effects = machine.handle(SessionEvent::RefreshStarted, at(NOW + 3000));
        assert_eq!(effects, vec![SessionEffect::RefreshNow]);

        let effects = machine.handle(SessionEvent::RefreshFailed, at(NOW + 3000));
        assert_eq!(effects, vec![SessionEffect::Schedule(Duration::from_secs(5 * 60))]);
        assert_eq!(machine.token(), Some(token.as_str()));
    }

    #[test]
    fn test_opaque_token_uses_fallback_schedule() {
        let mut machine = SessionMachine::new(RefreshPolicy::default());
        let effects = machine.handle(SessionEvent::LoggedIn("opaque".to_string()), at(NOW));
        assert_eq!(
            effects,
            vec![
                SessionEffect::Persist("opaque".to_string()),
                SessionEffect::Schedule(Duration::from_secs(3600)),
            ]
        );
    }

    #[test]
    fn test_logout_and_expiry_clear_everything() {
        for event in [SessionEvent::LoggedOut, SessionEvent::Expired] {
            let mut machine = SessionMachine::new(RefreshPolicy::default());
            machine.handle(SessionEvent::LoggedIn("opaque".to_string()), at(NOW));
            let effects = machine.handle(event, at(NOW));
            assert_eq!(effects, vec![SessionEffect::CancelTimer, SessionEffect::Clear]);
            assert_eq!(machine.token(), None);
        }
    }

    #[test]
    fn test_out_of_order_events_are_ignored() {
        let mut machine = SessionMachine::new(RefreshPolicy::default());
        assert!(machine.handle(SessionEvent::RefreshStarted, at(NOW)).is_empty());
        assert!(machine
            .handle(SessionEvent::Refreshed("late".to_string()), at(NOW))
            .is_empty());
        assert_eq!(machine.state(), &SessionState::Unauthenticated);

        machine.handle(SessionEvent::LoggedIn("opaque".to_string()), at(NOW));
        machine.handle(SessionEvent::RefreshStarted, at(NOW));
        // A second timer tick while refreshing does not start another call
        assert!(machine.handle(SessionEvent::RefreshStarted, at(NOW)).is_empty());
    }
}
