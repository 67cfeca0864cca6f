//! User-facing texts for backend errors, in English and Spanish.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Español",
        }
    }
}

struct Translation {
    backend: &'static str,
    en: &'static str,
    es: &'static str,
}

impl Translation {
    fn text(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en,
            Locale::Es => self.es,
        }
    }
}

const fn t(backend: &'static str, en: &'static str, es: &'static str) -> Translation {
    Translation { backend, en, es }
}

/// Known backend messages. Entries also match messages that start with them,
/// e.g. "Slot not found with id 7".
const BACKEND_MESSAGES: &[Translation] = &[
    t("Invalid credentials", "Wrong email or password.", "Correo o contraseña incorrectos."),
    t("Bad credentials", "Wrong email or password.", "Correo o contraseña incorrectos."),
    t(
        "User not found",
        "No account exists for that email.",
        "No existe una cuenta con ese correo.",
    ),
    t(
        "Email already in use",
        "That email is already registered.",
        "Ese correo ya está registrado.",
    ),
    t(
        "Invalid or expired token",
        "The link has expired. Request a new one.",
        "El enlace ha caducado. Solicita uno nuevo.",
    ),
    t(
        "Refresh token",
        "Your session has expired. Please sign in again.",
        "Tu sesión ha caducado. Vuelve a iniciar sesión.",
    ),
    t("Slot not found", "That time slot no longer exists.", "Ese horario ya no existe."),
    t("Slot is full", "That time slot is already full.", "Ese horario ya está completo."),
    t("No available spots", "That time slot is already full.", "Ese horario ya está completo."),
    t(
        "Slot is closed",
        "That time slot is closed for bookings.",
        "Ese horario está cerrado a reservas.",
    ),
    t(
        "Slot has bookings",
        "The slot has bookings and cannot be removed.",
        "El horario tiene reservas y no se puede eliminar.",
    ),
    t("Booking not found", "That booking no longer exists.", "Esa reserva ya no existe."),
    t(
        "Booking already exists",
        "You already have a booking for that day.",
        "Ya tienes una reserva para ese día.",
    ),
    t(
        "You already have a booking",
        "You already have a booking for that day.",
        "Ya tienes una reserva para ese día.",
    ),
    t(
        "Invalid status transition",
        "That status change is not allowed.",
        "Ese cambio de estado no está permitido.",
    ),
    t(
        "Cannot delete a closed booking",
        "Closed bookings cannot be deleted.",
        "Las reservas cerradas no se pueden eliminar.",
    ),
    t(
        "Child not found",
        "That child record no longer exists.",
        "Ese registro de niño ya no existe.",
    ),
    t(
        "Child has active bookings",
        "The child has active bookings.",
        "El niño tiene reservas activas.",
    ),
    t("Access denied", "You do not have permission for that.", "No tienes permiso para hacer eso."),
    t("Forbidden", "You do not have permission for that.", "No tienes permiso para hacer eso."),
];

/// Looks up a backend message: exact match first, then the longest known
/// prefix. Comparison ignores case and surrounding whitespace.
pub fn translate_backend(message: &str, locale: Locale) -> Option<&'static str> {
    let needle = message.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(exact) = BACKEND_MESSAGES
        .iter()
        .find(|entry| entry.backend.to_lowercase() == needle)
    {
        return Some(exact.text(locale));
    }

    BACKEND_MESSAGES
        .iter()
        .filter(|entry| needle.starts_with(&entry.backend.to_lowercase()))
        .max_by_key(|entry| entry.backend.len())
        .map(|entry| entry.text(locale))
}

pub fn generic_error(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Something went wrong. Please try again.",
        Locale::Es => "Algo salió mal. Inténtalo de nuevo.",
    }
}

pub fn network_error(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Could not reach the server. Check your connection.",
        Locale::Es => "No se pudo contactar con el servidor. Revisa tu conexión.",
    }
}

pub fn session_expired(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Your session has expired. Returning to the home page...",
        Locale::Es => "Tu sesión ha caducado. Volviendo a la página de inicio...",
    }
}

/// Text shown for a rejected request. Unknown messages are shown as sent,
/// a missing one falls back to the generic text.
pub fn user_facing(message: Option<&str>, locale: Locale) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => translate_backend(message, locale)
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string()),
        None => generic_error(locale).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_wins() {
        assert_eq!(
            translate_backend("Slot is full", Locale::Es),
            Some("Ese horario ya está completo.")
        );
        assert_eq!(
            translate_backend("  invalid CREDENTIALS ", Locale::En),
            Some("Wrong email or password.")
        );
    }

    #[test]
    fn test_longest_prefix_match() {
        assert_eq!(
            translate_backend("Slot not found with id 7", Locale::En),
            Some("That time slot no longer exists.")
        );
        assert_eq!(
            translate_backend("You already have a booking on 2024-06-03", Locale::Es),
            Some("Ya tienes una reserva para ese día.")
        );
        assert_eq!(translate_backend("Slot", Locale::En), None);
    }

    #[test]
    fn test_user_facing_fallbacks() {
        assert_eq!(user_facing(Some("Unexpected thing"), Locale::En), "Unexpected thing");
        assert_eq!(user_facing(Some("   "), Locale::En), generic_error(Locale::En));
        assert_eq!(user_facing(None, Locale::Es), generic_error(Locale::Es));
        assert_eq!(
            user_facing(Some("Booking not found: 12"), Locale::En),
            "That booking no longer exists."
        );
    }

    #[test]
    fn test_locale_codes() {
        for locale in Locale::ALL {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
        assert_eq!(Locale::from_code("ES"), Some(Locale::Es));
        assert_eq!(Locale::from_code("fr"), None);
        assert_eq!(Locale::default(), Locale::En);
    }
}
