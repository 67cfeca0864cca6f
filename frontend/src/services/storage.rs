//! Local storage keys and typed accessors.

use gloo::storage::{LocalStorage, Storage};
use shared::messages::Locale;

pub const TOKEN_KEY: &str = "token";
pub const DASHBOARD_TAB_KEY: &str = "adminDashboardActiveTab";
pub const LOCALE_KEY: &str = "locale";

/// The token is stored as a bare string, not JSON
pub fn load_token() -> Option<String> {
    load_raw(TOKEN_KEY).filter(|token| !token.trim().is_empty())
}

pub fn save_token(token: &str) {
    save_raw(TOKEN_KEY, token);
}

pub fn clear_token() {
    LocalStorage::delete(TOKEN_KEY);
}

pub fn load_locale() -> Locale {
    load_raw(LOCALE_KEY)
        .and_then(|code| Locale::from_code(&code))
        .unwrap_or_default()
}

pub fn save_locale(locale: Locale) {
    save_raw(LOCALE_KEY, locale.code());
}

pub fn load_raw(key: &str) -> Option<String> {
    LocalStorage::raw().get_item(key).ok().flatten()
}

pub fn save_raw(key: &str, value: &str) {
    if LocalStorage::raw().set_item(key, value).is_err() {
        log::warn!(target: "storage", "Could not write {} to local storage", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_token_round_trip_and_clear() {
        save_token("abc.def.ghi");
        assert_eq!(load_token().as_deref(), Some("abc.def.ghi"));

        clear_token();
        assert_eq!(load_token(), None);

        save_token("   ");
        assert_eq!(load_token(), None);
    }

    #[wasm_bindgen_test]
    fn test_locale_defaults_to_english() {
        save_raw(LOCALE_KEY, "klingon");
        assert_eq!(load_locale(), Locale::En);

        save_locale(Locale::Es);
        assert_eq!(load_raw(LOCALE_KEY).as_deref(), Some("es"));
        assert_eq!(load_locale(), Locale::Es);
    }
}
