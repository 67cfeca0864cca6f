use shared::session::RefreshPolicy;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Settings fixed at build time
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub refresh: RefreshPolicy,
    pub search_debounce_ms: u32,
    pub admin_page_size: u32,
    pub expired_redirect_ms: u32,
    pub notice_ms: u32,
    pub log_level: log::LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh: RefreshPolicy::default(),
            search_debounce_ms: 500,
            admin_page_size: 10,
            expired_redirect_ms: 3000,
            notice_ms: 4000,
            log_level: if cfg!(debug_assertions) {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        }
    }
}

impl AppConfig {
    /// Reads `API_URL`, falling back to `NEXT_PUBLIC_API_URL`, as set when building
    pub fn from_build_env() -> Self {
        Self::with_api_url(option_env!("API_URL").or(option_env!("NEXT_PUBLIC_API_URL")))
    }

    pub fn with_api_url(api_url: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_default_timings() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.admin_page_size, 10);
        assert_eq!(config.expired_redirect_ms, 3000);
        assert_eq!(config.refresh.lead, Duration::from_secs(600));
        assert_eq!(config.refresh.fallback, Duration::from_secs(3600));
    }

    #[wasm_bindgen_test]
    fn test_api_url_override_is_trimmed() {
        let config = AppConfig::with_api_url(Some(" https://api.example.com/ "));
        assert_eq!(config.api_url, "https://api.example.com");

        let config = AppConfig::with_api_url(Some("  "));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
