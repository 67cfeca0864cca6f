use chrono::{DateTime, NaiveDate, Utc};
use js_sys::Date;

/// Current local date according to the browser
pub fn today() -> NaiveDate {
    let now = Date::new_0();
    let year = now.get_full_year() as i32;
    let month = now.get_month() + 1; // JavaScript months are 0-indexed
    let day = now.get_date();

    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| now_utc().date_naive())
}

pub fn now_utc() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Date::now() as i64).unwrap_or_default()
}

/// Parses the value of an `<input type="date">`
pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_today_matches_clock() {
        let utc_day = now_utc().date_naive();
        let diff = (today() - utc_day).num_days().abs();
        assert!(diff <= 1);
    }

    #[wasm_bindgen_test]
    fn test_parse_input_date() {
        assert_eq!(parse_input_date("2024-06-01"), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(parse_input_date(""), None);
        assert_eq!(parse_input_date("01/06/2024"), None);
    }
}
