use log::{Level, LevelFilter, Log, Metadata, Record};

/// Routes `log` records to the browser console.
///
/// Call sites pass a component name as the target, e.g.
/// `log::warn!(target: "slot-calendar", "...")`.
pub struct Logger;

static LOGGER: Logger = Logger;

impl Logger {
    /// Installs the logger once; later calls only adjust the level
    pub fn init(level: LevelFilter) {
        if log::set_logger(&LOGGER).is_err() {
            log::debug!(target: "logging", "Logger already installed");
        }
        log::set_max_level(level);
    }

    fn format(record: &Record) -> String {
        format!("[{}] {}", record.target(), record.args())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format(record);
        match record.level() {
            Level::Error => gloo::console::error!(line),
            Level::Warn => gloo::console::warn!(line),
            Level::Info => gloo::console::info!(line),
            Level::Debug | Level::Trace => gloo::console::debug!(line),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_target_prefix() {
        let line = Logger::format(
            &Record::builder()
                .args(format_args!("Loaded 3 slots"))
                .target("slot-calendar")
                .level(Level::Info)
                .build(),
        );
        assert_eq!(line, "[slot-calendar] Loaded 3 slots");
    }

    #[wasm_bindgen_test]
    fn test_init_twice_keeps_last_level() {
        Logger::init(LevelFilter::Debug);
        Logger::init(LevelFilter::Warn);
        assert_eq!(log::max_level(), LevelFilter::Warn);
        assert!(!LOGGER.enabled(&Metadata::builder().level(Level::Info).build()));
    }
}
