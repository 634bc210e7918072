//! Feature-gated console logging.
//!
//! With `esp32-log` enabled messages go to `esp-println`; without it the
//! arguments are still type-checked but nothing is emitted.

macro_rules! log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32-log")]
        esp_println::println!($($arg)*);
        #[cfg(not(feature = "esp32-log"))]
        {
            let _ = core::format_args!($($arg)*);
        }
    }};
}

pub(crate) use log;
