use crate::config::ClientConfig;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time_shim::Instant;

/// Install the tracing subscriber. A second call is a no-op.
pub fn init_logging(config: &ClientConfig) {
    if dioxus::logger::init(config.log_level).is_err() {
        tracing::debug!("logger already initialised");
    }
}

pub fn perf_start() -> Instant {
    Instant::now()
}

#[inline]
pub fn log_perf(scope: &str, started_at: Instant, details: &str) {
    let elapsed_ms = started_at.elapsed().as_millis();
    if details.trim().is_empty() {
        tracing::debug!("[perf] {scope} took {elapsed_ms}ms");
    } else {
        tracing::debug!("[perf] {scope} took {elapsed_ms}ms | {details}");
    }
}

// `std::time::Instant` panics on wasm32-unknown-unknown.
#[cfg(target_arch = "wasm32")]
mod web_time_shim {
    #[derive(Clone, Copy)]
    pub struct Instant(f64);

    pub struct Elapsed(f64);

    impl Elapsed {
        pub fn as_millis(&self) -> u128 {
            self.0.max(0.0) as u128
        }
    }

    impl Instant {
        pub fn now() -> Self {
            Self(js_sys::Date::now())
        }

        pub fn elapsed(&self) -> Elapsed {
            Elapsed(js_sys::Date::now() - self.0)
        }
    }
}
