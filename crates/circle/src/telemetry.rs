use tracing_subscriber::EnvFilter;

/// The environment variable that overrides the default log filter, in place
/// of `RUST_LOG`. Kept distinct so a process embedding `circle` alongside
/// other `tracing` consumers can filter this crate independently.
pub const CIRCLE_LOG_ENV: &str = "CIRCLE_LOG";

/// Installs a global `tracing_subscriber` with a filter read from
/// `CIRCLE_LOG`, defaulting to `info`. Idempotent: a second call is a no-op
/// rather than a panic, so tests that each spin up their own ensemble can
/// call this freely.
///
/// The historical five-level taxonomy (`FATAL, ERR, WARN, INFO, DBG`) maps
/// onto `tracing::Level` as `ERROR` (FATAL and ERR both — see
/// [`log_fatal!`](crate::log_fatal)), `WARN`, `INFO`, `DEBUG`.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(CIRCLE_LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// Logs a fatal-class error: an `ERROR`-level event carrying an explicit
/// `fatal = true` field, distinguishing it from an ordinary `ERR`-class
/// [`tracing::error!`] at the same `tracing::Level`.
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {
        tracing::error!(fatal = true, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
