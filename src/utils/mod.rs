/// Logs at debug level only when debug is enabled, skipping argument
/// formatting on hot paths otherwise.
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
