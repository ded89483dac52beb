pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 300 simulation ticks when the `perf_stats` feature is enabled.
///
/// Without `perf_stats` this expands to an empty block and the arguments
/// are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(tick, "[PURSUIT] {} enemies updated", enemy_count);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 300 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
