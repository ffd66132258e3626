//! Logging facilities for Horizon Bind.
//!
//! Horizon Bind uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("horizon_bind=debug,horizon_bind_core=info"))
//!         .init();
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] below, so filter
//! directives can select a single subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_bind_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_bind_core::signal";
    /// Observable model target.
    pub const MODEL: &str = "horizon_bind_core::model";
    /// Element tree target.
    pub const DOM: &str = "horizon_bind_core::dom";
    /// Binder target (used by the `horizon-bind` crate).
    pub const BINDER: &str = "horizon_bind::binder";
}

#[cfg(test)]
mod tests {
    use super::targets;

    #[test]
    fn test_targets_share_crate_prefix() {
        for target in [targets::SIGNAL, targets::MODEL, targets::DOM] {
            assert!(target.starts_with(targets::CORE));
        }
        assert!(targets::BINDER.starts_with("horizon_bind::"));
    }
}
