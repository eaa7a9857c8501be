//! Utility implementations: in-memory review store, tracing setup

pub mod memory_store;

pub use memory_store::MemoryReviewStore;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env()
            .add_directive("splitledger_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}
