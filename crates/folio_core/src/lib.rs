//! Record core for the portfolio backend.
//! Owns field policy, ownership rules and persistence for portfolio entities.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status, LoggingError};
pub use model::base::Model;
pub use model::kind::{
    kind_by_name, OwnerRef, RecordKind, ALL_KINDS, AWARD, CAREER, CERTIFICATE, EDUCATION, PROJECT,
    TECH_STACK, USER,
};
pub use model::record::{Fields, Patch, Record, RecordId};
pub use service::portfolio_service::{Portfolio, PortfolioService};
pub use service::record_service::RecordService;
pub use service::registry::{ServiceRegistry, SqliteRecordService};
pub use service::search::SearchCriteria;
pub use service::{ServiceError, ServiceResult};
pub use store::{Filter, RecordStore, SqliteCollection, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
