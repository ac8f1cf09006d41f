//! Generic entity repositories over SQLite.
//! Entities declare their fields once; repositories derive SQL from them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod naming;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RepoConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::entity::{table_attributes, Entity, EntityId, FieldDef, FieldKind};
pub use naming::to_snake_case;
pub use repo::generic_repo::{GenericRepository, RepoError, RepoResult, Repository, RowMapper};
pub use service::entity_service::EntityService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
