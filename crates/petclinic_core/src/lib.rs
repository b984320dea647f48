//! Core domain logic for the pet clinic.
//! Persists pets through a repository while keeping every failure inside the
//! service layer and every update traceable in the logs.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    cause_chain, default_log_level, flush_logging, init_logging, logging_status, LoggingConfig,
    ENTITY_ID_FIELD,
};
pub use model::pet::{Pet, PetId, PetValidationError};
pub use repo::pet_repo::{PetListQuery, PetRepository, RepoError, RepoResult, SqlitePetRepository};
pub use service::pet_editor::{PetEditor, SaveOutcome};
pub use service::pet_service::PetService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
