//! Pet persistence service.
//!
//! # Responsibility
//! - Wrap repository saves with structured `pet_save`/`pet_update` events.
//! - Contain every repository failure: log it with its full cause chain and
//!   hand `None` back to the caller.
//!
//! # Invariants
//! - `Some` is returned only when the repository returned `Ok`, and it
//!   carries the repository's value, not the caller's input.
//! - `update_pet` runs inside a `pet_update{entityId=..}` span, so every event
//!   it (or the repository) emits carries the pet's identification number.
//!   The span is exited on every exit path, panics included.
//! - Errors never cross this boundary.

use crate::logging::cause_chain;
use crate::model::pet::Pet;
use crate::repo::pet_repo::PetRepository;
use std::time::Instant;
use tracing::{error, info, info_span};

/// Logging, failure-containing facade over a `PetRepository`.
pub struct PetService<R: PetRepository> {
    repo: R,
}

impl<R: PetRepository> PetService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access for callers that also need queries.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Persists a pet the caller considers new.
    ///
    /// Newness is not checked here. Returns the stored copy, or `None` when
    /// the repository failed (the cause is in the `error` event).
    pub fn save_pet(&self, pet: &Pet) -> Option<Pet> {
        let started_at = Instant::now();
        match self.repo.save(pet) {
            Ok(saved) => {
                info!(
                    "event=pet_save module=service status=ok duration_ms={} pet={pet}",
                    started_at.elapsed().as_millis()
                );
                Some(saved)
            }
            Err(err) => {
                error!(
                    "event=pet_save module=service status=error duration_ms={} pet={pet} error_kind={} error={err} cause={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    cause_chain(&err)
                );
                None
            }
        }
    }

    /// Persists changes to a pet the caller considers already stored.
    ///
    /// Returns the stored copy, or `None` on repository failure.
    pub fn update_pet(&self, pet: &Pet) -> Option<Pet> {
        let _correlation = info_span!("pet_update", entityId = %pet.identification_number).entered();
        let started_at = Instant::now();

        info!("event=pet_update module=service status=start");

        match self.repo.save(pet) {
            Ok(updated) => {
                info!(
                    "event=pet_update module=service status=ok duration_ms={} version={}",
                    started_at.elapsed().as_millis(),
                    updated.version
                );
                Some(updated)
            }
            Err(err) => {
                error!(
                    "event=pet_update module=service status=error duration_ms={} error_kind={} error={err} cause={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    cause_chain(&err)
                );
                None
            }
        }
    }
}
