//! Save entry point for pet detail screens.
//!
//! Chooses between create and update from the pet's persistence state and
//! turns the service result into a commit/reject decision. Failure detail
//! is never surfaced here; it already lives in the logs.

use crate::model::pet::Pet;
use crate::repo::pet_repo::PetRepository;
use crate::service::pet_service::PetService;
use tracing::debug;

/// Result of one editor save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored copy returned by the repository.
    Committed(Pet),
    /// Nothing was saved; show a generic failure.
    Rejected,
}

impl SaveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn into_saved(self) -> Option<Pet> {
        match self {
            Self::Committed(pet) => Some(pet),
            Self::Rejected => None,
        }
    }
}

impl From<Option<Pet>> for SaveOutcome {
    fn from(value: Option<Pet>) -> Self {
        value.map_or(Self::Rejected, Self::Committed)
    }
}

pub struct PetEditor<R: PetRepository> {
    service: PetService<R>,
}

impl<R: PetRepository> PetEditor<R> {
    pub fn new(service: PetService<R>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &PetService<R> {
        &self.service
    }

    /// Saves the edited pet: create when never persisted, update otherwise.
    pub fn save(&self, pet: &Pet) -> SaveOutcome {
        if pet.is_new() {
            debug!("event=pet_editor_save module=service mode=create");
            self.service.save_pet(pet).into()
        } else {
            debug!("event=pet_editor_save module=service mode=update");
            self.service.update_pet(pet).into()
        }
    }
}
