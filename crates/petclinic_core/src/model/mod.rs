//! Domain model for the pet clinic records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every pet is identified by a stable `PetId`.
//! - Persistence state is tracked by `Pet::version`, not by the caller.

pub mod pet;
