//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details and storage errors.

pub mod pet_editor;
pub mod pet_service;
