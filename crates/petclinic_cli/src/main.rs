//! CLI entry point.
//!
//! # Responsibility
//! - Wire logging, storage and the pet editor together.
//! - Register one pet, rename it, and print each outcome.
//!
//! Configuration comes from `PETCLINIC_LOG_LEVEL`, `PETCLINIC_LOG_DIR` and
//! `PETCLINIC_DB`; unset values fall back to the build default level, a temp
//! log directory and an in-memory database.
//!
//! Buffered log lines are flushed before the process exits, whatever the
//! outcome.

use petclinic_core::db::{open_db, open_db_in_memory, DbError};
use petclinic_core::{
    cause_chain, default_log_level, flush_logging, init_logging, Pet, PetEditor, PetService,
    SaveOutcome, SqlitePetRepository,
};
use rusqlite::Connection;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let code = run();
    flush_logging();
    code
}

fn run() -> ExitCode {
    let level = env::var("PETCLINIC_LOG_LEVEL").unwrap_or_else(|_| default_log_level().to_string());
    let log_dir = env::var("PETCLINIC_LOG_DIR").unwrap_or_else(|_| {
        env::temp_dir()
            .join("petclinic-logs")
            .to_string_lossy()
            .into_owned()
    });
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("logging disabled: {err}");
    }

    let conn = match open_connection(env::var("PETCLINIC_DB").ok()) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!(
                "{err} ({}): {}; see logs in {log_dir}",
                err.code(),
                cause_chain(&err)
            );
            return ExitCode::FAILURE;
        }
    };
    let editor = PetEditor::new(PetService::new(SqlitePetRepository::new(&conn)));

    println!("petclinic_core version={}", petclinic_core::core_version());

    let mut draft = Pet::new(format!("CHIP-{}", std::process::id()), "Leo");
    draft.pet_type = Some("Cat".to_string());

    let created = match editor.save(&draft) {
        SaveOutcome::Committed(pet) => pet,
        SaveOutcome::Rejected => {
            eprintln!("could not register pet; see logs in {log_dir}");
            return ExitCode::FAILURE;
        }
    };
    println!("registered {created} version={}", created.version);

    let mut renamed = created;
    renamed.name = "Leonardo".to_string();
    match editor.save(&renamed) {
        SaveOutcome::Committed(pet) => {
            println!("updated {pet} version={}", pet.version);
            ExitCode::SUCCESS
        }
        SaveOutcome::Rejected => {
            eprintln!("could not update pet; see logs in {log_dir}");
            ExitCode::FAILURE
        }
    }
}

fn open_connection(path: Option<String>) -> Result<Connection, DbError> {
    match path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
}
