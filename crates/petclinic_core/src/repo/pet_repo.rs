//! Pet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the `save` collaborator consumed by `PetService`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Pet::validate()` before SQL mutations.
//! - `save` returns the read-back row, never the caller's input.
//! - `version` increments by exactly one per successful save.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::pet::{Pet, PetId, PetValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PET_SELECT_SQL: &str = "SELECT
    uuid,
    identification_number,
    name,
    birth_date,
    pet_type,
    owner,
    version
FROM pets";

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PetValidationError),
    Db(DbError),
    NotFound(PetId),
    /// The stored row moved past the version the caller edited.
    Conflict {
        id: PetId,
        expected_version: i64,
    },
    InvalidData(String),
    /// Failure raised by a non-SQLite storage backend.
    Backend(Box<dyn Error + Send + Sync + 'static>),
}

impl RepoError {
    /// Stable label written into `error_kind=` log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Db(_) => "db",
            Self::NotFound(_) => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::InvalidData(_) => "invalid_data",
            Self::Backend(_) => "backend",
        }
    }

    /// Wraps any backend error.
    pub fn backend(err: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self::Backend(err.into())
    }
}

// Wrapped errors are reachable through `source()`, not repeated here.
impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(_) => write!(f, "invalid pet"),
            Self::Db(_) => write!(f, "database error"),
            Self::NotFound(id) => write!(f, "pet not found: {id}"),
            Self::Conflict {
                id,
                expected_version,
            } => write!(
                f,
                "pet {id} was modified concurrently; expected version {expected_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::Backend(_) => write!(f, "storage backend failure"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Backend(err) => Some(&**err),
            Self::NotFound(_) | Self::Conflict { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<PetValidationError> for RepoError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing pets.
#[derive(Debug, Clone, Default)]
pub struct PetListQuery {
    /// Exact owner match.
    pub owner: Option<String>,
    /// Defaults to 50, capped at 500.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Storage contract for pets.
pub trait PetRepository {
    /// Inserts a new pet (`version == 0`) or updates an existing one.
    ///
    /// Returns the persisted form with generated fields populated.
    fn save(&self, pet: &Pet) -> RepoResult<Pet>;
    fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>>;
    fn find_by_identification_number(&self, identification_number: &str)
        -> RepoResult<Option<Pet>>;
    fn list_pets(&self, query: &PetListQuery) -> RepoResult<Vec<Pet>>;
}

impl<R: PetRepository + ?Sized> PetRepository for &R {
    fn save(&self, pet: &Pet) -> RepoResult<Pet> {
        (**self).save(pet)
    }

    fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>> {
        (**self).get_pet(id)
    }

    fn find_by_identification_number(
        &self,
        identification_number: &str,
    ) -> RepoResult<Option<Pet>> {
        (**self).find_by_identification_number(identification_number)
    }

    fn list_pets(&self, query: &PetListQuery) -> RepoResult<Vec<Pet>> {
        (**self).list_pets(query)
    }
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePetRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, pet: &Pet) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO pets (
                uuid,
                identification_number,
                name,
                birth_date,
                pet_type,
                owner,
                version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1);",
            params![
                pet.id.to_string(),
                pet.identification_number.as_str(),
                pet.name.as_str(),
                pet.birth_date,
                pet.pet_type.as_deref(),
                pet.owner.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn update(&self, pet: &Pet) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE pets
             SET
                identification_number = ?1,
                name = ?2,
                birth_date = ?3,
                pet_type = ?4,
                owner = ?5,
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6 AND version = ?7;",
            params![
                pet.identification_number.as_str(),
                pet.name.as_str(),
                pet.birth_date,
                pet.pet_type.as_deref(),
                pet.owner.as_deref(),
                pet.id.to_string(),
                pet.version,
            ],
        )?;

        if changed == 0 {
            let exists = self
                .conn
                .query_row(
                    "SELECT 1 FROM pets WHERE uuid = ?1;",
                    [pet.id.to_string()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            return Err(if exists {
                RepoError::Conflict {
                    id: pet.id,
                    expected_version: pet.version,
                }
            } else {
                RepoError::NotFound(pet.id)
            });
        }

        Ok(())
    }

    fn query_one(&self, filter: &str, value: String) -> RepoResult<Option<Pet>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PET_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_pet_row(row)?)),
            None => Ok(None),
        }
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn save(&self, pet: &Pet) -> RepoResult<Pet> {
        pet.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        if pet.is_new() {
            self.insert(pet)?;
        } else {
            self.update(pet)?;
        }
        let saved = self.get_pet(pet.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("pet {} vanished after save", pet.id))
        })?;
        tx.commit()?;

        Ok(saved)
    }

    fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>> {
        self.query_one("uuid", id.to_string())
    }

    fn find_by_identification_number(
        &self,
        identification_number: &str,
    ) -> RepoResult<Option<Pet>> {
        self.query_one("identification_number", identification_number.to_string())
    }

    fn list_pets(&self, query: &PetListQuery) -> RepoResult<Vec<Pet>> {
        let mut sql = format!("{PET_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = &query.owner {
            sql.push_str(" AND owner = ?");
            bind_values.push(Value::Text(owner.clone()));
        }

        sql.push_str(" ORDER BY name ASC, uuid ASC LIMIT ? OFFSET ?");
        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut pets = Vec::new();
        while let Some(row) = rows.next()? {
            pets.push(parse_pet_row(row)?);
        }

        Ok(pets)
    }
}

fn parse_pet_row(row: &Row<'_>) -> RepoResult<Pet> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in pets.uuid"))
    })?;

    let version: i64 = row.get("version")?;
    if version < 1 {
        return Err(RepoError::InvalidData(format!(
            "invalid version `{version}` in pets.version"
        )));
    }

    let pet = Pet {
        id,
        identification_number: row.get("identification_number")?,
        name: row.get("name")?,
        birth_date: row.get("birth_date")?,
        pet_type: row.get("pet_type")?,
        owner: row.get("owner")?,
        version,
    };
    pet.validate()?;
    Ok(pet)
}
