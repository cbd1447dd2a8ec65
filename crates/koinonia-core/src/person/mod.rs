//! People management.

pub mod model;

use crate::error::{KoinoniaError, KoinoniaResult};
use koinonia_db::queries::people as queries;
use koinonia_db::{DbError, DbPool};
use model::Person;
use uuid::Uuid;

/// Create a new person. Defaults to `visitor` membership.
pub fn create_person(
    pool: &DbPool,
    tenant_id: &str,
    full_name: &str,
    phone: Option<&str>,
    neighborhood: Option<&str>,
    birth_date: Option<&str>,
    gender: Option<&str>,
) -> KoinoniaResult<Person> {
    if full_name.trim().is_empty() {
        return Err(KoinoniaError::validation("full_name is required"));
    }

    let id = Uuid::new_v4().to_string();
    queries::create_person(
        pool,
        &id,
        tenant_id,
        full_name,
        phone,
        neighborhood,
        birth_date,
        gender,
        "visitor",
    )?;

    get_person(pool, tenant_id, &id)
}

/// Get a person by ID.
pub fn get_person(pool: &DbPool, tenant_id: &str, id: &str) -> KoinoniaResult<Person> {
    let row = queries::get_person(pool, tenant_id, id).map_err(|e| match e {
        DbError::NotFound(_) => KoinoniaError::PersonNotFound(id.to_string()),
        e => e.into(),
    })?;
    Ok(Person::from_row(row))
}

/// List people for a tenant.
pub fn list_people(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<Vec<Person>> {
    let rows = queries::list_people(pool, tenant_id)?;
    Ok(rows.into_iter().map(Person::from_row).collect())
}
