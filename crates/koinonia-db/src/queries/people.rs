//! People-related database queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::{params, Connection};

/// Person row from database.
#[derive(Debug, Clone)]
pub struct PersonRow {
    pub id: String,
    pub tenant_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub membership_status: String,
    pub created_at: String,
    pub updated_at: String,
}

const COLUMNS: &str = "id, tenant_id, full_name, phone, neighborhood, birth_date,
                       gender, membership_status, created_at, updated_at";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok(PersonRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        neighborhood: row.get(4)?,
        birth_date: row.get(5)?,
        gender: row.get(6)?,
        membership_status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert a person inside an existing connection/transaction.
///
/// Exposed at the connection level so multi-record writes (decision
/// registration) can include the person in their transaction.
pub fn insert_person_conn(
    conn: &Connection,
    id: &str,
    tenant_id: &str,
    full_name: &str,
    phone: Option<&str>,
    neighborhood: Option<&str>,
    birth_date: Option<&str>,
    gender: Option<&str>,
    membership_status: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO people (id, tenant_id, full_name, phone, neighborhood,
                             birth_date, gender, membership_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            tenant_id,
            full_name,
            phone,
            neighborhood,
            birth_date,
            gender,
            membership_status
        ],
    )?;
    Ok(())
}

/// Create a new person.
#[allow(clippy::too_many_arguments)]
pub fn create_person(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    full_name: &str,
    phone: Option<&str>,
    neighborhood: Option<&str>,
    birth_date: Option<&str>,
    gender: Option<&str>,
    membership_status: &str,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        insert_person_conn(
            conn,
            id,
            tenant_id,
            full_name,
            phone,
            neighborhood,
            birth_date,
            gender,
            membership_status,
        )?;
        Ok(())
    })
}

/// Get a person by ID.
pub fn get_person(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<PersonRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM people WHERE tenant_id = ?1 AND id = ?2"),
            params![tenant_id, id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Person: {}", id)),
            e => DbError::Connection(e),
        })
    })
}

/// List people for a tenant, newest first.
pub fn list_people(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<PersonRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM people WHERE tenant_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map(params![tenant_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}
