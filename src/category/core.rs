//! Defines the category type and the database queries for categories.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, map_unique_violation};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for CategoryName {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for CategoryName {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(CategoryName)
    }
}

/// A category for grouping expenses, e.g. "Travel".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: CategoryName,
    /// A description of what belongs in the category, may be empty.
    pub description: String,
    /// Whether new expenses may be filed under the category.
    pub is_active: bool,
}

/// The data needed to create a [Category].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The unique name of the category.
    pub name: CategoryName,
    /// A description of what belongs in the category.
    pub description: String,
}

/// Create the category table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_active: row.get(3)?,
    })
}

/// Create a new category in the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateCategoryName] if a category already has the name,
/// or an [Error::SqlError] if an SQL related error occurred.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    let description = category.description.trim().to_owned();

    connection
        .execute(
            "INSERT INTO category (name, description, is_active) VALUES (?1, ?2, 1)",
            params![category.name, description],
        )
        .map_err(|error| {
            map_unique_violation(error, || {
                Error::DuplicateCategoryName(category.name.to_string())
            })
        })?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name: category.name,
        description,
        is_active: true,
    })
}

/// Get the active categories ordered by name.
pub fn get_active_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, description, is_active FROM category
            WHERE is_active = 1
            ORDER BY name",
        )?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}
