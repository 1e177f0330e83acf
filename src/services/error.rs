//! Error type shared by the table services.
//!
//! Every service talks to exactly one external collaborator (the managed
//! database), so the failure space is small: the row is missing, the form
//! was incomplete, the database refused the write on integrity grounds, or
//! the call itself failed.

use uuid::Uuid;

use crate::validate::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{table} not found: {id}")]
    NotFound { table: &'static str, id: Uuid },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl RecordError {
    #[must_use]
    pub fn not_found(table: &'static str, id: Uuid) -> Self {
        Self::NotFound { table, id }
    }
}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let code = db.code();
            let message = match code.as_deref() {
                Some("23503") => Some("the record refers to a missing row or is still in use"),
                Some("23505") => Some("a record with the same key already exists"),
                Some("23514") => Some("a value is outside the allowed set"),
                _ => None,
            };
            if let Some(message) = message {
                return match db.constraint() {
                    Some(constraint) => Self::Conflict(format!("{message} ({constraint})")),
                    None => Self::Conflict(message.to_owned()),
                };
            }
        }
        Self::Database(err)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
