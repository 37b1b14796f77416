use thiserror::Error;

use clientele_core::errors::{ApplicationError, DomainError};

pub mod customer;
pub mod memory;

pub use customer::SqlCustomerDao;
pub use memory::InMemoryCustomerDao;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(database) if database.is_unique_violation() => {
                Self::UniqueViolation(database.message().to_string())
            }
            _ => Self::Database(error),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            // email is the only unique column besides the primary key
            RepositoryError::UniqueViolation(_) => DomainError::email_taken().into(),
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}
