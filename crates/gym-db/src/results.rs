use sqlx::FromRow;
use thiserror::Error as ThisError;

/// Model errors
#[derive(Debug, Clone, ThisError)]
pub enum QueryError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Ambiguous results ({0:?}) for query")]
    Ambiguous(usize),
}

#[derive(Debug, Clone, FromRow)]
pub struct Id<T> {
    pub id: T,
}
