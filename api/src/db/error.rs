// Error types for the durable sales store

use thiserror::Error;

/// Failures from the PostgreSQL side of the sale. `Unreachable` covers pool
/// setup and lost connections; `Statement` covers the checkout, purchase and
/// finalization queries, including unique-code conflicts.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("sales database unreachable: {0}")]
    Unreachable(String),

    #[error("sales database statement failed: {0}")]
    Statement(String),
}

impl From<sea_orm::DbErr> for DbError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(e) => DbError::Unreachable(e.to_string()),
            other => DbError::Statement(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_faults_classify_as_unreachable() {
        let err: DbError = sea_orm::DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "pool exhausted".to_string(),
        ))
        .into();
        assert!(matches!(err, DbError::Unreachable(_)));
    }

    #[test]
    fn query_faults_classify_as_statement() {
        let err: DbError = sea_orm::DbErr::Custom("duplicate code".to_string()).into();
        assert!(matches!(err, DbError::Statement(msg) if msg.contains("duplicate code")));
    }
}
