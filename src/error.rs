use aws_sdk_secretsmanager::error::{DisplayErrorContext, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use sea_orm::{DbErr, SqlErr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("DB_SECRET_ARN environment variable is not set")]
    MissingSecretArn,

    #[error("failed to retrieve database secret: {}", DisplayErrorContext(.0))]
    SecretFetch(#[from] SdkError<GetSecretValueError>),

    #[error("malformed database secret: {0}")]
    MalformedSecret(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("malformed S3 event: {0}")]
    MalformedEvent(String),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the storage layer rejected a write because of a unique index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(err) => {
                matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
            }
            _ => false,
        }
    }
}
