use crate::envelope::Envelope;

/// Everything that can stop an invocation short of its happy path.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Database connection not configured")]
    NotConfigured,

    #[error("Missing required fields: date, operation_type, amount")]
    MissingFields,

    #[error("Missing id parameter")]
    MissingId,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid id parameter: {0}")]
    InvalidId(String),

    #[error("Method not allowed")]
    MethodNotAllowed(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ReportError {
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::NotConfigured | ReportError::Database(_) => 500,
            ReportError::MissingFields
            | ReportError::MissingId
            | ReportError::InvalidBody(_)
            | ReportError::InvalidId(_) => 400,
            ReportError::MethodNotAllowed(_) => 405,
        }
    }

    /// The message sent to the client. Database details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            ReportError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ReportError> for Envelope {
    fn from(err: ReportError) -> Self {
        match &err {
            ReportError::Database(e) => log::error!("database failure: {e}"),
            ReportError::NotConfigured => log::error!("DATABASE_URL is not set"),
            ReportError::MethodNotAllowed(m) => log::warn!("rejected method {m}"),
            other => log::warn!("rejected request: {other}"),
        }
        Envelope::error(err.status_code(), err.client_message())
    }
}
