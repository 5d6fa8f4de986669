use sea_orm::DbErr;
use thiserror::Error;

/// Error taxonomy for the service layer.
///
/// `Rejected` is a business-rule outcome (duplicate NIM, unknown UID, bad
/// duration): the caller shows the message and carries on. `Db` is a system
/// fault (store unreachable, constraint machinery failing): the caller should
/// offer a retry. Handlers must never collapse the two into one response.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("failed to build workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl ServiceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
