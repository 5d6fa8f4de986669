pub mod admin_code;
pub mod attendance;
pub mod error;
pub mod export;
pub mod member;
pub mod qr_session;
pub mod report;

pub use error::{ServiceError, ServiceResult};
