//! Shared HTTP building blocks

pub mod response;
pub mod validated_json;

pub use response::{api_error, domain_error, ApiError, ApiResponse};
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
