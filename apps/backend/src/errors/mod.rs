//! Error taxonomy: closed code enum plus the domain error carried between
//! layers.

pub mod domain;
pub mod error_code;

pub use domain::{DomainError, NotFoundKind};
pub use error_code::ErrorCode;
