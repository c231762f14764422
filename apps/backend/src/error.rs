//! Caller-facing error type for the controller surface.

use thiserror::Error;

use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;

/// Error returned by every controller operation.
///
/// Denials carry a machine code, a single human message, and (where the
/// validator has one) an actionable suggestion. The controller never
/// panics: internal inconsistencies abort the command and surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation {
        code: ErrorCode,
        detail: String,
        suggestion: Option<String>,
        context: Option<serde_json::Value>,
    },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// The machine code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::InvalidCatalog,
        }
    }

    /// The single human message for this error.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Validation { detail, .. } => detail,
            AppError::NotFound { detail, .. } => detail,
            AppError::Conflict { detail, .. } => detail,
            AppError::Internal { detail } => detail,
            AppError::Config { detail } => detail,
        }
    }

    /// Actionable follow-up for the caller, when one exists.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            AppError::Validation { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Structured context attached to a denial, when one exists.
    pub fn context(&self) -> Option<&serde_json::Value> {
        match self {
            AppError::Validation { context, .. } => context.as_ref(),
            _ => None,
        }
    }

    pub fn validation(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            suggestion: None,
            context: None,
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation {
                code,
                detail,
                suggestion,
                context,
            } => AppError::Validation {
                code,
                detail,
                suggestion,
                context,
            },
            DomainError::NotFound(kind, detail) => AppError::NotFound {
                code: kind.code(),
                detail,
            },
            DomainError::Conflict { code, detail } => AppError::Conflict { code, detail },
            DomainError::Internal(detail) => AppError::Internal { detail },
        }
    }
}
