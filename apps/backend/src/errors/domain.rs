//! Domain-level error type used across services and the validator.
//!
//! This error type is transport-agnostic. The controller returns
//! `Result<T, crate::error::AppError>` and converts from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::error_code::ErrorCode;

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Player,
    Character,
}

impl NotFoundKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            NotFoundKind::Game => ErrorCode::GameNotFound,
            NotFoundKind::Player => ErrorCode::PlayerNotFound,
            NotFoundKind::Character => ErrorCode::UnknownCharacter,
        }
    }
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation {
        code: ErrorCode,
        detail: String,
        suggestion: Option<String>,
        context: Option<serde_json::Value>,
    },
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Semantic conflict (code collisions, stale state)
    Conflict { code: ErrorCode, detail: String },
    /// Internal inconsistency; the command is aborted without side effects
    Internal(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation { code, detail, .. } => {
                write!(f, "validation error {code}: {detail}")
            }
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Conflict { code, detail } => write!(f, "conflict {code}: {detail}"),
            DomainError::Internal(d) => write!(f, "internal error: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            suggestion: None,
            context: None,
        }
    }

    pub fn validation_with_suggestion(
        code: ErrorCode,
        detail: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            suggestion: Some(suggestion.into()),
            context: None,
        }
    }

    /// Attach structured context to a validation error.
    pub fn with_context(mut self, value: serde_json::Value) -> Self {
        if let Self::Validation { context, .. } = &mut self {
            *context = Some(value);
        }
        self
    }

    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// The error code surfaced to callers.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation { code, .. } => *code,
            DomainError::NotFound(kind, _) => kind.code(),
            DomainError::Conflict { code, .. } => *code,
            DomainError::Internal(_) => ErrorCode::Internal,
        }
    }
}
