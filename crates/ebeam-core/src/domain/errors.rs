use super::{Constraint, Plane};
use std::path::PathBuf;

pub type BeamResult<T> = Result<T, BeamError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeamErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl BeamErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BeamError {
    /// A field failed its sign or finiteness constraint; nothing was computed.
    #[error("{field} must be {constraint} (got {value})")]
    Validation {
        field: String,
        constraint: Constraint,
        value: f64,
    },
    #[error("unknown electron beam representation mode {0} (expected 0, 1, 2 or 3)")]
    UnknownRepresentation(u8),
    /// An algebraic conversion met a non-physical input.
    #[error("{quantity}: {reason}")]
    Domain { quantity: String, reason: String },
    #[error("{plane} Twiss parameters are inconsistent: {reason}")]
    InconsistentTwiss { plane: Plane, reason: String },
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Internal(String),
}

impl BeamError {
    pub fn validation(field: impl Into<String>, constraint: Constraint, value: f64) -> Self {
        Self::Validation {
            field: field.into(),
            constraint,
            value,
        }
    }

    pub fn domain(quantity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Domain {
            quantity: quantity.into(),
            reason: reason.into(),
        }
    }

    pub fn inconsistent_twiss(plane: Plane, reason: impl Into<String>) -> Self {
        Self::InconsistentTwiss {
            plane,
            reason: reason.into(),
        }
    }

    pub const fn category(&self) -> BeamErrorCategory {
        match self {
            Self::Validation { .. } | Self::UnknownRepresentation(_) | Self::Parse { .. } => {
                BeamErrorCategory::InputValidationError
            }
            Self::Domain { .. } | Self::InconsistentTwiss { .. } => {
                BeamErrorCategory::ComputationError
            }
            Self::Read { .. } | Self::Write { .. } => BeamErrorCategory::IoSystemError,
            Self::Internal(_) => BeamErrorCategory::InternalError,
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "INPUT.FIELD",
            Self::UnknownRepresentation(_) => "INPUT.REPRESENTATION",
            Self::Parse { .. } => "INPUT.PARSE",
            Self::Domain { .. } => "RUN.DOMAIN",
            Self::InconsistentTwiss { .. } => "RUN.TWISS_CONSISTENCY",
            Self::Read { .. } => "IO.READ",
            Self::Write { .. } => "IO.WRITE",
            Self::Internal(_) => "SYS.INTERNAL",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    /// Field name for validation failures, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn plane(&self) -> Option<Plane> {
        match self {
            Self::InconsistentTwiss { plane, .. } => Some(*plane),
            _ => None,
        }
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }
}
